//! Synchronous database operations, one function per use case.
//!
//! Every function takes the connection it must run on. Multi-statement
//! writes are called through `api::helper::run_transaction`, so the
//! connection they receive is already inside a transaction: returning
//! `Err` rolls every statement back.

use crate::errors::AppError;

pub mod cascade;
pub mod certificates;
pub mod courses;
pub mod dashboard;
pub mod guards;
pub mod lessons;
pub mod modules;
pub mod options;
pub mod questions;
pub mod quizzes;
pub mod students;

/// Trims `value` and rejects it when blank or longer than `max_chars`.
pub fn required_text(value: &str, field: &str, max_chars: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required.", field)));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters.",
            field, max_chars
        )));
    }
    Ok(trimmed.to_string())
}

pub fn in_range(value: i32, field: &str, min: i32, max: i32) -> Result<i32, AppError> {
    if value < min || value > max {
        return Err(AppError::Validation(format!(
            "{} must be between {} and {}.",
            field, min, max
        )));
    }
    Ok(value)
}

/// `ILIKE` pattern matching `search` anywhere, with wildcards escaped.
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Normalized non-blank search term.
pub fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Maps an UPDATE/DELETE row count onto the single-row contract.
pub fn expect_single_row(affected: usize, entity: &str, id: i64) -> Result<(), AppError> {
    match affected {
        0 => Err(AppError::NotFound(format!(
            "{} with ID {} not found.",
            entity, id
        ))),
        1 => Ok(()),
        n => Err(AppError::InternalServerError(anyhow::anyhow!(
            "{} update affected {} rows, expected 1",
            entity,
            n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_limits() {
        assert_eq!(
            required_text("  Intro to Nutrition ", "Title", 255).unwrap(),
            "Intro to Nutrition"
        );
        assert!(matches!(
            required_text("   ", "Title", 255),
            Err(AppError::Validation(_))
        ));
        assert!(required_text(&"x".repeat(256), "Title", 255).is_err());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert_eq!(in_range(1, "Points", 1, 100).unwrap(), 1);
        assert_eq!(in_range(100, "Points", 1, 100).unwrap(), 100);
        assert!(in_range(0, "Points", 1, 100).is_err());
        assert!(in_range(101, "Points", 1, 100).is_err());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" 100%_done "), "%100\\%\\_done%");
    }

    #[test]
    fn single_row_contract() {
        assert!(expect_single_row(1, "Quiz", 3).is_ok());
        assert!(matches!(
            expect_single_row(0, "Quiz", 3),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            expect_single_row(2, "Quiz", 3),
            Err(AppError::InternalServerError(_))
        ));
    }
}
