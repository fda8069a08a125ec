use crate::views::layout;
use anyhow::anyhow;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use deadpool_diesel::InteractError;
use deadpool_diesel::postgres::PoolError;
use diesel::result::{DatabaseErrorKind, DatabaseErrorInformation};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String), // 422

    #[error("Blocked by dependent records: {0}")]
    IntegrityBlock(String), // 409

    #[error("Forbidden: {0}")]
    Forbidden(String), // 403

    #[error("Not Found: {0}")]
    NotFound(String), // 404

    #[error("Internal Server Error: {0}")]
    InternalServerError(#[from] anyhow::Error), // 500
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::IntegrityBlock(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show in a banner. Internal details are never exposed.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(message)
            | AppError::IntegrityBlock(message)
            | AppError::Forbidden(message)
            | AppError::NotFound(message) => message.clone(),
            AppError::InternalServerError(_) => {
                "A database error occurred. Please try again later.".to_string()
            }
        }
    }

    /// Errors a POST handler reports by redirecting back with a banner.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::IntegrityBlock(_) | AppError::NotFound(_)
        )
    }
}

impl From<PoolError> for AppError {
    fn from(err: PoolError) -> Self {
        error!("Database pool error encountered: {:?}", err);
        AppError::InternalServerError(anyhow::Error::new(err).context("Database pool error"))
    }
}

impl From<InteractError> for AppError {
    fn from(err: InteractError) -> Self {
        error!("Database interaction error encountered: {:?}", err);
        AppError::InternalServerError(anyhow!("Database interaction error: {}", err))
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => {
                warn!("Diesel NotFound error reached generic conversion");
                AppError::NotFound("The requested record does not exist.".to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                warn!(
                    "Unique constraint violated: {:?} ({})",
                    info.constraint_name(),
                    info.message()
                );
                AppError::Validation(unique_violation_message(info.as_ref()))
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                warn!(
                    "Check constraint violated: {:?} ({})",
                    info.constraint_name(),
                    info.message()
                );
                AppError::Validation("A value is outside of its allowed range.".to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                warn!(
                    "Foreign key violated: {:?} ({})",
                    info.constraint_name(),
                    info.message()
                );
                AppError::NotFound("A referenced record does not exist.".to_string())
            }
            _ => {
                error!("Unhandled Diesel error encountered: {:?}", err);
                AppError::InternalServerError(
                    anyhow::Error::new(err).context("Database query error"),
                )
            }
        }
    }
}

fn unique_violation_message(info: &(dyn DatabaseErrorInformation + Send + Sync)) -> String {
    match info.constraint_name() {
        Some("courses_title_key") => "A course with this title already exists.",
        Some("modules_course_order_active_idx") => {
            "A module already exists with this order sequence in this course."
        }
        Some("lessons_module_id_order_sequence_key") => {
            "A lesson already exists with this order sequence in this module."
        }
        Some("quizzes_one_final_per_module_idx") => "This module already has a final quiz.",
        Some("certificates_user_id_course_id_key") => {
            "This student already holds a certificate for this course."
        }
        Some("certificates_certificate_code_key") => "Certificate code collision, please retry.",
        Some("users_email_key") => "A student with this email already exists.",
        _ => "A record with the same unique value already exists.",
    }
    .to_string()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::InternalServerError(source) = &self {
            error!(
                "Responding with 500 Internal Server Error. Source: {:?}",
                source
            );
        }

        let body = layout::error_page(status, &self.user_message());
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_their_source() {
        let err = AppError::InternalServerError(anyhow!("password=hunter2 connection refused"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.user_message().contains("hunter2"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn domain_errors_are_recoverable_with_their_message() {
        let err = AppError::IntegrityBlock("Quiz has 3 attempts".to_string());
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "Quiz has 3 attempts");
        assert!(err.is_recoverable());
        assert!(AppError::Validation("x".into()).is_recoverable());
        assert!(!AppError::Forbidden("x".into()).is_recoverable());
    }

    #[test]
    fn diesel_not_found_maps_to_not_found() {
        let err = AppError::from(diesel::result::Error::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
