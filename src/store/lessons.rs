use super::guards::{ensure_no_dependents, lesson_dependencies};
use super::{expect_single_row, like_pattern, required_text};
use crate::errors::AppError;
use crate::model::Pagination;
use crate::model::catalog::{Lesson, LessonChangeset, LessonListRow, NewLesson};
use crate::payloads::catalog::{CreateLessonForm, UpdateLessonForm};
use crate::schema::{courses, lessons, modules};
use chrono::Utc;
use diesel::dsl::{exists, max, not};
use diesel::prelude::*;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct LessonFilter {
    pub course_id: Option<i64>,
    pub module_id: Option<i64>,
    pub search: Option<String>,
}

pub fn list_lessons(
    conn: &mut PgConnection,
    filter: LessonFilter,
    page: Option<i64>,
    per_page: i64,
) -> QueryResult<(Vec<LessonListRow>, Pagination)> {
    let mut count_query = lessons::table
        .inner_join(modules::table.inner_join(courses::table))
        .into_boxed();
    let mut rows_query = lessons::table
        .inner_join(modules::table.inner_join(courses::table))
        .into_boxed();
    if let Some(course_id) = filter.course_id {
        count_query = count_query.filter(courses::id.eq(course_id));
        rows_query = rows_query.filter(courses::id.eq(course_id));
    }
    if let Some(module_id) = filter.module_id {
        count_query = count_query.filter(lessons::module_id.eq(module_id));
        rows_query = rows_query.filter(lessons::module_id.eq(module_id));
    }
    if let Some(term) = filter.search {
        let pattern = like_pattern(&term);
        count_query = count_query.filter(lessons::title.ilike(pattern.clone()));
        rows_query = rows_query.filter(lessons::title.ilike(pattern));
    }

    let total = count_query.count().get_result::<i64>(conn)?;
    let pagination = Pagination::new(page, per_page, total);

    let rows = rows_query
        .order((
            courses::title.asc(),
            modules::order_sequence.asc(),
            lessons::order_sequence.asc(),
        ))
        .limit(pagination.per_page)
        .offset(pagination.offset())
        .select((Lesson::as_select(), modules::title, courses::title))
        .load::<(Lesson, String, String)>(conn)?
        .into_iter()
        .map(|(lesson, module_title, course_title)| LessonListRow {
            lesson,
            module_title,
            course_title,
        })
        .collect();
    Ok((rows, pagination))
}

pub fn find_lesson(conn: &mut PgConnection, lesson_id: i64) -> Result<Lesson, AppError> {
    lessons::table
        .find(lesson_id)
        .select(Lesson::as_select())
        .first::<Lesson>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Lesson with ID {} not found.", lesson_id)))
}

fn validate_duration(duration: Option<i32>) -> Result<Option<i32>, AppError> {
    match duration {
        Some(minutes) if minutes <= 0 => Err(AppError::Validation(
            "Estimated duration must be a positive number of minutes.".to_string(),
        )),
        other => Ok(other),
    }
}

fn next_lesson_order(conn: &mut PgConnection, module_id: i64) -> QueryResult<i32> {
    let current = lessons::table
        .filter(lessons::module_id.eq(module_id))
        .select(max(lessons::order_sequence))
        .first::<Option<i32>>(conn)?;
    Ok(current.unwrap_or(0) + 1)
}

fn ensure_order_free(
    conn: &mut PgConnection,
    module_id: i64,
    order_sequence: i32,
    except_id: Option<i64>,
) -> Result<(), AppError> {
    let mut query = lessons::table
        .filter(lessons::module_id.eq(module_id))
        .filter(lessons::order_sequence.eq(order_sequence))
        .into_boxed();
    if let Some(id) = except_id {
        query = query.filter(lessons::id.ne(id));
    }
    if diesel::select(exists(query)).get_result::<bool>(conn)? {
        warn!(
            "Lesson order {} already used in module {}",
            order_sequence, module_id
        );
        return Err(AppError::Validation(format!(
            "A lesson already exists with order sequence {} in this module.",
            order_sequence
        )));
    }
    Ok(())
}

pub fn create_lesson(conn: &mut PgConnection, form: CreateLessonForm) -> Result<i64, AppError> {
    let title = required_text(&form.title, "Title", 255)?;
    let estimated_duration = validate_duration(form.estimated_duration)?;
    let module_exists = diesel::select(exists(modules::table.find(form.module_id)))
        .get_result::<bool>(conn)?;
    if !module_exists {
        return Err(AppError::NotFound(format!(
            "Module with ID {} not found.",
            form.module_id
        )));
    }

    let order_sequence = match form.order_sequence {
        Some(order) if order < 1 => {
            return Err(AppError::Validation(
                "Order sequence must be at least 1.".to_string(),
            ));
        }
        Some(order) => {
            ensure_order_free(conn, form.module_id, order, None)?;
            order
        }
        None => next_lesson_order(conn, form.module_id)?,
    };

    let new_lesson = NewLesson {
        module_id: form.module_id,
        title,
        content: form.content,
        order_sequence,
        estimated_duration,
        is_active: true,
    };
    let new_id = diesel::insert_into(lessons::table)
        .values(&new_lesson)
        .returning(lessons::id)
        .get_result::<i64>(conn)?;
    info!(
        "Inserted lesson '{}' with ID {} at position {} of module {}",
        new_lesson.title, new_id, order_sequence, new_lesson.module_id
    );
    Ok(new_id)
}

/// A blank order keeps the lesson where it is.
pub fn update_lesson(
    conn: &mut PgConnection,
    lesson_id: i64,
    form: UpdateLessonForm,
) -> Result<(), AppError> {
    let title = required_text(&form.title, "Title", 255)?;
    let estimated_duration = validate_duration(form.estimated_duration)?;
    let lesson = find_lesson(conn, lesson_id)?;

    let order_sequence = match form.order_sequence {
        Some(order) if order < 1 => {
            return Err(AppError::Validation(
                "Order sequence must be at least 1.".to_string(),
            ));
        }
        Some(order) => {
            ensure_order_free(conn, lesson.module_id, order, Some(lesson_id))?;
            order
        }
        None => lesson.order_sequence,
    };

    let changes = LessonChangeset {
        title,
        content: form.content,
        order_sequence,
        estimated_duration,
        is_active: form.is_active,
        updated_at: Utc::now(),
    };
    let affected = diesel::update(lessons::table.find(lesson_id))
        .set(&changes)
        .execute(conn)?;
    expect_single_row(affected, "Lesson", lesson_id)
}

pub fn toggle_lesson(conn: &mut PgConnection, lesson_id: i64) -> Result<bool, AppError> {
    diesel::update(lessons::table.find(lesson_id))
        .set(lessons::is_active.eq(not(lessons::is_active)))
        .returning(lessons::is_active)
        .get_result::<bool>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Lesson with ID {} not found.", lesson_id)))
}

pub fn delete_lesson(conn: &mut PgConnection, lesson_id: i64) -> Result<String, AppError> {
    let lesson = find_lesson(conn, lesson_id)?;
    let dependencies = lesson_dependencies(conn, &[lesson_id])?;
    ensure_no_dependents(&format!("lesson '{}'", lesson.title), &dependencies)?;

    let affected = diesel::delete(lessons::table.find(lesson_id)).execute(conn)?;
    expect_single_row(affected, "Lesson", lesson_id)?;
    info!("Deleted lesson {}", lesson_id);
    Ok(lesson.title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_must_be_positive_when_given() {
        assert_eq!(validate_duration(None).unwrap(), None);
        assert_eq!(validate_duration(Some(45)).unwrap(), Some(45));
        assert!(matches!(
            validate_duration(Some(0)),
            Err(AppError::Validation(_))
        ));
        assert!(validate_duration(Some(-5)).is_err());
    }
}
