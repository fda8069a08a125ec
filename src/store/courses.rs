use super::guards::{course_dependencies, ensure_no_dependents};
use super::{cascade, expect_single_row, like_pattern, required_text};
use crate::errors::AppError;
use crate::model::Pagination;
use crate::model::catalog::{Course, CourseChangeset, CourseListRow, NewCourse};
use crate::payloads::catalog::CourseForm;
use crate::payloads::{BulkAction, BulkRequest};
use crate::schema::{courses, modules, user_progress};
use chrono::Utc;
use diesel::dsl::{count_star, exists, not};
use diesel::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

pub const TITLE_MAX: usize = 255;

pub fn list_courses(
    conn: &mut PgConnection,
    search: Option<String>,
    page: Option<i64>,
    per_page: i64,
) -> QueryResult<(Vec<CourseListRow>, Pagination)> {
    let mut count_query = courses::table.into_boxed();
    let mut rows_query = courses::table.into_boxed();
    if let Some(term) = search {
        let pattern = like_pattern(&term);
        count_query = count_query.filter(courses::title.ilike(pattern.clone()));
        rows_query = rows_query.filter(courses::title.ilike(pattern));
    }

    let total = count_query.count().get_result::<i64>(conn)?;
    let pagination = Pagination::new(page, per_page, total);

    let page_courses = rows_query
        .order(courses::title.asc())
        .limit(pagination.per_page)
        .offset(pagination.offset())
        .select(Course::as_select())
        .load::<Course>(conn)?;
    let ids: Vec<i64> = page_courses.iter().map(|c| c.id).collect();

    let module_counts: HashMap<i64, i64> = modules::table
        .filter(modules::course_id.eq_any(&ids))
        .group_by(modules::course_id)
        .select((modules::course_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();
    let enrollment_counts: HashMap<i64, i64> = user_progress::table
        .filter(user_progress::course_id.eq_any(&ids))
        .filter(user_progress::module_id.is_null())
        .filter(user_progress::lesson_id.is_null())
        .group_by(user_progress::course_id)
        .select((user_progress::course_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();

    let rows = page_courses
        .into_iter()
        .map(|course| CourseListRow {
            module_count: module_counts.get(&course.id).copied().unwrap_or(0),
            enrollment_count: enrollment_counts.get(&course.id).copied().unwrap_or(0),
            course,
        })
        .collect();
    Ok((rows, pagination))
}

/// `(id, title, is_active)` of every course, for filters and select boxes.
pub fn course_choices(conn: &mut PgConnection) -> QueryResult<Vec<(i64, String, bool)>> {
    courses::table
        .order(courses::title.asc())
        .select((courses::id, courses::title, courses::is_active))
        .load(conn)
}

pub fn find_course(conn: &mut PgConnection, course_id: i64) -> Result<Course, AppError> {
    courses::table
        .find(course_id)
        .select(Course::as_select())
        .first::<Course>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Course with ID {} not found.", course_id)))
}

fn ensure_title_available(
    conn: &mut PgConnection,
    title: &str,
    except_id: Option<i64>,
) -> Result<(), AppError> {
    let mut query = courses::table
        .filter(courses::title.eq(title.to_string()))
        .into_boxed();
    if let Some(id) = except_id {
        query = query.filter(courses::id.ne(id));
    }
    let taken = diesel::select(exists(query)).get_result::<bool>(conn)?;
    if taken {
        warn!("Course title '{}' is already taken.", title);
        return Err(AppError::Validation(format!(
            "A course titled '{}' already exists.",
            title
        )));
    }
    Ok(())
}

pub fn create_course(conn: &mut PgConnection, form: CourseForm) -> Result<i64, AppError> {
    let title = required_text(&form.title, "Title", TITLE_MAX)?;
    ensure_title_available(conn, &title, None)?;

    let new_course = NewCourse {
        title,
        description: form.description.trim().to_string(),
        is_active: form.is_active,
    };
    let new_id = diesel::insert_into(courses::table)
        .values(&new_course)
        .returning(courses::id)
        .get_result::<i64>(conn)?;
    info!("Inserted course '{}' with ID {}", new_course.title, new_id);
    Ok(new_id)
}

pub fn update_course(
    conn: &mut PgConnection,
    course_id: i64,
    form: CourseForm,
) -> Result<(), AppError> {
    let title = required_text(&form.title, "Title", TITLE_MAX)?;
    find_course(conn, course_id)?;
    ensure_title_available(conn, &title, Some(course_id))?;

    let changes = CourseChangeset {
        title,
        description: form.description.trim().to_string(),
        is_active: form.is_active,
        updated_at: Utc::now(),
    };
    let affected = diesel::update(courses::table.find(course_id))
        .set(&changes)
        .execute(conn)?;
    expect_single_row(affected, "Course", course_id)
}

/// Flips `is_active` and returns the new value.
pub fn toggle_course(conn: &mut PgConnection, course_id: i64) -> Result<bool, AppError> {
    diesel::update(courses::table.find(course_id))
        .set(courses::is_active.eq(not(courses::is_active)))
        .returning(courses::is_active)
        .get_result::<bool>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Course with ID {} not found.", course_id)))
}

/// Deletes a course and its content tree; returns the deleted title.
pub fn delete_course(conn: &mut PgConnection, course_id: i64) -> Result<String, AppError> {
    let course = find_course(conn, course_id)?;
    let dependencies = course_dependencies(conn, &[course_id])?;
    ensure_no_dependents(&format!("course '{}'", course.title), &dependencies)?;

    let deleted = cascade::delete_courses(conn, &[course_id])?;
    expect_single_row(deleted, "Course", course_id)?;
    Ok(course.title)
}

/// Applies a bulk action to every selected course, or to none of them.
pub fn bulk_courses(conn: &mut PgConnection, request: &BulkRequest) -> Result<usize, AppError> {
    let found = courses::table
        .filter(courses::id.eq_any(&request.ids))
        .count()
        .get_result::<i64>(conn)?;
    if found != request.ids.len() as i64 {
        return Err(AppError::NotFound(format!(
            "{} of the selected courses no longer exist.",
            request.ids.len() as i64 - found
        )));
    }

    let targets = courses::table.filter(courses::id.eq_any(&request.ids));
    let affected = match request.action {
        BulkAction::Activate => diesel::update(targets)
            .set(courses::is_active.eq(true))
            .execute(conn)?,
        BulkAction::Deactivate => diesel::update(targets)
            .set(courses::is_active.eq(false))
            .execute(conn)?,
        BulkAction::Delete => {
            let dependencies = course_dependencies(conn, &request.ids)?;
            ensure_no_dependents("the selected courses", &dependencies)?;
            cascade::delete_courses(conn, &request.ids)?
        }
    };
    info!(
        "Bulk {:?} applied to {} courses",
        request.action, affected
    );
    Ok(affected)
}
