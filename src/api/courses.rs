use super::{helper, toggled};
use crate::Settings;
use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::payloads::catalog::{CourseForm, ListCoursesParams};
use crate::payloads::form::FormFields;
use crate::payloads::{Banner, BulkRequest};
use crate::response::{Page, finish_write};
use crate::store::{courses, search_term};
use crate::views;
use crate::views::layout::{self, Section};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::{Extension, Form};
use deadpool_diesel::postgres::Pool;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Paginated course list with the create form.
///
/// Query Parameters:
/// * `search`: case-insensitive title filter.
/// * `page`: 1-based page number, clamped to the available range.
#[instrument(skip(pool, settings, admin, banner))]
pub async fn list_courses(
    State(pool): State<Pool>,
    State(settings): State<Arc<Settings>>,
    Extension(admin): Extension<AdminIdentity>,
    Query(params): Query<ListCoursesParams>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Listing courses");
    debug!("List courses params: {:?}", params);

    let search = search_term(params.search.as_deref());
    let page = params.page;
    let per_page = settings.page_size;
    let (rows, pagination) = helper::run_query(&pool, move |conn| {
        courses::list_courses(conn, search, page, per_page)
    })
    .await?;
    info!(
        "Fetched {} of {} courses (page {})",
        rows.len(),
        pagination.total,
        pagination.page
    );

    let body = views::courses::list(
        &rows,
        &pagination,
        params.search.as_deref().unwrap_or_default(),
    );
    Ok(Page(layout::page(
        "Courses",
        Section::Courses,
        &admin,
        &banner,
        &body,
    )))
}

/// Creates a course.
///
/// Form fields: `title` (required, unique), `description`, `is_active` checkbox.
///
/// Returns
/// * `303 See Other` to `/courses` with a `notice` on success.
/// * `303 See Other` to `/courses` with an `error` for a blank or taken title.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, admin, form))]
pub async fn create_course(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    form: Result<Form<CourseForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let form = helper::accept_form(form)?;
        info!("Admin {} creating course '{}'", admin.username, form.title);
        helper::run_transaction(&pool, move |conn| {
            let title = form.title.trim().to_string();
            let id = courses::create_course(conn, form)?;
            Ok(format!("Course '{}' created with ID {}.", title, id))
        })
        .await
    }
    .await;
    finish_write(outcome, "/courses", "/courses")
}

/// Edit form of one course.
///
/// Returns
/// * The edit page (200 OK).
/// * `404 Not Found`: If the course does not exist.
#[instrument(skip(pool, admin, banner))]
pub async fn edit_course(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(course_id): Path<i64>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Opening course {} for editing", course_id);
    let course =
        helper::run_store(&pool, move |conn| courses::find_course(conn, course_id)).await?;

    let body = views::courses::edit(&course);
    Ok(Page(layout::page(
        &format!("Edit course: {}", course.title),
        Section::Courses,
        &admin,
        &banner,
        &body,
    )))
}

/// Saves the edit form of a course. The title stays unique, excluding the course itself.
///
/// Returns
/// * `303 See Other` to `/courses` with a `notice` on success.
/// * `303 See Other` back to `/courses/{id}/edit` with an `error` on a validation failure.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, admin, form))]
pub async fn update_course(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(course_id): Path<i64>,
    form: Result<Form<CourseForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let form = helper::accept_form(form)?;
        info!("Admin {} updating course {}", admin.username, course_id);
        helper::run_transaction(&pool, move |conn| {
            courses::update_course(conn, course_id, form)?;
            Ok("Course updated.".to_string())
        })
        .await
    }
    .await;
    finish_write(outcome, "/courses", &format!("/courses/{}/edit", course_id))
}

/// Flips `is_active` of a course and nothing else.
///
/// Returns
/// * `303 See Other` to `/courses` with a `notice` saying the new state.
/// * `303 See Other` to `/courses` with an `error` if the course does not exist.
#[instrument(skip(pool))]
pub async fn toggle_course(
    State(pool): State<Pool>,
    Path(course_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Toggling course {}", course_id);
    let outcome = helper::run_store(&pool, move |conn| {
        courses::toggle_course(conn, course_id).map(|active| toggled("Course", active))
    })
    .await;
    finish_write(outcome, "/courses", "/courses")
}

/// Deletes a course and its content, refused when student data exists.
#[instrument(skip(pool, admin))]
pub async fn delete_course(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(course_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Admin {} deleting course {}", admin.username, course_id);
    let outcome = helper::run_transaction(&pool, move |conn| {
        let title = courses::delete_course(conn, course_id)?;
        Ok(format!("Course '{}' deleted.", title))
    })
    .await;
    finish_write(outcome, "/courses", "/courses")
}

/// Applies activate/deactivate/delete to the ticked courses.
///
/// Form fields: `action` and one `id` per selected row.
#[instrument(skip(pool, admin, form))]
pub async fn bulk_courses(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let fields = FormFields::new(helper::accept_form(form)?);
        let request = BulkRequest::from_fields(&fields).map_err(AppError::Validation)?;
        info!(
            "Admin {} applying {:?} to courses {:?}",
            admin.username, request.action, request.ids
        );
        helper::run_transaction(&pool, move |conn| {
            let affected = courses::bulk_courses(conn, &request)?;
            Ok(format!(
                "{} course(s) {}.",
                affected,
                request.action.past_tense()
            ))
        })
        .await
    }
    .await;
    finish_write(outcome, "/courses", "/courses")
}
