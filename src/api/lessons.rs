use super::{helper, toggled};
use crate::Settings;
use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::payloads::Banner;
use crate::payloads::catalog::{CreateLessonForm, ListLessonsParams, UpdateLessonForm};
use crate::response::{Page, finish_write};
use crate::store::lessons::{self, LessonFilter};
use crate::store::{courses, modules, search_term};
use crate::views;
use crate::views::layout::{self, Section};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::{Extension, Form};
use deadpool_diesel::postgres::Pool;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Lesson list.
///
/// Query Parameters:
/// * `course_id`: Optional course to filter by.
/// * `module_id`: Optional module to filter by.
/// * `search`: matches the lesson title.
/// * `page`: 1-based page number.
///
/// Returns
/// * The list page with the create form (200 OK).
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, settings, admin, banner))]
pub async fn list_lessons(
    State(pool): State<Pool>,
    State(settings): State<Arc<Settings>>,
    Extension(admin): Extension<AdminIdentity>,
    Query(params): Query<ListLessonsParams>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Listing lessons");
    debug!("List lessons params: {:?}", params);

    let filter = LessonFilter {
        course_id: params.course_id,
        module_id: params.module_id,
        search: search_term(params.search.as_deref()),
    };
    let page = params.page;
    let per_page = settings.page_size;
    let (rows, pagination, module_choices, course_choices) =
        helper::run_query(&pool, move |conn| {
            let (rows, pagination) = lessons::list_lessons(conn, filter, page, per_page)?;
            Ok((
                rows,
                pagination,
                modules::module_choices(conn)?,
                courses::course_choices(conn)?,
            ))
        })
        .await?;
    info!("Fetched {} of {} lessons", rows.len(), pagination.total);

    let body = views::lessons::list(
        &rows,
        &pagination,
        &module_choices,
        &course_choices,
        &params,
    );
    Ok(Page(layout::page(
        "Lessons",
        Section::Lessons,
        &admin,
        &banner,
        &body,
    )))
}

/// Creates a lesson; a blank order appends it after the last lesson of the module.
#[instrument(skip(pool, admin, form))]
pub async fn create_lesson(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    form: Result<Form<CreateLessonForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let mut back = "/lessons".to_string();
    let outcome = async {
        let form = helper::accept_form(form)?;
        back = format!("/lessons?module_id={}", form.module_id);
        info!(
            "Admin {} creating lesson '{}' in module {}",
            admin.username, form.title, form.module_id
        );
        helper::run_transaction(&pool, move |conn| {
            let title = form.title.trim().to_string();
            let id = lessons::create_lesson(conn, form)?;
            Ok(format!("Lesson '{}' created with ID {}.", title, id))
        })
        .await
    }
    .await;
    finish_write(outcome, &back, &back)
}

/// Edit form of one lesson.
///
/// Returns
/// * The edit page (200 OK).
/// * `404 Not Found`: If the lesson or its module does not exist.
#[instrument(skip(pool, admin, banner))]
pub async fn edit_lesson(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(lesson_id): Path<i64>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Opening lesson {} for editing", lesson_id);
    let (lesson, module) = helper::run_store(&pool, move |conn| {
        let lesson = lessons::find_lesson(conn, lesson_id)?;
        let module = modules::find_module(conn, lesson.module_id)?;
        Ok((lesson, module))
    })
    .await?;

    let body = views::lessons::edit(&lesson, &module.title);
    Ok(Page(layout::page(
        &format!("Edit lesson: {}", lesson.title),
        Section::Lessons,
        &admin,
        &banner,
        &body,
    )))
}

/// Saves the edit form of a lesson. A blank order keeps the current position.
///
/// Returns
/// * `303 See Other` to `/lessons` with a `notice` on success.
/// * `303 See Other` back to `/lessons/{id}/edit` with an `error` for a taken order or a bad duration.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, admin, form))]
pub async fn update_lesson(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(lesson_id): Path<i64>,
    form: Result<Form<UpdateLessonForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let form = helper::accept_form(form)?;
        info!("Admin {} updating lesson {}", admin.username, lesson_id);
        helper::run_transaction(&pool, move |conn| {
            lessons::update_lesson(conn, lesson_id, form)?;
            Ok("Lesson updated.".to_string())
        })
        .await
    }
    .await;
    finish_write(outcome, "/lessons", &format!("/lessons/{}/edit", lesson_id))
}

/// Flips `is_active` of a lesson.
#[instrument(skip(pool))]
pub async fn toggle_lesson(
    State(pool): State<Pool>,
    Path(lesson_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Toggling lesson {}", lesson_id);
    let outcome = helper::run_store(&pool, move |conn| {
        lessons::toggle_lesson(conn, lesson_id).map(|active| toggled("Lesson", active))
    })
    .await;
    finish_write(outcome, "/lessons", "/lessons")
}

/// Deletes a lesson no learner progress points at.
///
/// Returns
/// * `303 See Other` to `/lessons` with a `notice` on success.
/// * `303 See Other` to `/lessons` with an `error` if progress rows reference the lesson.
#[instrument(skip(pool, admin))]
pub async fn delete_lesson(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(lesson_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Admin {} deleting lesson {}", admin.username, lesson_id);
    let outcome = helper::run_transaction(&pool, move |conn| {
        let title = lessons::delete_lesson(conn, lesson_id)?;
        Ok(format!("Lesson '{}' deleted.", title))
    })
    .await;
    finish_write(outcome, "/lessons", "/lessons")
}
