use super::{helper, toggled};
use crate::Settings;
use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::model::assessment::QuizType;
use crate::payloads::assessment::{ListQuizzesParams, QuizForm};
use crate::payloads::form::FormFields;
use crate::payloads::{Banner, BulkRequest};
use crate::response::{Page, finish_write};
use crate::store::quizzes::{self, QuizFilter};
use crate::store::{courses, modules};
use crate::views;
use crate::views::layout::{self, Section};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::{Extension, Form};
use deadpool_diesel::postgres::Pool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Quiz list with question/attempt counts and the average score.
///
/// Query Parameters:
/// * `module_id`, `course_id`: optional scope filters.
/// * `quiz_type`: `module` or `final`; other values are ignored.
/// * `page`: 1-based page number.
#[instrument(skip(pool, settings, admin, banner))]
pub async fn list_quizzes(
    State(pool): State<Pool>,
    State(settings): State<Arc<Settings>>,
    Extension(admin): Extension<AdminIdentity>,
    Query(params): Query<ListQuizzesParams>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Listing quizzes");
    debug!("List quizzes params: {:?}", params);

    let quiz_type = match params.quiz_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<QuizType>() {
            Ok(kind) => Some(kind),
            Err(err) => {
                warn!("Ignoring quiz type filter: {}", err);
                None
            }
        },
    };
    let filter = QuizFilter {
        module_id: params.module_id,
        course_id: params.course_id,
        quiz_type,
    };
    let page = params.page;
    let per_page = settings.page_size;
    let (rows, pagination, module_choices, course_choices) =
        helper::run_query(&pool, move |conn| {
            let (rows, pagination) = quizzes::list_quizzes(conn, filter, page, per_page)?;
            Ok((
                rows,
                pagination,
                modules::module_choices(conn)?,
                courses::course_choices(conn)?,
            ))
        })
        .await?;
    info!("Fetched {} of {} quizzes", rows.len(), pagination.total);

    let body = views::quizzes::list(
        &rows,
        &pagination,
        &module_choices,
        &course_choices,
        &params,
    );
    Ok(Page(layout::page(
        "Quizzes",
        Section::Quizzes,
        &admin,
        &banner,
        &body,
    )))
}

/// Creates a quiz in an active module; a module holds at most one final quiz.
#[instrument(skip(pool, admin, form))]
pub async fn create_quiz(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    form: Result<Form<QuizForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let mut back = "/quizzes".to_string();
    let outcome = async {
        let form = helper::accept_form(form)?;
        back = format!("/quizzes?module_id={}", form.module_id);
        info!(
            "Admin {} creating {} quiz '{}' in module {}",
            admin.username, form.quiz_type, form.title, form.module_id
        );
        helper::run_transaction(&pool, move |conn| {
            let title = form.title.trim().to_string();
            let id = quizzes::create_quiz(conn, form)?;
            Ok(format!("Quiz '{}' created with ID {}.", title, id))
        })
        .await
    }
    .await;
    finish_write(outcome, &back, &back)
}

/// Edit form of one quiz.
///
/// Returns
/// * The edit page (200 OK).
/// * `404 Not Found`: If the quiz does not exist.
#[instrument(skip(pool, admin, banner))]
pub async fn edit_quiz(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(quiz_id): Path<i64>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Opening quiz {} for editing", quiz_id);
    let (quiz, module_choices) = helper::run_store(&pool, move |conn| {
        let quiz = quizzes::find_quiz(conn, quiz_id)?;
        Ok((quiz, modules::module_choices(conn)?))
    })
    .await?;

    let body = views::quizzes::edit(&quiz, &module_choices);
    Ok(Page(layout::page(
        &format!("Edit quiz: {}", quiz.title),
        Section::Quizzes,
        &admin,
        &banner,
        &body,
    )))
}

/// Moving a quiz to another module is refused once it has attempts.
#[instrument(skip(pool, admin, form))]
pub async fn update_quiz(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(quiz_id): Path<i64>,
    form: Result<Form<QuizForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let form = helper::accept_form(form)?;
        info!("Admin {} updating quiz {}", admin.username, quiz_id);
        helper::run_transaction(&pool, move |conn| {
            quizzes::update_quiz(conn, quiz_id, form)?;
            Ok("Quiz updated.".to_string())
        })
        .await
    }
    .await;
    finish_write(outcome, "/quizzes", &format!("/quizzes/{}/edit", quiz_id))
}

/// Flips `is_active` of a quiz and nothing else.
///
/// Returns
/// * `303 See Other` to `/quizzes` with a `notice` saying the new state.
/// * `303 See Other` to `/quizzes` with an `error` if the quiz does not exist.
#[instrument(skip(pool))]
pub async fn toggle_quiz(
    State(pool): State<Pool>,
    Path(quiz_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Toggling quiz {}", quiz_id);
    let outcome = helper::run_store(&pool, move |conn| {
        quizzes::toggle_quiz(conn, quiz_id).map(|active| toggled("Quiz", active))
    })
    .await;
    finish_write(outcome, "/quizzes", "/quizzes")
}

/// Deletes the quiz with its questions and options in one transaction.
#[instrument(skip(pool, admin))]
pub async fn delete_quiz(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(quiz_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Admin {} deleting quiz {}", admin.username, quiz_id);
    let outcome = helper::run_transaction(&pool, move |conn| {
        let title = quizzes::delete_quiz_cascade(conn, quiz_id)?;
        Ok(format!("Quiz '{}' deleted with its questions.", title))
    })
    .await;
    finish_write(outcome, "/quizzes", "/quizzes")
}

/// Applies activate/deactivate/delete to the ticked quizzes.
///
/// Form fields: `action` and one `id` per selected row. Delete is refused
/// for the whole selection when any quiz has attempts.
#[instrument(skip(pool, admin, form))]
pub async fn bulk_quizzes(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let fields = FormFields::new(helper::accept_form(form)?);
        let request = BulkRequest::from_fields(&fields).map_err(AppError::Validation)?;
        info!(
            "Admin {} applying {:?} to quizzes {:?}",
            admin.username, request.action, request.ids
        );
        helper::run_transaction(&pool, move |conn| {
            let affected = quizzes::bulk_quizzes(conn, &request)?;
            Ok(format!(
                "{} quiz(zes) {}.",
                affected,
                request.action.past_tense()
            ))
        })
        .await
    }
    .await;
    finish_write(outcome, "/quizzes", "/quizzes")
}
