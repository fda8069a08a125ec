use super::{helper, toggled};
use crate::Settings;
use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::payloads::Banner;
use crate::payloads::assessment::{
    ListQuestionsParams, NewQuestionParams, UpdateQuestionForm, parse_question_form,
};
use crate::payloads::form::FormFields;
use crate::response::{Page, finish_write};
use crate::store::questions::{self, QuestionFilter};
use crate::store::{quizzes, search_term};
use crate::views;
use crate::views::layout::{self, Section};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::{Extension, Form};
use deadpool_diesel::postgres::Pool;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Question list.
///
/// Query Parameters:
/// * `quiz_id`: Optional quiz to filter by.
/// * `search`: matches the question text.
/// * `page`: 1-based page number.
///
/// Returns
/// * The list page with option and answer counts (200 OK).
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, settings, admin, banner))]
pub async fn list_questions(
    State(pool): State<Pool>,
    State(settings): State<Arc<Settings>>,
    Extension(admin): Extension<AdminIdentity>,
    Query(params): Query<ListQuestionsParams>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Listing questions");
    debug!("List questions params: {:?}", params);

    let filter = QuestionFilter {
        quiz_id: params.quiz_id,
        search: search_term(params.search.as_deref()),
    };
    let page = params.page;
    let per_page = settings.page_size;
    let (rows, pagination, quiz_choices) = helper::run_query(&pool, move |conn| {
        let (rows, pagination) = questions::list_questions(conn, filter, page, per_page)?;
        Ok((rows, pagination, quizzes::quiz_choices(conn)?))
    })
    .await?;
    info!("Fetched {} of {} questions", rows.len(), pagination.total);

    let body = views::questions::list(&rows, &pagination, &quiz_choices, &params);
    Ok(Page(layout::page(
        "Questions",
        Section::Questions,
        &admin,
        &banner,
        &body,
    )))
}

/// Create form for a question.
///
/// Query Parameters:
/// * `quiz_id`: Optional quiz preselected in the form.
#[instrument(skip(pool, admin, banner))]
pub async fn new_question(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Query(params): Query<NewQuestionParams>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    let quiz_choices = helper::run_query(&pool, quizzes::quiz_choices).await?;
    let body = views::questions::new_form(&quiz_choices, params.quiz_id);
    Ok(Page(layout::page(
        "New question",
        Section::Questions,
        &admin,
        &banner,
        &body,
    )))
}

/// Creates a question together with its options.
///
/// Form fields: `quiz_id`, `question_text`, `question_type`, `points`,
/// `order_sequence` (blank appends), then `option_text_N`/`option_correct_N`
/// for multiple choice or `correct_answer` for true/false.
#[instrument(skip(pool, admin, form))]
pub async fn create_question(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Redirect, AppError> {
    let fields = helper::accept_form(form).map(FormFields::new);
    let quiz_param = fields
        .as_ref()
        .ok()
        .and_then(|fields| fields.number::<i64>("quiz_id").ok().flatten())
        .map(|id| format!("?quiz_id={}", id))
        .unwrap_or_default();
    let outcome = async {
        let fields = fields?;
        let draft = parse_question_form(&fields).map_err(AppError::Validation)?;
        info!(
            "Admin {} creating {} question in quiz {} with {} submitted options",
            admin.username,
            draft.question_type,
            draft.quiz_id,
            draft.options.len()
        );
        helper::run_transaction(&pool, move |conn| {
            let id = questions::create_question_with_options(conn, draft)?;
            Ok(format!("Question created with ID {}.", id))
        })
        .await
    }
    .await;
    finish_write(
        outcome,
        &format!("/questions{}", quiz_param),
        &format!("/questions/new{}", quiz_param),
    )
}

/// Edit form of one question.
///
/// Returns
/// * The edit page (200 OK).
/// * `404 Not Found`: If the question does not exist.
#[instrument(skip(pool, admin, banner))]
pub async fn edit_question(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(question_id): Path<i64>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Opening question {} for editing", question_id);
    let (question, options) = helper::run_store(&pool, move |conn| {
        let question = questions::find_question(conn, question_id)?;
        let options = questions::options_of(conn, question_id)?;
        Ok((question, options))
    })
    .await?;

    let body = views::questions::edit(&question, &options);
    Ok(Page(layout::page(
        &format!("Edit question {}", question.id),
        Section::Questions,
        &admin,
        &banner,
        &body,
    )))
}

/// Saves text, points, order and state of a question. The type never changes;
/// for true/false questions `correct_answer` moves the correct flag.
///
/// Returns
/// * `303 See Other` back to `/questions/{id}/edit` with a `notice` or an `error`.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, admin, form))]
pub async fn update_question(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(question_id): Path<i64>,
    form: Result<Form<UpdateQuestionForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let form = helper::accept_form(form)?;
        info!("Admin {} updating question {}", admin.username, question_id);
        helper::run_transaction(&pool, move |conn| {
            questions::update_question(conn, question_id, form)?;
            Ok("Question updated.".to_string())
        })
        .await
    }
    .await;
    let back = format!("/questions/{}/edit", question_id);
    finish_write(outcome, &back, &back)
}

/// Flips `is_active` of a question.
#[instrument(skip(pool))]
pub async fn toggle_question(
    State(pool): State<Pool>,
    Path(question_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Toggling question {}", question_id);
    let outcome = helper::run_store(&pool, move |conn| {
        questions::toggle_question(conn, question_id).map(|active| toggled("Question", active))
    })
    .await;
    finish_write(outcome, "/questions", "/questions")
}

/// Deletes the question and its options unless students answered it.
#[instrument(skip(pool, admin))]
pub async fn delete_question(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(question_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Admin {} deleting question {}", admin.username, question_id);
    let outcome = helper::run_transaction(&pool, move |conn| {
        questions::delete_question(conn, question_id)
    })
    .await;
    match outcome {
        Ok(quiz_id) => finish_write(
            Ok("Question deleted.".to_string()),
            &format!("/questions?quiz_id={}", quiz_id),
            "/questions",
        ),
        Err(err) => finish_write(Err(err), "/questions", "/questions"),
    }
}
