use super::helper;
use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::payloads::Banner;
use crate::payloads::assessment::AddOptionForm;
use crate::payloads::form::FormFields;
use crate::response::{Page, finish_write};
use crate::store::{options, questions};
use crate::views;
use crate::views::layout::{self, Section};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::{Extension, Form};
use deadpool_diesel::postgres::Pool;
use tracing::{info, instrument};

fn editor_path(question_id: i64) -> String {
    format!("/questions/{}/options", question_id)
}

/// Option editor of one question.
#[instrument(skip(pool, admin, banner))]
pub async fn list_options(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(question_id): Path<i64>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Opening option editor of question {}", question_id);
    let (question, question_options) = helper::run_store(&pool, move |conn| {
        let question = questions::find_question(conn, question_id)?;
        let question_options = questions::options_of(conn, question_id)?;
        Ok((question, question_options))
    })
    .await?;
    info!(
        "Question {} has {} options",
        question_id,
        question_options.len()
    );

    let body = views::questions::options_editor(&question, &question_options);
    Ok(Page(layout::page(
        &format!("Options of question {}", question_id),
        Section::Questions,
        &admin,
        &banner,
        &body,
    )))
}

/// Appends an option to a multiple choice question.
///
/// Form fields: `option_text`, `is_correct` checkbox.
///
/// Returns
/// * `303 See Other` to the option editor with a `notice` on success.
/// * `303 See Other` to the option editor with an `error` when the question is
///   not multiple choice or no option position is left.
#[instrument(skip(pool, admin, form))]
pub async fn add_option(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(question_id): Path<i64>,
    form: Result<Form<AddOptionForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let form = helper::accept_form(form)?;
        info!(
            "Admin {} adding option to question {}",
            admin.username, question_id
        );
        helper::run_transaction(&pool, move |conn| {
            let id = options::add_option(conn, question_id, form)?;
            Ok(format!("Option {} added.", id))
        })
        .await
    }
    .await;
    let back = editor_path(question_id);
    finish_write(outcome, &back, &back)
}

/// Saves every option row at once; an invalid result rolls the whole save back.
#[instrument(skip(pool, admin, form))]
pub async fn bulk_update_options(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(question_id): Path<i64>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Redirect, AppError> {
    info!(
        "Admin {} saving options of question {}",
        admin.username, question_id
    );
    let outcome = async {
        let fields = FormFields::new(helper::accept_form(form)?);
        helper::run_transaction(&pool, move |conn| {
            let updated = options::bulk_update_options(conn, question_id, &fields)?;
            Ok(format!("{} option(s) saved.", updated))
        })
        .await
    }
    .await;
    let back = editor_path(question_id);
    finish_write(outcome, &back, &back)
}

/// Deletes an option unless answers reference it or the question would become invalid.
///
/// Returns
/// * `303 See Other` to the option editor of the owning question with a `notice` or an `error`.
#[instrument(skip(pool, admin))]
pub async fn delete_option(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(option_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Admin {} deleting option {}", admin.username, option_id);
    let owner =
        helper::run_query(&pool, move |conn| options::question_of_option(conn, option_id)).await?;
    let back = owner.map(editor_path).unwrap_or_else(|| "/questions".to_string());

    let outcome = helper::run_transaction(&pool, move |conn| {
        options::delete_option(conn, option_id)?;
        Ok("Option deleted.".to_string())
    })
    .await;
    finish_write(outcome, &back, &back)
}
