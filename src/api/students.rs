use super::{helper, toggled};
use crate::Settings;
use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::payloads::form::FormFields;
use crate::payloads::learner::{DateFilter, ListStudentsParams};
use crate::payloads::{Banner, BulkRequest};
use crate::response::{Page, finish_write};
use crate::store::search_term;
use crate::store::students::{self, StudentFilter};
use crate::views;
use crate::views::layout::{self, Section};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::{Extension, Form};
use deadpool_diesel::postgres::Pool;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Student list.
///
/// Query Parameters:
/// * `search`: matches first name, last name, email or institute.
/// * `date_filter`: `today`, `week`, `month` or `year` on the join date.
/// * `page`: 1-based page number.
#[instrument(skip(pool, settings, admin, banner))]
pub async fn list_students(
    State(pool): State<Pool>,
    State(settings): State<Arc<Settings>>,
    Extension(admin): Extension<AdminIdentity>,
    Query(params): Query<ListStudentsParams>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Listing students");
    debug!("List students params: {:?}", params);

    let filter = StudentFilter {
        search: search_term(params.search.as_deref()),
        joined: DateFilter::parse(params.date_filter.as_deref()),
    };
    let page = params.page;
    let per_page = settings.page_size;
    let (rows, pagination) = helper::run_query(&pool, move |conn| {
        students::list_students(conn, filter, page, per_page)
    })
    .await?;
    info!("Fetched {} of {} students", rows.len(), pagination.total);

    let body = views::students::list(&rows, &pagination, &params);
    Ok(Page(layout::page(
        "Students",
        Section::Students,
        &admin,
        &banner,
        &body,
    )))
}

/// Student detail: enrollments, recent attempts and certificates.
///
/// Returns
/// * The detail page (200 OK).
/// * `404 Not Found`: If the student does not exist.
#[instrument(skip(pool, admin, banner))]
pub async fn show_student(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(student_id): Path<i64>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Showing student {}", student_id);
    let detail =
        helper::run_store(&pool, move |conn| students::student_detail(conn, student_id)).await?;
    debug!(
        "Student {} has {} enrollments, {} attempts, {} certificates",
        student_id,
        detail.enrollments.len(),
        detail.attempts.len(),
        detail.certificates.len()
    );

    let body = views::students::detail(&detail);
    Ok(Page(layout::page(
        &detail.student.full_name(),
        Section::Students,
        &admin,
        &banner,
        &body,
    )))
}

/// Flips `is_active` of a student.
///
/// Returns
/// * `303 See Other` to `/students/{id}` with a `notice`.
/// * `303 See Other` to `/students` with an `error` if the student does not exist.
#[instrument(skip(pool, admin))]
pub async fn toggle_student(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(student_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Admin {} toggling student {}", admin.username, student_id);
    let outcome = helper::run_store(&pool, move |conn| {
        students::toggle_student(conn, student_id).map(|active| toggled("Student", active))
    })
    .await;
    finish_write(outcome, &format!("/students/{}", student_id), "/students")
}

/// Activates or deactivates the ticked students.
#[instrument(skip(pool, admin, form))]
pub async fn bulk_students(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let fields = FormFields::new(helper::accept_form(form)?);
        let request = BulkRequest::from_fields(&fields).map_err(AppError::Validation)?;
        info!(
            "Admin {} applying {:?} to students {:?}",
            admin.username, request.action, request.ids
        );
        helper::run_transaction(&pool, move |conn| {
            let affected = students::bulk_students(conn, &request)?;
            Ok(format!(
                "{} student(s) {}.",
                affected,
                request.action.past_tense()
            ))
        })
        .await
    }
    .await;
    finish_write(outcome, "/students", "/students")
}
