use super::helper;
use crate::Settings;
use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::payloads::Banner;
use crate::payloads::learner::{DateFilter, IssueCertificateForm, ListCertificatesParams};
use crate::response::{Page, finish_write};
use crate::store::certificates::{self, CertificateFilter};
use crate::store::{courses, search_term, students};
use crate::views;
use crate::views::layout::{self, Section};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::{Extension, Form};
use deadpool_diesel::postgres::Pool;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Certificate list.
///
/// Query Parameters:
/// * `search`: matches the certificate code or the student's name and email.
/// * `course_id`: Optional course to filter by.
/// * `date_filter`: `today`, `week`, `month` or `year` on the issue date.
/// * `page`: 1-based page number.
///
/// Returns
/// * The list page with the issue form (200 OK).
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, settings, admin, banner))]
pub async fn list_certificates(
    State(pool): State<Pool>,
    State(settings): State<Arc<Settings>>,
    Extension(admin): Extension<AdminIdentity>,
    Query(params): Query<ListCertificatesParams>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Listing certificates");
    debug!("List certificates params: {:?}", params);

    let filter = CertificateFilter {
        search: search_term(params.search.as_deref()),
        course_id: params.course_id,
        issued: DateFilter::parse(params.date_filter.as_deref()),
    };
    let page = params.page;
    let per_page = settings.page_size;
    let (rows, pagination, course_choices, student_choices) =
        helper::run_query(&pool, move |conn| {
            let (rows, pagination) =
                certificates::list_certificates(conn, filter, page, per_page)?;
            Ok((
                rows,
                pagination,
                courses::course_choices(conn)?,
                students::student_choices(conn)?,
            ))
        })
        .await?;
    info!("Fetched {} of {} certificates", rows.len(), pagination.total);

    let body = views::certificates::list(
        &rows,
        &pagination,
        &course_choices,
        &student_choices,
        &params,
    );
    Ok(Page(layout::page(
        "Certificates",
        Section::Certificates,
        &admin,
        &banner,
        &body,
    )))
}

/// Issues a certificate to a student enrolled in the course.
///
/// Form fields: `user_id`, `course_id`. The verification URL is the
/// configured base URL followed by the generated code.
#[instrument(skip(pool, settings, admin, form))]
pub async fn issue_certificate(
    State(pool): State<Pool>,
    State(settings): State<Arc<Settings>>,
    Extension(admin): Extension<AdminIdentity>,
    form: Result<Form<IssueCertificateForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let form = helper::accept_form(form)?;
        info!(
            "Admin {} issuing certificate for student {} in course {}",
            admin.username, form.user_id, form.course_id
        );
        let base_url = settings.certificate_base_url.clone();
        helper::run_transaction(&pool, move |conn| {
            let code = certificates::issue_certificate(conn, form, &base_url)?;
            Ok(format!("Certificate {} issued.", code))
        })
        .await
    }
    .await;
    finish_write(outcome, "/certificates", "/certificates")
}

/// Revokes a certificate by deleting it.
///
/// Returns
/// * `303 See Other` to `/certificates` with a `notice` naming the code.
/// * `303 See Other` to `/certificates` with an `error` if the certificate does not exist.
#[instrument(skip(pool, admin))]
pub async fn revoke_certificate(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(certificate_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!(
        "Admin {} revoking certificate {}",
        admin.username, certificate_id
    );
    let outcome = helper::run_store(&pool, move |conn| {
        let code = certificates::revoke_certificate(conn, certificate_id)?;
        Ok(format!("Certificate {} revoked.", code))
    })
    .await;
    finish_write(outcome, "/certificates", "/certificates")
}
