use super::like_pattern;
use crate::errors::AppError;
use crate::model::Pagination;
use crate::model::learner::{Certificate, CertificateListRow, NewCertificate};
use crate::payloads::learner::{DateFilter, IssueCertificateForm};
use crate::schema::{certificates, courses, user_progress, users};
use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

pub const CODE_PREFIX: &str = "CERT-";
const CODE_LENGTH: usize = 12;

#[derive(Debug, Default)]
pub struct CertificateFilter {
    pub search: Option<String>,
    pub course_id: Option<i64>,
    pub issued: Option<DateFilter>,
}

pub fn list_certificates(
    conn: &mut PgConnection,
    filter: CertificateFilter,
    page: Option<i64>,
    per_page: i64,
) -> QueryResult<(Vec<CertificateListRow>, Pagination)> {
    let mut count_query = certificates::table
        .inner_join(users::table)
        .inner_join(courses::table)
        .into_boxed();
    let mut rows_query = certificates::table
        .inner_join(users::table)
        .inner_join(courses::table)
        .into_boxed();
    if let Some(term) = filter.search {
        let pattern = like_pattern(&term);
        let matches = users::first_name
            .ilike(pattern.clone())
            .or(users::last_name.ilike(pattern.clone()))
            .or(users::email.ilike(pattern.clone()))
            .or(certificates::certificate_code.ilike(pattern));
        count_query = count_query.filter(matches.clone());
        rows_query = rows_query.filter(matches);
    }
    if let Some(course_id) = filter.course_id {
        count_query = count_query.filter(certificates::course_id.eq(course_id));
        rows_query = rows_query.filter(certificates::course_id.eq(course_id));
    }
    if let Some(window) = filter.issued {
        let since = window.since(Utc::now());
        count_query = count_query.filter(certificates::issued_at.ge(since));
        rows_query = rows_query.filter(certificates::issued_at.ge(since));
    }

    let total = count_query.count().get_result::<i64>(conn)?;
    let pagination = Pagination::new(page, per_page, total);

    let rows = rows_query
        .order((certificates::issued_at.desc(), certificates::id.desc()))
        .limit(pagination.per_page)
        .offset(pagination.offset())
        .select((
            Certificate::as_select(),
            users::first_name,
            users::last_name,
            users::email,
            courses::title,
        ))
        .load::<(Certificate, String, String, String, String)>(conn)?
        .into_iter()
        .map(CertificateListRow::from_row)
        .collect();
    Ok((rows, pagination))
}

/// `CERT-` followed by twelve upper-case hex digits of a random UUID.
pub fn generate_code() -> String {
    let digits = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}{}", CODE_PREFIX, &digits[..CODE_LENGTH])
}

/// Issues a certificate to an enrolled student and returns its code.
pub fn issue_certificate(
    conn: &mut PgConnection,
    form: IssueCertificateForm,
    base_url: &str,
) -> Result<String, AppError> {
    let student_exists =
        diesel::select(exists(users::table.find(form.user_id))).get_result::<bool>(conn)?;
    if !student_exists {
        return Err(AppError::NotFound(format!(
            "Student with ID {} not found.",
            form.user_id
        )));
    }
    let course_title = courses::table
        .find(form.course_id)
        .select(courses::title)
        .first::<String>(conn)
        .optional()?
        .ok_or_else(|| {
            AppError::NotFound(format!("Course with ID {} not found.", form.course_id))
        })?;

    let enrolled = diesel::select(exists(
        user_progress::table
            .filter(user_progress::user_id.eq(form.user_id))
            .filter(user_progress::course_id.eq(form.course_id))
            .filter(user_progress::module_id.is_null())
            .filter(user_progress::lesson_id.is_null()),
    ))
    .get_result::<bool>(conn)?;
    if !enrolled {
        return Err(AppError::Validation(format!(
            "The student is not enrolled in '{}'.",
            course_title
        )));
    }

    let already_issued = diesel::select(exists(
        certificates::table
            .filter(certificates::user_id.eq(form.user_id))
            .filter(certificates::course_id.eq(form.course_id)),
    ))
    .get_result::<bool>(conn)?;
    if already_issued {
        warn!(
            "Student {} already holds a certificate for course {}",
            form.user_id, form.course_id
        );
        return Err(AppError::Validation(
            "This student already holds a certificate for this course.".to_string(),
        ));
    }

    let certificate_code = generate_code();
    let new_certificate = NewCertificate {
        user_id: form.user_id,
        course_id: form.course_id,
        verification_url: format!("{}{}", base_url, certificate_code),
        certificate_code,
    };
    diesel::insert_into(certificates::table)
        .values(&new_certificate)
        .execute(conn)?;
    info!(
        "Issued certificate {} to student {} for course {}",
        new_certificate.certificate_code, new_certificate.user_id, new_certificate.course_id
    );
    Ok(new_certificate.certificate_code)
}

/// Deletes a certificate and returns its code.
pub fn revoke_certificate(conn: &mut PgConnection, certificate_id: i64) -> Result<String, AppError> {
    let code = diesel::delete(certificates::table.find(certificate_id))
        .returning(certificates::certificate_code)
        .get_result::<String>(conn)
        .optional()?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Certificate with ID {} not found.",
                certificate_id
            ))
        })?;
    info!("Revoked certificate {}", code);
    Ok(code)
}
