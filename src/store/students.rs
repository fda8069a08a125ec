use super::like_pattern;
use crate::errors::AppError;
use crate::model::Pagination;
use crate::model::learner::{
    AttemptRow, Certificate, CertificateListRow, EnrollmentRow, Student, StudentChoice,
    StudentDetail, StudentListRow,
};
use crate::payloads::learner::DateFilter;
use crate::payloads::{BulkAction, BulkRequest};
use crate::schema::{certificates, courses, quiz_attempts, quizzes, user_progress, users};
use chrono::Utc;
use diesel::dsl::{count_star, not};
use diesel::prelude::*;
use std::collections::HashMap;
use tracing::info;

/// Attempts shown on the student detail page.
pub const RECENT_ATTEMPTS: i64 = 20;

#[derive(Debug, Default)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub joined: Option<DateFilter>,
}

pub fn list_students(
    conn: &mut PgConnection,
    filter: StudentFilter,
    page: Option<i64>,
    per_page: i64,
) -> QueryResult<(Vec<StudentListRow>, Pagination)> {
    let mut count_query = users::table.into_boxed();
    let mut rows_query = users::table.into_boxed();
    if let Some(term) = filter.search {
        let pattern = like_pattern(&term);
        let matches = users::first_name
            .ilike(pattern.clone())
            .or(users::last_name.ilike(pattern.clone()))
            .or(users::email.ilike(pattern.clone()))
            .or(users::institute_name.ilike(pattern));
        count_query = count_query.filter(matches.clone());
        rows_query = rows_query.filter(matches);
    }
    if let Some(window) = filter.joined {
        let since = window.since(Utc::now());
        count_query = count_query.filter(users::created_at.ge(since));
        rows_query = rows_query.filter(users::created_at.ge(since));
    }

    let total = count_query.count().get_result::<i64>(conn)?;
    let pagination = Pagination::new(page, per_page, total);

    let page_students = rows_query
        .order((users::created_at.desc(), users::id.desc()))
        .limit(pagination.per_page)
        .offset(pagination.offset())
        .select(Student::as_select())
        .load::<Student>(conn)?;
    let ids: Vec<i64> = page_students.iter().map(|s| s.id).collect();

    let enrollment_counts: HashMap<i64, i64> = user_progress::table
        .filter(user_progress::user_id.eq_any(&ids))
        .filter(user_progress::module_id.is_null())
        .filter(user_progress::lesson_id.is_null())
        .group_by(user_progress::user_id)
        .select((user_progress::user_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();
    let certificate_counts: HashMap<i64, i64> = certificates::table
        .filter(certificates::user_id.eq_any(&ids))
        .group_by(certificates::user_id)
        .select((certificates::user_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();

    let rows = page_students
        .into_iter()
        .map(|student| StudentListRow {
            enrollment_count: enrollment_counts.get(&student.id).copied().unwrap_or(0),
            certificate_count: certificate_counts.get(&student.id).copied().unwrap_or(0),
            student,
        })
        .collect();
    Ok((rows, pagination))
}

pub fn find_student(conn: &mut PgConnection, student_id: i64) -> Result<Student, AppError> {
    users::table
        .find(student_id)
        .select(Student::as_select())
        .first::<Student>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Student with ID {} not found.", student_id)))
}

/// Profile with enrollments, latest attempts and certificates.
pub fn student_detail(conn: &mut PgConnection, student_id: i64) -> Result<StudentDetail, AppError> {
    let student = find_student(conn, student_id)?;

    let enrollments = user_progress::table
        .inner_join(courses::table)
        .filter(user_progress::user_id.eq(student_id))
        .filter(user_progress::module_id.is_null())
        .filter(user_progress::lesson_id.is_null())
        .order(user_progress::created_at.desc())
        .select((
            courses::id,
            courses::title,
            user_progress::status,
            user_progress::created_at,
            user_progress::completed_at,
        ))
        .load::<EnrollmentRow>(conn)?;

    let attempts = quiz_attempts::table
        .inner_join(quizzes::table)
        .filter(quiz_attempts::user_id.eq(student_id))
        .order(quiz_attempts::started_at.desc())
        .limit(RECENT_ATTEMPTS)
        .select((
            quiz_attempts::id,
            quizzes::title,
            quiz_attempts::attempt_number,
            quiz_attempts::score,
            quiz_attempts::passed,
            quiz_attempts::started_at,
            quiz_attempts::completed_at,
        ))
        .load::<AttemptRow>(conn)?;

    let certificates = certificates::table
        .inner_join(users::table)
        .inner_join(courses::table)
        .filter(certificates::user_id.eq(student_id))
        .order(certificates::issued_at.desc())
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

    Ok(StudentDetail {
        student,
        enrollments,
        attempts,
        certificates,
    })
}

/// Active students, for the certificate form.
pub fn student_choices(conn: &mut PgConnection) -> QueryResult<Vec<StudentChoice>> {
    users::table
        .filter(users::is_active.eq(true))
        .order((users::last_name.asc(), users::first_name.asc()))
        .select((users::id, users::first_name, users::last_name, users::email))
        .load::<StudentChoice>(conn)
}

pub fn toggle_student(conn: &mut PgConnection, student_id: i64) -> Result<bool, AppError> {
    diesel::update(users::table.find(student_id))
        .set(users::is_active.eq(not(users::is_active)))
        .returning(users::is_active)
        .get_result::<bool>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Student with ID {} not found.", student_id)))
}

/// Students are only ever activated or deactivated in bulk.
pub fn bulk_students(conn: &mut PgConnection, request: &BulkRequest) -> Result<usize, AppError> {
    let active = match request.action {
        BulkAction::Activate => true,
        BulkAction::Deactivate => false,
        BulkAction::Delete => {
            return Err(AppError::Validation(
                "Students cannot be deleted. Deactivate them instead.".to_string(),
            ));
        }
    };
    let found = users::table
        .filter(users::id.eq_any(&request.ids))
        .count()
        .get_result::<i64>(conn)?;
    if found != request.ids.len() as i64 {
        return Err(AppError::NotFound(format!(
            "{} of the selected students no longer exist.",
            request.ids.len() as i64 - found
        )));
    }

    let affected = diesel::update(users::table.filter(users::id.eq_any(&request.ids)))
        .set(users::is_active.eq(active))
        .execute(conn)?;
    info!("Bulk {:?} applied to {} students", request.action, affected);
    Ok(affected)
}
