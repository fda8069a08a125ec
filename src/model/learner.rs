use crate::schema::{certificates, users};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub institute_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct StudentListRow {
    pub student: Student,
    pub enrollment_count: i64,
    pub certificate_count: i64,
}

#[derive(Queryable, Debug, Clone)]
pub struct EnrollmentRow {
    pub course_id: i64,
    pub course_title: String,
    pub status: String,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Queryable, Debug, Clone)]
pub struct AttemptRow {
    pub id: i64,
    pub quiz_title: String,
    pub attempt_number: i32,
    pub score: BigDecimal,
    pub passed: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct StudentDetail {
    pub student: Student,
    pub enrollments: Vec<EnrollmentRow>,
    pub attempts: Vec<AttemptRow>,
    pub certificates: Vec<CertificateListRow>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = certificates)]
pub struct NewCertificate {
    pub user_id: i64,
    pub course_id: i64,
    pub certificate_code: String,
    pub verification_url: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = certificates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Certificate {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub certificate_code: String,
    pub issued_at: DateTime<Utc>,
    pub verification_url: String,
}

#[derive(Debug, Clone)]
pub struct CertificateListRow {
    pub certificate: Certificate,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub course_title: String,
}

impl CertificateListRow {
    pub fn from_row(
        (certificate, first_name, last_name, email, course_title): (
            Certificate,
            String,
            String,
            String,
            String,
        ),
    ) -> Self {
        CertificateListRow {
            certificate,
            first_name,
            last_name,
            email,
            course_title,
        }
    }
}

/// Minimal student reference for select boxes.
#[derive(Queryable, Debug, Clone)]
pub struct StudentChoice {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    pub total_courses: i64,
    pub active_courses: i64,
    pub total_modules: i64,
    pub total_lessons: i64,
    pub total_quizzes: i64,
    pub total_questions: i64,
    pub total_students: i64,
    pub active_students: i64,
    pub total_certificates: i64,
    pub total_attempts: i64,
    pub passed_attempts: i64,
}

impl DashboardStats {
    /// Share of attempts that passed, in percent.
    pub fn pass_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.passed_attempts as f64 * 100.0 / self.total_attempts as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Enrollment,
    QuizAttempt,
    Certificate,
}

impl ActivityKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Enrollment => "Enrollment",
            ActivityKind::QuizAttempt => "Quiz attempt",
            ActivityKind::Certificate => "Certificate",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub description: String,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_rate_is_zero_without_attempts() {
        let stats = DashboardStats::default();
        assert_eq!(stats.pass_rate(), 0.0);
    }

    #[test]
    fn pass_rate_is_a_percentage() {
        let stats = DashboardStats {
            total_attempts: 8,
            passed_attempts: 6,
            ..Default::default()
        };
        assert_eq!(stats.pass_rate(), 75.0);
    }
}
