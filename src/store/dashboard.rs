use crate::model::learner::{ActivityItem, ActivityKind, DashboardStats};
use crate::schema::{
    certificates, courses, lessons, modules, questions, quiz_attempts, quizzes, user_progress,
    users,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Entries in the recent activity feed.
pub const ACTIVITY_LIMIT: usize = 10;

pub fn load_stats(conn: &mut PgConnection) -> QueryResult<DashboardStats> {
    Ok(DashboardStats {
        total_courses: courses::table.count().get_result(conn)?,
        active_courses: courses::table
            .filter(courses::is_active.eq(true))
            .count()
            .get_result(conn)?,
        total_modules: modules::table.count().get_result(conn)?,
        total_lessons: lessons::table.count().get_result(conn)?,
        total_quizzes: quizzes::table.count().get_result(conn)?,
        total_questions: questions::table.count().get_result(conn)?,
        total_students: users::table.count().get_result(conn)?,
        active_students: users::table
            .filter(users::is_active.eq(true))
            .count()
            .get_result(conn)?,
        total_certificates: certificates::table.count().get_result(conn)?,
        total_attempts: quiz_attempts::table.count().get_result(conn)?,
        passed_attempts: quiz_attempts::table
            .filter(quiz_attempts::passed.eq(true))
            .count()
            .get_result(conn)?,
    })
}

/// Latest enrollments, completed attempts and certificates, newest first.
pub fn recent_activity(conn: &mut PgConnection) -> QueryResult<Vec<ActivityItem>> {
    let limit = ACTIVITY_LIMIT as i64;
    let mut items = Vec::with_capacity(ACTIVITY_LIMIT * 3);

    let enrollments = user_progress::table
        .inner_join(users::table)
        .inner_join(courses::table)
        .filter(user_progress::module_id.is_null())
        .filter(user_progress::lesson_id.is_null())
        .order(user_progress::created_at.desc())
        .limit(limit)
        .select((
            users::first_name,
            users::last_name,
            courses::title,
            user_progress::created_at,
        ))
        .load::<(String, String, String, DateTime<Utc>)>(conn)?;
    items.extend(
        enrollments
            .into_iter()
            .map(|(first, last, course, at)| ActivityItem {
                kind: ActivityKind::Enrollment,
                description: format!("{} {} enrolled in {}", first, last, course),
                at,
            }),
    );

    let attempts = quiz_attempts::table
        .inner_join(users::table)
        .inner_join(quizzes::table)
        .filter(quiz_attempts::completed_at.is_not_null())
        .order(quiz_attempts::completed_at.desc())
        .limit(limit)
        .select((
            users::first_name,
            users::last_name,
            quizzes::title,
            quiz_attempts::score,
            quiz_attempts::passed,
            quiz_attempts::completed_at,
        ))
        .load::<(String, String, String, BigDecimal, bool, Option<DateTime<Utc>>)>(conn)?;
    items.extend(
        attempts
            .into_iter()
            .filter_map(|(first, last, quiz, score, passed, completed_at)| {
                completed_at.map(|at| ActivityItem {
                    kind: ActivityKind::QuizAttempt,
                    description: format!(
                        "{} {} {} {} with {}%",
                        first,
                        last,
                        if passed { "passed" } else { "failed" },
                        quiz,
                        score.with_scale(1)
                    ),
                    at,
                })
            }),
    );

    let issued = certificates::table
        .inner_join(users::table)
        .inner_join(courses::table)
        .order(certificates::issued_at.desc())
        .limit(limit)
        .select((
            users::first_name,
            users::last_name,
            courses::title,
            certificates::issued_at,
        ))
        .load::<(String, String, String, DateTime<Utc>)>(conn)?;
    items.extend(
        issued
            .into_iter()
            .map(|(first, last, course, at)| ActivityItem {
                kind: ActivityKind::Certificate,
                description: format!("{} {} earned a certificate for {}", first, last, course),
                at,
            }),
    );

    Ok(merge_recent(items))
}

fn merge_recent(mut items: Vec<ActivityItem>) -> Vec<ActivityItem> {
    items.sort_by(|a, b| b.at.cmp(&a.at));
    items.truncate(ACTIVITY_LIMIT);
    items
}
