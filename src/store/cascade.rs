//! Child-first deletes. Callers run these inside a transaction after the
//! matching guard has confirmed that no student data references the rows.

use super::guards::{option_ids_for_questions, question_ids_for_quizzes};
use crate::schema::{courses, lessons, modules, question_options, questions, quizzes};
use diesel::prelude::*;
use tracing::info;

/// Deletes the options and questions of `quiz_ids`, then the quizzes.
pub fn delete_quizzes(conn: &mut PgConnection, quiz_ids: &[i64]) -> QueryResult<usize> {
    let question_ids = question_ids_for_quizzes(conn, quiz_ids)?;
    delete_questions(conn, &question_ids)?;

    let deleted = diesel::delete(quizzes::table.filter(quizzes::id.eq_any(quiz_ids))).execute(conn)?;
    info!("Deleted {} quizzes", deleted);
    Ok(deleted)
}

/// Deletes the options of `question_ids`, then the questions.
pub fn delete_questions(conn: &mut PgConnection, question_ids: &[i64]) -> QueryResult<usize> {
    if question_ids.is_empty() {
        return Ok(0);
    }
    let option_ids = option_ids_for_questions(conn, question_ids)?;
    let options_deleted = diesel::delete(
        question_options::table.filter(question_options::id.eq_any(&option_ids)),
    )
    .execute(conn)?;
    info!("Deleted {} question options", options_deleted);

    let deleted =
        diesel::delete(questions::table.filter(questions::id.eq_any(question_ids))).execute(conn)?;
    info!("Deleted {} questions", deleted);
    Ok(deleted)
}

/// Deletes lessons and quizzes of `module_ids`, then the modules.
pub fn delete_modules(conn: &mut PgConnection, module_ids: &[i64]) -> QueryResult<usize> {
    if module_ids.is_empty() {
        return Ok(0);
    }
    let lessons_deleted =
        diesel::delete(lessons::table.filter(lessons::module_id.eq_any(module_ids))).execute(conn)?;
    info!("Deleted {} lessons", lessons_deleted);

    let quiz_ids = quizzes::table
        .filter(quizzes::module_id.eq_any(module_ids))
        .select(quizzes::id)
        .load::<i64>(conn)?;
    delete_quizzes(conn, &quiz_ids)?;

    let deleted =
        diesel::delete(modules::table.filter(modules::id.eq_any(module_ids))).execute(conn)?;
    info!("Deleted {} modules", deleted);
    Ok(deleted)
}

/// Deletes the whole content tree of `course_ids`, then the courses.
pub fn delete_courses(conn: &mut PgConnection, course_ids: &[i64]) -> QueryResult<usize> {
    let module_ids = modules::table
        .filter(modules::course_id.eq_any(course_ids))
        .select(modules::id)
        .load::<i64>(conn)?;
    delete_modules(conn, &module_ids)?;

    let deleted =
        diesel::delete(courses::table.filter(courses::id.eq_any(course_ids))).execute(conn)?;
    info!("Deleted {} courses", deleted);
    Ok(deleted)
}
