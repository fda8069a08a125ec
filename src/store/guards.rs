//! Deletion guards: an entity referenced by student-generated rows can only
//! be deactivated, never deleted.

use crate::errors::AppError;
use crate::schema::{
    certificates, lessons, modules, question_options, questions, quiz_attempts, quizzes,
    user_answers, user_progress,
};
use diesel::prelude::*;

/// Student data that blocks a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Progress(i64),
    Certificates(i64),
    Attempts(i64),
    Answers(i64),
}

impl Dependency {
    fn count(&self) -> i64 {
        match self {
            Dependency::Progress(n)
            | Dependency::Certificates(n)
            | Dependency::Attempts(n)
            | Dependency::Answers(n) => *n,
        }
    }

    fn describe(&self) -> String {
        let noun = match self {
            Dependency::Progress(_) => "progress record",
            Dependency::Certificates(_) => "certificate",
            Dependency::Attempts(_) => "quiz attempt",
            Dependency::Answers(_) => "student answer",
        };
        let n = self.count();
        format!("{} {}{}", n, noun, if n == 1 { "" } else { "s" })
    }
}

/// `Ok` when nothing depends on the entity, `IntegrityBlock` otherwise.
pub fn ensure_no_dependents(entity: &str, dependencies: &[Dependency]) -> Result<(), AppError> {
    let blocking: Vec<String> = dependencies
        .iter()
        .filter(|d| d.count() > 0)
        .map(Dependency::describe)
        .collect();
    if blocking.is_empty() {
        return Ok(());
    }
    Err(AppError::IntegrityBlock(format!(
        "Cannot delete {}: it is referenced by {}. Deactivate it instead.",
        entity,
        blocking.join(" and ")
    )))
}

pub fn course_dependencies(
    conn: &mut PgConnection,
    course_ids: &[i64],
) -> QueryResult<Vec<Dependency>> {
    let progress = user_progress::table
        .filter(user_progress::course_id.eq_any(course_ids))
        .count()
        .get_result::<i64>(conn)?;
    let issued = certificates::table
        .filter(certificates::course_id.eq_any(course_ids))
        .count()
        .get_result::<i64>(conn)?;
    let module_ids = modules::table
        .filter(modules::course_id.eq_any(course_ids))
        .select(modules::id)
        .load::<i64>(conn)?;
    let attempts = attempts_for_modules(conn, &module_ids)?;
    Ok(vec![
        Dependency::Progress(progress),
        Dependency::Certificates(issued),
        Dependency::Attempts(attempts),
    ])
}

pub fn module_dependencies(
    conn: &mut PgConnection,
    module_ids: &[i64],
) -> QueryResult<Vec<Dependency>> {
    let lesson_ids = lessons::table
        .filter(lessons::module_id.eq_any(module_ids))
        .select(lessons::id)
        .load::<i64>(conn)?;
    let progress = user_progress::table
        .filter(
            user_progress::module_id
                .eq_any(module_ids)
                .or(user_progress::lesson_id.eq_any(&lesson_ids)),
        )
        .count()
        .get_result::<i64>(conn)?;
    let attempts = attempts_for_modules(conn, module_ids)?;
    Ok(vec![
        Dependency::Progress(progress),
        Dependency::Attempts(attempts),
    ])
}

pub fn lesson_dependencies(
    conn: &mut PgConnection,
    lesson_ids: &[i64],
) -> QueryResult<Vec<Dependency>> {
    let progress = user_progress::table
        .filter(user_progress::lesson_id.eq_any(lesson_ids))
        .count()
        .get_result::<i64>(conn)?;
    Ok(vec![Dependency::Progress(progress)])
}

pub fn quiz_dependencies(
    conn: &mut PgConnection,
    quiz_ids: &[i64],
) -> QueryResult<Vec<Dependency>> {
    let attempts = quiz_attempts::table
        .filter(quiz_attempts::quiz_id.eq_any(quiz_ids))
        .count()
        .get_result::<i64>(conn)?;
    Ok(vec![Dependency::Attempts(attempts)])
}

pub fn question_dependencies(
    conn: &mut PgConnection,
    question_ids: &[i64],
) -> QueryResult<Vec<Dependency>> {
    let answers = user_answers::table
        .filter(user_answers::question_id.eq_any(question_ids))
        .count()
        .get_result::<i64>(conn)?;
    Ok(vec![Dependency::Answers(answers)])
}

pub fn option_dependencies(
    conn: &mut PgConnection,
    option_ids: &[i64],
) -> QueryResult<Vec<Dependency>> {
    let answers = user_answers::table
        .filter(user_answers::selected_option_id.eq_any(option_ids))
        .count()
        .get_result::<i64>(conn)?;
    Ok(vec![Dependency::Answers(answers)])
}

fn attempts_for_modules(conn: &mut PgConnection, module_ids: &[i64]) -> QueryResult<i64> {
    if module_ids.is_empty() {
        return Ok(0);
    }
    let quiz_ids = quizzes::table
        .filter(quizzes::module_id.eq_any(module_ids))
        .select(quizzes::id)
        .load::<i64>(conn)?;
    if quiz_ids.is_empty() {
        return Ok(0);
    }
    quiz_attempts::table
        .filter(quiz_attempts::quiz_id.eq_any(&quiz_ids))
        .count()
        .get_result::<i64>(conn)
}

/// Ids of the options that belong to `question_ids`.
pub fn option_ids_for_questions(
    conn: &mut PgConnection,
    question_ids: &[i64],
) -> QueryResult<Vec<i64>> {
    question_options::table
        .filter(question_options::question_id.eq_any(question_ids))
        .select(question_options::id)
        .load::<i64>(conn)
}

/// Ids of the questions that belong to `quiz_ids`.
pub fn question_ids_for_quizzes(
    conn: &mut PgConnection,
    quiz_ids: &[i64],
) -> QueryResult<Vec<i64>> {
    questions::table
        .filter(questions::quiz_id.eq_any(quiz_ids))
        .select(questions::id)
        .load::<i64>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_do_not_block() {
        assert!(
            ensure_no_dependents("quiz", &[Dependency::Attempts(0), Dependency::Answers(0)])
                .is_ok()
        );
    }

    #[test]
    fn block_message_lists_every_dependency() {
        let err = ensure_no_dependents(
            "course 'Intro'",
            &[
                Dependency::Progress(1),
                Dependency::Certificates(0),
                Dependency::Attempts(4),
            ],
        )
        .unwrap_err();
        match err {
            AppError::IntegrityBlock(message) => {
                assert!(message.contains("1 progress record and 4 quiz attempts"));
                assert!(!message.contains("certificate"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
