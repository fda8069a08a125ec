use super::guards::{ensure_no_dependents, quiz_dependencies};
use super::{cascade, expect_single_row, in_range, required_text};
use crate::errors::AppError;
use crate::model::Pagination;
use crate::model::assessment::{NewQuiz, Quiz, QuizChangeset, QuizListRow, QuizType};
use crate::payloads::assessment::QuizForm;
use crate::payloads::{BulkAction, BulkRequest};
use crate::schema::{courses, modules, questions, quiz_attempts, quizzes};
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::dsl::{avg, count_star, exists, not};
use diesel::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

pub const TIME_LIMIT_MAX: i32 = 600;

#[derive(Debug, Default)]
pub struct QuizFilter {
    pub module_id: Option<i64>,
    pub course_id: Option<i64>,
    pub quiz_type: Option<QuizType>,
}

pub fn list_quizzes(
    conn: &mut PgConnection,
    filter: QuizFilter,
    page: Option<i64>,
    per_page: i64,
) -> QueryResult<(Vec<QuizListRow>, Pagination)> {
    let mut count_query = quizzes::table
        .inner_join(modules::table.inner_join(courses::table))
        .into_boxed();
    let mut rows_query = quizzes::table
        .inner_join(modules::table.inner_join(courses::table))
        .into_boxed();
    if let Some(module_id) = filter.module_id {
        count_query = count_query.filter(quizzes::module_id.eq(module_id));
        rows_query = rows_query.filter(quizzes::module_id.eq(module_id));
    }
    if let Some(course_id) = filter.course_id {
        count_query = count_query.filter(courses::id.eq(course_id));
        rows_query = rows_query.filter(courses::id.eq(course_id));
    }
    if let Some(kind) = filter.quiz_type {
        count_query = count_query.filter(quizzes::quiz_type.eq(kind.as_str()));
        rows_query = rows_query.filter(quizzes::quiz_type.eq(kind.as_str()));
    }

    let total = count_query.count().get_result::<i64>(conn)?;
    let pagination = Pagination::new(page, per_page, total);

    let page_rows = rows_query
        .order((
            courses::title.asc(),
            modules::order_sequence.asc(),
            quizzes::title.asc(),
        ))
        .limit(pagination.per_page)
        .offset(pagination.offset())
        .select((Quiz::as_select(), modules::title, courses::id, courses::title))
        .load::<(Quiz, String, i64, String)>(conn)?;
    let ids: Vec<i64> = page_rows.iter().map(|(quiz, ..)| quiz.id).collect();

    let question_counts: HashMap<i64, i64> = questions::table
        .filter(questions::quiz_id.eq_any(&ids))
        .group_by(questions::quiz_id)
        .select((questions::quiz_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();
    let attempt_stats: HashMap<i64, (i64, Option<BigDecimal>)> = quiz_attempts::table
        .filter(quiz_attempts::quiz_id.eq_any(&ids))
        .group_by(quiz_attempts::quiz_id)
        .select((
            quiz_attempts::quiz_id,
            count_star(),
            avg(quiz_attempts::score),
        ))
        .load::<(i64, i64, Option<BigDecimal>)>(conn)?
        .into_iter()
        .map(|(quiz_id, attempts, average)| (quiz_id, (attempts, average)))
        .collect();

    let rows = page_rows
        .into_iter()
        .map(|(quiz, module_title, course_id, course_title)| {
            let (attempt_count, average_score) =
                attempt_stats.get(&quiz.id).cloned().unwrap_or((0, None));
            QuizListRow {
                question_count: question_counts.get(&quiz.id).copied().unwrap_or(0),
                attempt_count,
                average_score,
                module_title,
                course_id,
                course_title,
                quiz,
            }
        })
        .collect();
    Ok((rows, pagination))
}

/// `(id, quiz title, module title)` of every quiz, for select boxes.
pub fn quiz_choices(conn: &mut PgConnection) -> QueryResult<Vec<(i64, String, String)>> {
    quizzes::table
        .inner_join(modules::table)
        .order((modules::title.asc(), quizzes::title.asc()))
        .select((quizzes::id, quizzes::title, modules::title))
        .load(conn)
}

pub fn find_quiz(conn: &mut PgConnection, quiz_id: i64) -> Result<Quiz, AppError> {
    quizzes::table
        .find(quiz_id)
        .select(Quiz::as_select())
        .first::<Quiz>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {} not found.", quiz_id)))
}

/// Validated column values of a quiz form.
struct QuizValues {
    title: String,
    quiz_type: QuizType,
    pass_threshold: i32,
    time_limit_minutes: Option<i32>,
}

fn validate_form(form: &QuizForm) -> Result<QuizValues, AppError> {
    let title = required_text(&form.title, "Title", 255)?;
    let quiz_type = form
        .quiz_type
        .parse::<QuizType>()
        .map_err(AppError::Validation)?;
    let pass_threshold = in_range(form.pass_threshold, "Pass threshold", 1, 100)?;
    let time_limit_minutes = form
        .time_limit_minutes
        .map(|minutes| in_range(minutes, "Time limit", 1, TIME_LIMIT_MAX))
        .transpose()?;
    Ok(QuizValues {
        title,
        quiz_type,
        pass_threshold,
        time_limit_minutes,
    })
}

/// The module must be active and belong to an active course.
fn ensure_module_open(conn: &mut PgConnection, module_id: i64) -> Result<(), AppError> {
    let (module_active, course_active) = modules::table
        .inner_join(courses::table)
        .filter(modules::id.eq(module_id))
        .select((modules::is_active, courses::is_active))
        .first::<(bool, bool)>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Module with ID {} not found.", module_id)))?;
    if !module_active {
        return Err(AppError::Validation(
            "Quizzes can only be added to an active module.".to_string(),
        ));
    }
    if !course_active {
        return Err(AppError::Validation(
            "The module belongs to an inactive course.".to_string(),
        ));
    }
    Ok(())
}

fn ensure_single_final(
    conn: &mut PgConnection,
    module_id: i64,
    except_id: Option<i64>,
) -> Result<(), AppError> {
    let mut query = quizzes::table
        .filter(quizzes::module_id.eq(module_id))
        .filter(quizzes::quiz_type.eq(QuizType::Final.as_str()))
        .into_boxed();
    if let Some(id) = except_id {
        query = query.filter(quizzes::id.ne(id));
    }
    if diesel::select(exists(query)).get_result::<bool>(conn)? {
        warn!("Module {} already has a final quiz", module_id);
        return Err(AppError::Validation(
            "This module already has a final quiz.".to_string(),
        ));
    }
    Ok(())
}

pub fn create_quiz(conn: &mut PgConnection, form: QuizForm) -> Result<i64, AppError> {
    let values = validate_form(&form)?;
    ensure_module_open(conn, form.module_id)?;
    if values.quiz_type == QuizType::Final {
        ensure_single_final(conn, form.module_id, None)?;
    }

    let new_quiz = NewQuiz {
        module_id: form.module_id,
        title: values.title,
        description: form.description.trim().to_string(),
        quiz_type: values.quiz_type.to_string(),
        pass_threshold: values.pass_threshold,
        time_limit_minutes: values.time_limit_minutes,
        is_active: form.is_active,
    };
    let new_id = diesel::insert_into(quizzes::table)
        .values(&new_quiz)
        .returning(quizzes::id)
        .get_result::<i64>(conn)?;
    info!(
        "Inserted {} quiz '{}' with ID {} into module {}",
        new_quiz.quiz_type, new_quiz.title, new_id, new_quiz.module_id
    );
    Ok(new_id)
}

pub fn update_quiz(conn: &mut PgConnection, quiz_id: i64, form: QuizForm) -> Result<(), AppError> {
    let values = validate_form(&form)?;
    let quiz = find_quiz(conn, quiz_id)?;

    if form.module_id != quiz.module_id {
        let attempts = quiz_attempts::table
            .filter(quiz_attempts::quiz_id.eq(quiz_id))
            .count()
            .get_result::<i64>(conn)?;
        if attempts > 0 {
            return Err(AppError::Validation(format!(
                "Quiz '{}' has {} attempts and cannot be moved to another module.",
                quiz.title, attempts
            )));
        }
    }
    ensure_module_open(conn, form.module_id)?;
    if values.quiz_type == QuizType::Final {
        ensure_single_final(conn, form.module_id, Some(quiz_id))?;
    }

    let changes = QuizChangeset {
        module_id: form.module_id,
        title: values.title,
        description: form.description.trim().to_string(),
        quiz_type: values.quiz_type.to_string(),
        pass_threshold: values.pass_threshold,
        time_limit_minutes: values.time_limit_minutes,
        is_active: form.is_active,
        updated_at: Utc::now(),
    };
    let affected = diesel::update(quizzes::table.find(quiz_id))
        .set(&changes)
        .execute(conn)?;
    expect_single_row(affected, "Quiz", quiz_id)
}

pub fn toggle_quiz(conn: &mut PgConnection, quiz_id: i64) -> Result<bool, AppError> {
    diesel::update(quizzes::table.find(quiz_id))
        .set(quizzes::is_active.eq(not(quizzes::is_active)))
        .returning(quizzes::is_active)
        .get_result::<bool>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {} not found.", quiz_id)))
}

/// Removes a quiz with its questions and options, unless it has attempts.
pub fn delete_quiz_cascade(conn: &mut PgConnection, quiz_id: i64) -> Result<String, AppError> {
    let quiz = find_quiz(conn, quiz_id)?;
    let dependencies = quiz_dependencies(conn, &[quiz_id])?;
    ensure_no_dependents(&format!("quiz '{}'", quiz.title), &dependencies)?;

    let deleted = cascade::delete_quizzes(conn, &[quiz_id])?;
    expect_single_row(deleted, "Quiz", quiz_id)?;
    Ok(quiz.title)
}

pub fn bulk_quizzes(conn: &mut PgConnection, request: &BulkRequest) -> Result<usize, AppError> {
    let found = quizzes::table
        .filter(quizzes::id.eq_any(&request.ids))
        .count()
        .get_result::<i64>(conn)?;
    if found != request.ids.len() as i64 {
        return Err(AppError::NotFound(format!(
            "{} of the selected quizzes no longer exist.",
            request.ids.len() as i64 - found
        )));
    }

    let targets = quizzes::table.filter(quizzes::id.eq_any(&request.ids));
    let affected = match request.action {
        BulkAction::Activate => diesel::update(targets)
            .set(quizzes::is_active.eq(true))
            .execute(conn)?,
        BulkAction::Deactivate => diesel::update(targets)
            .set(quizzes::is_active.eq(false))
            .execute(conn)?,
        BulkAction::Delete => {
            let dependencies = quiz_dependencies(conn, &request.ids)?;
            ensure_no_dependents("the selected quizzes", &dependencies)?;
            cascade::delete_quizzes(conn, &request.ids)?
        }
    };
    info!("Bulk {:?} applied to {} quizzes", request.action, affected);
    Ok(affected)
}
