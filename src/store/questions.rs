use super::guards::{ensure_no_dependents, question_dependencies};
use super::{cascade, expect_single_row, in_range, like_pattern, required_text};
use crate::errors::AppError;
use crate::model::Pagination;
use crate::model::assessment::{
    NewQuestion, NewQuestionOption, OptionDraft, Question, QuestionChangeset, QuestionDraft,
    QuestionListRow, QuestionOption, QuestionType,
};
use crate::payloads::assessment::UpdateQuestionForm;
use crate::schema::{question_options, questions, quizzes, user_answers};
use chrono::Utc;
use diesel::dsl::{count_star, exists, max, not};
use diesel::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

pub const QUESTION_TEXT_MAX: usize = 5000;
pub const ORDER_MAX: i32 = 999;
pub const TRUE_LABEL: &str = "True";
pub const FALSE_LABEL: &str = "False";

#[derive(Debug, Default)]
pub struct QuestionFilter {
    pub quiz_id: Option<i64>,
    pub search: Option<String>,
}

pub fn list_questions(
    conn: &mut PgConnection,
    filter: QuestionFilter,
    page: Option<i64>,
    per_page: i64,
) -> QueryResult<(Vec<QuestionListRow>, Pagination)> {
    let mut count_query = questions::table.inner_join(quizzes::table).into_boxed();
    let mut rows_query = questions::table.inner_join(quizzes::table).into_boxed();
    if let Some(quiz_id) = filter.quiz_id {
        count_query = count_query.filter(questions::quiz_id.eq(quiz_id));
        rows_query = rows_query.filter(questions::quiz_id.eq(quiz_id));
    }
    if let Some(term) = filter.search {
        let pattern = like_pattern(&term);
        count_query = count_query.filter(questions::question_text.ilike(pattern.clone()));
        rows_query = rows_query.filter(questions::question_text.ilike(pattern));
    }

    let total = count_query.count().get_result::<i64>(conn)?;
    let pagination = Pagination::new(page, per_page, total);

    let page_rows = rows_query
        .order((quizzes::title.asc(), questions::order_sequence.asc()))
        .limit(pagination.per_page)
        .offset(pagination.offset())
        .select((Question::as_select(), quizzes::title))
        .load::<(Question, String)>(conn)?;
    let ids: Vec<i64> = page_rows.iter().map(|(q, _)| q.id).collect();

    let option_counts: HashMap<i64, i64> = question_options::table
        .filter(question_options::question_id.eq_any(&ids))
        .group_by(question_options::question_id)
        .select((question_options::question_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();
    let correct_counts: HashMap<i64, i64> = question_options::table
        .filter(question_options::question_id.eq_any(&ids))
        .filter(question_options::is_correct.eq(true))
        .group_by(question_options::question_id)
        .select((question_options::question_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();
    let answer_counts: HashMap<i64, i64> = user_answers::table
        .filter(user_answers::question_id.eq_any(&ids))
        .group_by(user_answers::question_id)
        .select((user_answers::question_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();

    let rows = page_rows
        .into_iter()
        .map(|(question, quiz_title)| QuestionListRow {
            option_count: option_counts.get(&question.id).copied().unwrap_or(0),
            correct_count: correct_counts.get(&question.id).copied().unwrap_or(0),
            answer_count: answer_counts.get(&question.id).copied().unwrap_or(0),
            quiz_title,
            question,
        })
        .collect();
    Ok((rows, pagination))
}

pub fn find_question(conn: &mut PgConnection, question_id: i64) -> Result<Question, AppError> {
    questions::table
        .find(question_id)
        .select(Question::as_select())
        .first::<Question>(conn)
        .optional()?
        .ok_or_else(|| {
            AppError::NotFound(format!("Question with ID {} not found.", question_id))
        })
}

pub fn options_of(conn: &mut PgConnection, question_id: i64) -> QueryResult<Vec<QuestionOption>> {
    question_options::table
        .filter(question_options::question_id.eq(question_id))
        .order((question_options::order_sequence.asc(), question_options::id.asc()))
        .select(QuestionOption::as_select())
        .load::<QuestionOption>(conn)
}

/// Checks that `options` form a valid answer set for a question of `kind`.
pub fn validate_option_set(kind: QuestionType, options: &[OptionDraft]) -> Result<(), AppError> {
    let correct = options.iter().filter(|o| o.is_correct).count();
    match kind {
        QuestionType::MultipleChoice => {
            if options.iter().any(|o| o.text.trim().is_empty()) {
                return Err(AppError::Validation(
                    "Option text cannot be empty.".to_string(),
                ));
            }
            if options.len() < 2 {
                return Err(AppError::Validation(
                    "A multiple choice question needs at least two options.".to_string(),
                ));
            }
            if correct == 0 {
                return Err(AppError::Validation(
                    "Mark at least one option as correct.".to_string(),
                ));
            }
        }
        QuestionType::TrueFalse => {
            let mut texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
            texts.sort_unstable();
            if texts != [FALSE_LABEL, TRUE_LABEL] || correct != 1 {
                return Err(AppError::Validation(
                    "A true/false question needs exactly one correct answer.".to_string(),
                ));
            }
        }
        QuestionType::ShortAnswer => {
            if !options.is_empty() {
                return Err(AppError::Validation(
                    "Short answer questions have no options.".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Options a true/false question stores for the selected answer.
pub fn true_false_options(answer: bool) -> Vec<OptionDraft> {
    vec![
        OptionDraft {
            text: TRUE_LABEL.to_string(),
            is_correct: answer,
        },
        OptionDraft {
            text: FALSE_LABEL.to_string(),
            is_correct: !answer,
        },
    ]
}

/// Normalizes a submitted draft into question text and its final option set.
fn prepare_draft(draft: &QuestionDraft) -> Result<(String, Vec<OptionDraft>), AppError> {
    let text = required_text(&draft.question_text, "Question text", QUESTION_TEXT_MAX)?;
    in_range(draft.points, "Points", 1, 100)?;
    if let Some(order) = draft.order_sequence {
        in_range(order, "Order sequence", 1, ORDER_MAX)?;
    }

    let options = match draft.question_type {
        QuestionType::MultipleChoice => draft.options.clone(),
        QuestionType::TrueFalse => {
            let answer = draft.true_false_answer.ok_or_else(|| {
                AppError::Validation("Select whether the statement is true or false.".to_string())
            })?;
            true_false_options(answer)
        }
        QuestionType::ShortAnswer => Vec::new(),
    };
    validate_option_set(draft.question_type, &options)?;
    Ok((text, options))
}

fn next_question_order(conn: &mut PgConnection, quiz_id: i64) -> QueryResult<i32> {
    let current = questions::table
        .filter(questions::quiz_id.eq(quiz_id))
        .select(max(questions::order_sequence))
        .first::<Option<i32>>(conn)?;
    Ok(current.unwrap_or(0) + 1)
}

/// Inserts a question and its options. Nothing is written when the draft is invalid.
pub fn create_question_with_options(
    conn: &mut PgConnection,
    draft: QuestionDraft,
) -> Result<i64, AppError> {
    let (question_text, options) = prepare_draft(&draft)?;
    let quiz_exists =
        diesel::select(exists(quizzes::table.find(draft.quiz_id))).get_result::<bool>(conn)?;
    if !quiz_exists {
        return Err(AppError::NotFound(format!(
            "Quiz with ID {} not found.",
            draft.quiz_id
        )));
    }
    let order_sequence = match draft.order_sequence {
        Some(order) => order,
        None => in_range(
            next_question_order(conn, draft.quiz_id)?,
            "Order sequence",
            1,
            ORDER_MAX,
        )?,
    };

    let new_question = NewQuestion {
        quiz_id: draft.quiz_id,
        question_text,
        question_type: draft.question_type.to_string(),
        points: draft.points,
        order_sequence,
        is_active: true,
    };
    let question_id = diesel::insert_into(questions::table)
        .values(&new_question)
        .returning(questions::id)
        .get_result::<i64>(conn)?;

    let new_options: Vec<NewQuestionOption> = options
        .into_iter()
        .enumerate()
        .map(|(index, option)| NewQuestionOption {
            question_id,
            option_text: option.text.trim().to_string(),
            is_correct: option.is_correct,
            order_sequence: index as i32 + 1,
        })
        .collect();
    if !new_options.is_empty() {
        diesel::insert_into(question_options::table)
            .values(&new_options)
            .execute(conn)?;
    }
    info!(
        "Inserted {} question {} into quiz {} with {} options",
        new_question.question_type,
        question_id,
        new_question.quiz_id,
        new_options.len()
    );
    Ok(question_id)
}

/// Updates text, points, order and status. The question type never changes.
pub fn update_question(
    conn: &mut PgConnection,
    question_id: i64,
    form: UpdateQuestionForm,
) -> Result<(), AppError> {
    let question_text = required_text(&form.question_text, "Question text", QUESTION_TEXT_MAX)?;
    let points = in_range(form.points, "Points", 1, 100)?;
    let order_sequence = in_range(form.order_sequence, "Order sequence", 1, ORDER_MAX)?;
    let question = find_question(conn, question_id)?;

    let changes = QuestionChangeset {
        question_text,
        points,
        order_sequence,
        is_active: form.is_active,
        updated_at: Utc::now(),
    };
    let affected = diesel::update(questions::table.find(question_id))
        .set(&changes)
        .execute(conn)?;
    expect_single_row(affected, "Question", question_id)?;

    if question.kind() == QuestionType::TrueFalse {
        let answer = match form.correct_answer.as_deref().map(str::trim) {
            Some("true") => true,
            Some("false") => false,
            _ => {
                return Err(AppError::Validation(
                    "Select whether the statement is true or false.".to_string(),
                ));
            }
        };
        let correct_label = if answer { TRUE_LABEL } else { FALSE_LABEL };
        let updated = diesel::update(
            question_options::table.filter(question_options::question_id.eq(question_id)),
        )
        .set(question_options::is_correct.eq(question_options::option_text.eq(correct_label)))
        .execute(conn)?;
        debug!(
            "Reset correct answer of true/false question {} on {} options",
            question_id, updated
        );
    }
    Ok(())
}

pub fn toggle_question(conn: &mut PgConnection, question_id: i64) -> Result<bool, AppError> {
    diesel::update(questions::table.find(question_id))
        .set(questions::is_active.eq(not(questions::is_active)))
        .returning(questions::is_active)
        .get_result::<bool>(conn)
        .optional()?
        .ok_or_else(|| {
            AppError::NotFound(format!("Question with ID {} not found.", question_id))
        })
}

/// Deletes the options and then the question, unless students answered it.
pub fn delete_question(conn: &mut PgConnection, question_id: i64) -> Result<i64, AppError> {
    let question = find_question(conn, question_id)?;
    let dependencies = question_dependencies(conn, &[question_id])?;
    ensure_no_dependents("this question", &dependencies)?;

    let deleted = cascade::delete_questions(conn, &[question_id])?;
    expect_single_row(deleted, "Question", question_id)?;
    Ok(question.quiz_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, is_correct: bool) -> OptionDraft {
        OptionDraft {
            text: text.to_string(),
            is_correct,
        }
    }

    fn draft(kind: QuestionType, options: Vec<OptionDraft>, answer: Option<bool>) -> QuestionDraft {
        QuestionDraft {
            quiz_id: 1,
            question_text: "Which of these are macronutrients?".to_string(),
            question_type: kind,
            points: 2,
            order_sequence: None,
            options,
            true_false_answer: answer,
        }
    }

    #[test]
    fn multiple_choice_needs_two_options_and_a_correct_one() {
        let one = draft(QuestionType::MultipleChoice, vec![option("Protein", true)], None);
        assert!(prepare_draft(&one).is_err());

        let none_correct = draft(
            QuestionType::MultipleChoice,
            vec![option("Protein", false), option("Iron", false)],
            None,
        );
        assert!(matches!(
            prepare_draft(&none_correct),
            Err(AppError::Validation(_))
        ));

        let valid = draft(
            QuestionType::MultipleChoice,
            vec![option("Protein", true), option("Iron", false)],
            None,
        );
        let (_, options) = prepare_draft(&valid).unwrap();
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn true_false_synthesizes_both_options() {
        let (_, options) =
            prepare_draft(&draft(QuestionType::TrueFalse, Vec::new(), Some(false))).unwrap();
        assert_eq!(options, vec![option("True", false), option("False", true)]);

        assert!(prepare_draft(&draft(QuestionType::TrueFalse, Vec::new(), None)).is_err());
    }

    #[test]
    fn short_answer_drops_submitted_options() {
        let submitted = draft(
            QuestionType::ShortAnswer,
            vec![option("leftover", true)],
            None,
        );
        let (_, options) = prepare_draft(&submitted).unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn points_and_order_are_bounded() {
        let mut invalid = draft(QuestionType::ShortAnswer, Vec::new(), None);
        invalid.points = 0;
        assert!(prepare_draft(&invalid).is_err());

        let mut invalid = draft(QuestionType::ShortAnswer, Vec::new(), None);
        invalid.order_sequence = Some(1000);
        assert!(prepare_draft(&invalid).is_err());
    }

    #[test]
    fn true_false_set_must_be_exact() {
        assert!(
            validate_option_set(
                QuestionType::TrueFalse,
                &[option("True", true), option("False", true)]
            )
            .is_err()
        );
        assert!(
            validate_option_set(
                QuestionType::TrueFalse,
                &[option("Yes", true), option("False", false)]
            )
            .is_err()
        );
        assert!(
            validate_option_set(
                QuestionType::TrueFalse,
                &[option("False", false), option("True", true)]
            )
            .is_ok()
        );
    }
}
