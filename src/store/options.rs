use super::guards::{ensure_no_dependents, option_dependencies};
use super::questions::{find_question, options_of, validate_option_set};
use super::{expect_single_row, in_range, required_text};
use crate::errors::AppError;
use crate::model::assessment::{NewQuestionOption, OptionDraft, QuestionOption, QuestionType};
use crate::payloads::assessment::{AddOptionForm, OptionEdit, parse_option_edits};
use crate::payloads::form::FormFields;
use crate::schema::question_options;
use diesel::dsl::max;
use diesel::prelude::*;
use tracing::{debug, info, warn};

pub const OPTION_TEXT_MAX: usize = 1000;
/// Highest position an option may take, for appended and edited rows alike.
pub const OPTION_ORDER_MAX: i32 = 99;

/// Appends an option to a multiple choice question.
pub fn add_option(
    conn: &mut PgConnection,
    question_id: i64,
    form: AddOptionForm,
) -> Result<i64, AppError> {
    let option_text = required_text(&form.option_text, "Option text", OPTION_TEXT_MAX)?;
    let question = find_question(conn, question_id)?;
    if question.kind() != QuestionType::MultipleChoice {
        return Err(AppError::Validation(format!(
            "Options can only be added to multiple choice questions, not {}.",
            question.kind().label().to_lowercase()
        )));
    }

    let current = question_options::table
        .filter(question_options::question_id.eq(question_id))
        .select(max(question_options::order_sequence))
        .first::<Option<i32>>(conn)?;
    let order_sequence = current.unwrap_or(0) + 1;
    if order_sequence > OPTION_ORDER_MAX {
        warn!(
            "Question {} has no option position left after {}",
            question_id, OPTION_ORDER_MAX
        );
        return Err(AppError::Validation(format!(
            "Options already reach position {}. Renumber them in the editor before adding another.",
            OPTION_ORDER_MAX
        )));
    }
    let new_option = NewQuestionOption {
        question_id,
        option_text,
        is_correct: form.is_correct,
        order_sequence,
    };
    let new_id = diesel::insert_into(question_options::table)
        .values(&new_option)
        .returning(question_options::id)
        .get_result::<i64>(conn)?;
    info!(
        "Added option {} to question {} at position {}",
        new_id, question_id, new_option.order_sequence
    );
    Ok(new_id)
}

/// Saves the option editor of one question.
///
/// Rows with blank text are left untouched. For true/false questions only the
/// correct flag is taken from the form. The resulting option set must still
/// be valid for the question type; otherwise an error is returned and the
/// caller's transaction rolls every row back.
pub fn bulk_update_options(
    conn: &mut PgConnection,
    question_id: i64,
    fields: &FormFields,
) -> Result<usize, AppError> {
    let question = find_question(conn, question_id)?;
    let kind = question.kind();
    let existing = options_of(conn, question_id)?;
    let ids: Vec<i64> = existing.iter().map(|o| o.id).collect();
    let edits = parse_option_edits(fields, &ids).map_err(AppError::Validation)?;

    let mut updated = 0;
    for (option, edit) in existing.iter().zip(edits.iter()) {
        if edit.text.is_empty() {
            debug!("Skipping option {} with blank text", option.id);
            continue;
        }
        let (text, order_sequence) = apply_edit(kind, option, edit)?;
        let affected = diesel::update(question_options::table.find(option.id))
            .set((
                question_options::option_text.eq(text),
                question_options::is_correct.eq(edit.is_correct),
                question_options::order_sequence.eq(order_sequence),
            ))
            .execute(conn)?;
        expect_single_row(affected, "Option", option.id)?;
        updated += affected;
    }

    let after: Vec<OptionDraft> = options_of(conn, question_id)?
        .into_iter()
        .map(|o| OptionDraft {
            text: o.option_text,
            is_correct: o.is_correct,
        })
        .collect();
    if let Err(err) = validate_option_set(kind, &after) {
        warn!(
            "Rejected option update of question {}: {}",
            question_id, err
        );
        return Err(err);
    }
    info!("Updated {} options of question {}", updated, question_id);
    Ok(updated)
}

/// Text and order an edit writes for `option`.
fn apply_edit(
    kind: QuestionType,
    option: &QuestionOption,
    edit: &OptionEdit,
) -> Result<(String, i32), AppError> {
    if kind == QuestionType::TrueFalse {
        return Ok((option.option_text.clone(), option.order_sequence));
    }
    let text = required_text(&edit.text, "Option text", OPTION_TEXT_MAX)?;
    let order_sequence = match edit.order_sequence {
        Some(order) => in_range(order, "Option order", 1, OPTION_ORDER_MAX)?,
        None => option.order_sequence,
    };
    Ok((text, order_sequence))
}

pub fn question_of_option(conn: &mut PgConnection, option_id: i64) -> QueryResult<Option<i64>> {
    question_options::table
        .find(option_id)
        .select(question_options::question_id)
        .first::<i64>(conn)
        .optional()
}

/// Deletes an option and returns its question id.
pub fn delete_option(conn: &mut PgConnection, option_id: i64) -> Result<i64, AppError> {
    let option = question_options::table
        .find(option_id)
        .select(QuestionOption::as_select())
        .first::<QuestionOption>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Option with ID {} not found.", option_id)))?;
    let dependencies = option_dependencies(conn, &[option_id])?;
    ensure_no_dependents(
        &format!("option '{}'", option.option_text),
        &dependencies,
    )?;

    let question = find_question(conn, option.question_id)?;
    let remaining: Vec<OptionDraft> = options_of(conn, option.question_id)?
        .into_iter()
        .filter(|o| o.id != option_id)
        .map(|o| OptionDraft {
            text: o.option_text,
            is_correct: o.is_correct,
        })
        .collect();
    validate_option_set(question.kind(), &remaining).map_err(|_| {
        AppError::Validation(match question.kind() {
            QuestionType::TrueFalse => {
                "True/false options cannot be deleted; change the correct answer instead."
                    .to_string()
            }
            _ => "Deleting this option would leave the question without two options and a correct answer."
                .to_string(),
        })
    })?;

    let affected = diesel::delete(question_options::table.find(option_id)).execute(conn)?;
    expect_single_row(affected, "Option", option_id)?;
    info!("Deleted option {} of question {}", option_id, option.question_id);
    Ok(option.question_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(text: &str, order: i32) -> QuestionOption {
        QuestionOption {
            id: 5,
            question_id: 2,
            option_text: text.to_string(),
            is_correct: false,
            order_sequence: order,
        }
    }

    fn edit(text: &str, order: Option<i32>) -> OptionEdit {
        OptionEdit {
            id: 5,
            text: text.to_string(),
            is_correct: true,
            order_sequence: order,
        }
    }

    #[test]
    fn true_false_edits_keep_text_and_order() {
        let (text, order) =
            apply_edit(QuestionType::TrueFalse, &stored("True", 1), &edit("Yes", Some(4))).unwrap();
        assert_eq!(text, "True");
        assert_eq!(order, 1);
    }

    #[test]
    fn multiple_choice_edits_overwrite_text_and_order() {
        let (text, order) = apply_edit(
            QuestionType::MultipleChoice,
            &stored("Iron", 2),
            &edit(" Zinc ", Some(3)),
        )
        .unwrap();
        assert_eq!(text, "Zinc");
        assert_eq!(order, 3);

        let (_, kept) = apply_edit(
            QuestionType::MultipleChoice,
            &stored("Iron", 2),
            &edit("Zinc", None),
        )
        .unwrap();
        assert_eq!(kept, 2);
    }
}
