use super::form::{FormFields, checkbox, empty_as_none};
use crate::model::assessment::{OptionDraft, QuestionDraft, QuestionType};
use serde::Deserialize;

/// Highest number of option rows the question form renders.
pub const MAX_OPTION_ROWS: usize = 8;

#[derive(Deserialize, Debug, Default)]
pub struct ListQuizzesParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub module_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub course_id: Option<i64>,
    pub quiz_type: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct QuizForm {
    pub module_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub quiz_type: String,
    pub pass_threshold: i32,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub time_limit_minutes: Option<i32>,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListQuestionsParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub quiz_id: Option<i64>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct NewQuestionParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub quiz_id: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuestionForm {
    pub question_text: String,
    pub points: i32,
    pub order_sequence: i32,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,
    /// "true" or "false"; only read for true/false questions.
    pub correct_answer: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AddOptionForm {
    pub option_text: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_correct: bool,
}

/// Parses the question authoring form.
///
/// Option rows are submitted as `option_text_N` / `option_correct_N` for
/// `N` in `1..=MAX_OPTION_ROWS`; a true/false question submits a single
/// `correct_answer` of `true` or `false`.
pub fn parse_question_form(fields: &FormFields) -> Result<QuestionDraft, String> {
    let quiz_id = fields
        .number::<i64>("quiz_id")?
        .ok_or_else(|| "Select a quiz.".to_string())?;
    let question_type: QuestionType = fields.text("question_type").parse()?;
    let points = fields
        .number::<i32>("points")?
        .ok_or_else(|| "Points are required.".to_string())?;
    let order_sequence = fields.number::<i32>("order_sequence")?;

    let mut options = Vec::new();
    if question_type == QuestionType::MultipleChoice {
        for n in 1..=MAX_OPTION_ROWS {
            let text = fields.text(&format!("option_text_{}", n));
            if text.is_empty() {
                continue;
            }
            options.push(OptionDraft {
                text,
                is_correct: fields.checked(&format!("option_correct_{}", n)),
            });
        }
    }

    let true_false_answer = match fields.get("correct_answer") {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };

    Ok(QuestionDraft {
        quiz_id,
        question_text: fields.text("question_text"),
        question_type,
        points,
        order_sequence,
        options,
        true_false_answer,
    })
}

/// One row of the option bulk editor, keyed by option id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEdit {
    pub id: i64,
    pub text: String,
    pub is_correct: bool,
    pub order_sequence: Option<i32>,
}

/// Reads `text_{id}`, `correct_{id}` and `order_{id}` for every listed option.
/// A radio group named `correct_option` may select the correct option instead.
pub fn parse_option_edits(fields: &FormFields, option_ids: &[i64]) -> Result<Vec<OptionEdit>, String> {
    let radio_choice = fields.number::<i64>("correct_option")?;

    option_ids
        .iter()
        .map(|&id| {
            Ok(OptionEdit {
                id,
                text: fields.text(&format!("text_{}", id)),
                is_correct: fields.checked(&format!("correct_{}", id)) || radio_choice == Some(id),
                order_sequence: fields.number::<i32>(&format!("order_{}", id))?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn multiple_choice_form_skips_blank_rows() {
        let form = fields(&[
            ("quiz_id", "4"),
            ("question_text", "Which vitamin is fat soluble?"),
            ("question_type", "multiple_choice"),
            ("points", "5"),
            ("order_sequence", ""),
            ("option_text_1", "Vitamin C"),
            ("option_text_2", "  "),
            ("option_text_3", "Vitamin D"),
            ("option_correct_3", "on"),
        ]);
        let draft = parse_question_form(&form).unwrap();
        assert_eq!(draft.quiz_id, 4);
        assert_eq!(draft.order_sequence, None);
        assert_eq!(
            draft.options,
            vec![
                OptionDraft {
                    text: "Vitamin C".into(),
                    is_correct: false
                },
                OptionDraft {
                    text: "Vitamin D".into(),
                    is_correct: true
                },
            ]
        );
    }

    #[test]
    fn true_false_form_reads_single_answer() {
        let form = fields(&[
            ("quiz_id", "1"),
            ("question_text", "Water boils at 100C at sea level."),
            ("question_type", "true_false"),
            ("points", "1"),
            ("correct_answer", "true"),
            ("option_text_1", "ignored"),
        ]);
        let draft = parse_question_form(&form).unwrap();
        assert_eq!(draft.question_type, QuestionType::TrueFalse);
        assert_eq!(draft.true_false_answer, Some(true));
        assert!(draft.options.is_empty());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let form = fields(&[("quiz_id", "1"), ("question_type", "essay"), ("points", "1")]);
        assert!(parse_question_form(&form).is_err());
    }

    #[test]
    fn option_edits_accept_radio_or_checkbox() {
        let form = fields(&[
            ("text_10", "True"),
            ("text_11", "False"),
            ("correct_option", "11"),
            ("order_10", "1"),
        ]);
        let edits = parse_option_edits(&form, &[10, 11]).unwrap();
        assert!(!edits[0].is_correct);
        assert!(edits[1].is_correct);
        assert_eq!(edits[0].order_sequence, Some(1));
        assert_eq!(edits[1].order_sequence, None);
    }
}
