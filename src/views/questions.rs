use super::layout::pagination_links;
use super::{
    checkbox_input, delete_button, empty_row, escape, number_input, select, status_badge,
    textarea, toggle_button,
};
use crate::model::Pagination;
use crate::model::assessment::{Question, QuestionListRow, QuestionOption, QuestionType};
use crate::payloads::assessment::{ListQuestionsParams, MAX_OPTION_ROWS};
use crate::store::options::{OPTION_ORDER_MAX, OPTION_TEXT_MAX};
use crate::store::questions::{ORDER_MAX, QUESTION_TEXT_MAX, TRUE_LABEL};

const OPTION_FORM: &str = "option-bulk";

fn quiz_options(quizzes: &[(i64, String, String)]) -> Vec<(String, String)> {
    quizzes
        .iter()
        .map(|(id, title, module)| (id.to_string(), format!("{} / {}", module, title)))
        .collect()
}

fn true_false_radios(answer: Option<bool>) -> String {
    let radio = |value: &str, label: &str, on: bool| {
        format!(
            r#"<label class="inline"><input type="radio" name="correct_answer" value="{value}"{checked}> {label}</label>"#,
            checked = if on { " checked" } else { "" },
        )
    };
    format!(
        "<fieldset><legend>Correct answer (true/false)</legend>{} {}</fieldset>",
        radio("true", "True", answer == Some(true)),
        radio("false", "False", answer == Some(false)),
    )
}

pub fn list(
    rows: &[QuestionListRow],
    pagination: &Pagination,
    quizzes: &[(i64, String, String)],
    params: &ListQuestionsParams,
) -> String {
    let quiz_filter = params.quiz_id.map(|id| id.to_string()).unwrap_or_default();
    let search = params.search.clone().unwrap_or_default();

    let mut table = String::new();
    for row in rows {
        let question = &row.question;
        let options_link = if question.kind() == QuestionType::ShortAnswer {
            String::new()
        } else {
            format!(r#"<a href="/questions/{}/options">Options</a>"#, question.id)
        };
        table.push_str(&format!(
            r#"<tr><td>{order}</td><td>{text}</td><td>{quiz}</td><td>{kind}</td><td>{points}</td>
<td>{options} ({correct} correct)</td><td>{answers}</td><td>{status}</td>
<td><a href="/questions/{id}/edit">Edit</a> {options_link} {toggle} {delete}</td></tr>"#,
            order = question.order_sequence,
            text = escape(&question.question_text),
            quiz = escape(&row.quiz_title),
            kind = question.kind().label(),
            points = question.points,
            options = row.option_count,
            correct = row.correct_count,
            answers = row.answer_count,
            status = status_badge(question.is_active),
            id = question.id,
            toggle = toggle_button(
                &format!("/questions/{}/toggle", question.id),
                question.is_active
            ),
            delete = delete_button(
                &format!("/questions/{}/delete", question.id),
                "this question and its options"
            ),
        ));
    }
    if rows.is_empty() {
        table = empty_row(9, "No questions found.");
    }

    let new_link = match params.quiz_id {
        Some(id) => format!("/questions/new?quiz_id={}", id),
        None => "/questions/new".to_string(),
    };
    format!(
        r#"<form method="get" action="/questions" class="filters">{quiz_select}
<input type="search" name="search" value="{search_value}" placeholder="Search question text"> <button type="submit">Filter</button></form>
<p><a href="{new_link}">Add a question</a></p>
<table><thead><tr><th>#</th><th>Question</th><th>Quiz</th><th>Type</th><th>Points</th><th>Options</th><th>Answers</th><th>Status</th><th></th></tr></thead>
<tbody>{table}</tbody></table>
{pages}"#,
        quiz_select = select("quiz_id", "Quiz", &quiz_options(quizzes), Some(&quiz_filter), Some("All quizzes")),
        search_value = escape(&search),
        new_link = escape(&new_link),
        pages = pagination_links(
            "/questions",
            &[("quiz_id", quiz_filter.clone()), ("search", search.clone())],
            pagination
        ),
    )
}

/// Authoring form for a question of any type, options included.
pub fn new_form(quizzes: &[(i64, String, String)], quiz_id: Option<i64>) -> String {
    let types: Vec<(String, String)> = QuestionType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), t.label().to_string()))
        .collect();
    let quiz_value = quiz_id.map(|id| id.to_string()).unwrap_or_default();

    let mut option_rows = String::new();
    for n in 1..=MAX_OPTION_ROWS {
        option_rows.push_str(&format!(
            r#"<div class="option-row"><input type="text" name="option_text_{n}" maxlength="{OPTION_TEXT_MAX}" placeholder="Option {n}">
<label class="inline"><input type="checkbox" name="option_correct_{n}" value="on"> Correct</label></div>"#
        ));
    }

    format!(
        r#"<form method="post" action="/questions" data-draft="new-question">{quiz}{text}{kind}{points}{order}
<fieldset><legend>Options (multiple choice)</legend>{option_rows}</fieldset>
{true_false}
<p>Short answer questions are stored without options.</p>
<button type="submit">Create question</button></form>"#,
        quiz = select("quiz_id", "Quiz", &quiz_options(quizzes), Some(&quiz_value), None),
        text = textarea("question_text", "Question", "", Some(QUESTION_TEXT_MAX)),
        kind = select("question_type", "Type", &types, Some("multiple_choice"), None),
        points = number_input("points", "Points", Some(1), 1, 100, true),
        order = number_input("order_sequence", "Order (blank for last)", None, 1, ORDER_MAX, false),
        true_false = true_false_radios(None),
    )
}

pub fn edit(question: &Question, options: &[QuestionOption]) -> String {
    let kind = question.kind();
    let extra = match kind {
        QuestionType::TrueFalse => {
            let answer = options
                .iter()
                .find(|o| o.is_correct)
                .map(|o| o.option_text == TRUE_LABEL);
            true_false_radios(answer)
        }
        QuestionType::MultipleChoice => format!(
            r#"<p><a href="/questions/{}/options">Edit the {} options</a></p>"#,
            question.id,
            options.len()
        ),
        QuestionType::ShortAnswer => String::new(),
    };
    format!(
        r#"<p>Type: {label} (fixed after creation)</p>
<form method="post" action="/questions/{id}" data-draft="question-{id}">{text}{points}{order}{active}{extra}
<button type="submit">Save changes</button></form>
<p><a href="/questions?quiz_id={quiz_id}">Back to questions</a></p>"#,
        label = kind.label(),
        id = question.id,
        quiz_id = question.quiz_id,
        text = textarea(
            "question_text",
            "Question",
            &question.question_text,
            Some(QUESTION_TEXT_MAX)
        ),
        points = number_input("points", "Points", Some(question.points), 1, 100, true),
        order = number_input(
            "order_sequence",
            "Order",
            Some(question.order_sequence),
            1,
            ORDER_MAX,
            true
        ),
        active = checkbox_input("is_active", "Active", question.is_active),
    )
}

/// Bulk editor for the options of one question.
pub fn options_editor(question: &Question, options: &[QuestionOption]) -> String {
    let kind = question.kind();
    let mut rows = String::new();
    for option in options {
        let correct = if kind == QuestionType::TrueFalse {
            format!(
                r#"<input type="radio" name="correct_option" value="{id}" form="{OPTION_FORM}"{checked}>"#,
                id = option.id,
                checked = if option.is_correct { " checked" } else { "" },
            )
        } else {
            format!(
                r#"<input type="checkbox" name="correct_{id}" value="on" form="{OPTION_FORM}"{checked}>"#,
                id = option.id,
                checked = if option.is_correct { " checked" } else { "" },
            )
        };
        let text = if kind == QuestionType::TrueFalse {
            format!(
                r#"{label}<input type="hidden" name="text_{id}" value="{label}" form="{OPTION_FORM}">"#,
                label = escape(&option.option_text),
                id = option.id,
            )
        } else {
            format!(
                r#"<input type="text" name="text_{id}" value="{value}" maxlength="{OPTION_TEXT_MAX}" form="{OPTION_FORM}">"#,
                id = option.id,
                value = escape(&option.option_text),
            )
        };
        let order = format!(
            r#"<input type="number" name="order_{id}" value="{order}" min="1" max="{OPTION_ORDER_MAX}" form="{OPTION_FORM}">"#,
            id = option.id,
            order = option.order_sequence,
        );
        let delete = if kind == QuestionType::MultipleChoice {
            delete_button(
                &format!("/options/{}/delete", option.id),
                &format!("option '{}'", option.option_text),
            )
        } else {
            String::new()
        };
        rows.push_str(&format!(
            "<tr><td>{order}</td><td>{text}</td><td>{correct}</td><td>{delete}</td></tr>"
        ));
    }
    if options.is_empty() {
        rows = empty_row(4, "This question has no options.");
    }

    let add_form = if kind == QuestionType::MultipleChoice {
        format!(
            r#"<h2>Add option</h2>
<form method="post" action="/questions/{id}/options"><input type="text" name="option_text" maxlength="{OPTION_TEXT_MAX}" required>
{correct}<button type="submit">Add option</button></form>"#,
            id = question.id,
            correct = checkbox_input("is_correct", "Correct", false),
        )
    } else {
        String::new()
    };

    format!(
        r#"<p>{text}</p><p>Type: {label}</p>
<form method="post" action="/questions/{id}/options/bulk" id="{OPTION_FORM}" data-confirm="Save every option?"></form>
<table><thead><tr><th>Order</th><th>Text</th><th>Correct</th><th></th></tr></thead><tbody>{rows}</tbody></table>
<button type="submit" form="{OPTION_FORM}">Save options</button>
{add_form}
<p><a href="/questions/{id}/edit">Back to the question</a></p>"#,
        text = escape(&question.question_text),
        label = kind.label(),
        id = question.id,
    )
}
