use super::layout::pagination_links;
use super::{
    bulk_checkbox, bulk_form, checkbox_input, delete_button, empty_row, escape, number_input,
    select, status_badge, text_input, textarea, toggle_button,
};
use crate::model::Pagination;
use crate::model::assessment::{Quiz, QuizListRow, QuizType};
use crate::model::catalog::ModuleChoice;
use crate::payloads::assessment::ListQuizzesParams;
use crate::store::quizzes::TIME_LIMIT_MAX;

const BULK_FORM: &str = "quiz-bulk";

fn type_options() -> Vec<(String, String)> {
    QuizType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), t.label().to_string()))
        .collect()
}

fn module_options(modules: &[ModuleChoice]) -> Vec<(String, String)> {
    modules
        .iter()
        .map(|m| {
            let suffix = if m.is_active { "" } else { " (inactive)" };
            (
                m.id.to_string(),
                format!("{} / {}{}", m.course_title, m.title, suffix),
            )
        })
        .collect()
}

fn quiz_fields(quiz: Option<&Quiz>, modules: &[ModuleChoice], module_id: Option<i64>) -> String {
    let module_value = quiz
        .map(|q| q.module_id)
        .or(module_id)
        .map(|id| id.to_string())
        .unwrap_or_default();
    format!(
        "{}{}{}{}{}{}{}",
        select(
            "module_id",
            "Module",
            &module_options(modules),
            Some(&module_value),
            None
        ),
        text_input(
            "title",
            "Title",
            quiz.map(|q| q.title.as_str()).unwrap_or_default(),
            255
        ),
        textarea(
            "description",
            "Description",
            quiz.map(|q| q.description.as_str()).unwrap_or_default(),
            Some(2000)
        ),
        select(
            "quiz_type",
            "Type",
            &type_options(),
            Some(quiz.map(|q| q.quiz_type.as_str()).unwrap_or("module")),
            None
        ),
        number_input(
            "pass_threshold",
            "Pass threshold (%)",
            Some(quiz.map(|q| q.pass_threshold).unwrap_or(70)),
            1,
            100,
            true
        ),
        number_input(
            "time_limit_minutes",
            "Time limit (minutes, blank for none)",
            quiz.and_then(|q| q.time_limit_minutes),
            1,
            TIME_LIMIT_MAX,
            false
        ),
        checkbox_input("is_active", "Active", quiz.is_none_or(|q| q.is_active)),
    )
}

pub fn list(
    rows: &[QuizListRow],
    pagination: &Pagination,
    modules: &[ModuleChoice],
    courses: &[(i64, String, bool)],
    params: &ListQuizzesParams,
) -> String {
    let course_options: Vec<(String, String)> = courses
        .iter()
        .map(|(id, title, _)| (id.to_string(), title.clone()))
        .collect();
    let module_filter = params.module_id.map(|id| id.to_string()).unwrap_or_default();
    let course_filter = params.course_id.map(|id| id.to_string()).unwrap_or_default();
    let type_filter = params.quiz_type.clone().unwrap_or_default();

    let mut table = String::new();
    for row in rows {
        let quiz = &row.quiz;
        let kind = quiz
            .quiz_type
            .parse::<QuizType>()
            .map(|t| t.label())
            .unwrap_or("Unknown");
        table.push_str(&format!(
            r#"<tr><td>{check}</td><td>{title}</td><td>{course} / {module}</td><td>{kind}</td><td>{threshold}%</td>
<td>{questions}</td><td>{attempts}</td><td>{average}</td><td>{status}</td>
<td><a href="/quizzes/{id}/edit">Edit</a> <a href="/questions?quiz_id={id}">Questions</a> {toggle} {delete}</td></tr>"#,
            check = bulk_checkbox(BULK_FORM, quiz.id),
            title = escape(&quiz.title),
            course = escape(&row.course_title),
            module = escape(&row.module_title),
            threshold = quiz.pass_threshold,
            questions = row.question_count,
            attempts = row.attempt_count,
            average = row
                .average_score
                .as_ref()
                .map(|avg| format!("{}%", avg.with_scale(1)))
                .unwrap_or_else(|| "-".to_string()),
            status = status_badge(quiz.is_active),
            id = quiz.id,
            toggle = toggle_button(&format!("/quizzes/{}/toggle", quiz.id), quiz.is_active),
            delete = delete_button(
                &format!("/quizzes/{}/delete", quiz.id),
                &format!("quiz '{}' with all its questions", quiz.title)
            ),
        ));
    }
    if rows.is_empty() {
        table = empty_row(10, "No quizzes found.");
    }

    format!(
        r#"<form method="get" action="/quizzes" class="filters">{course_select}{module_select}{type_select}
<button type="submit">Filter</button></form>
{bulk}
<table><thead><tr><th></th><th>Title</th><th>Module</th><th>Type</th><th>Pass</th><th>Questions</th><th>Attempts</th><th>Average</th><th>Status</th><th></th></tr></thead>
<tbody>{table}</tbody></table>
{pages}
<h2>New quiz</h2>
<form method="post" action="/quizzes" data-draft="new-quiz">{fields}<button type="submit">Create quiz</button></form>"#,
        course_select = select("course_id", "Course", &course_options, Some(&course_filter), Some("All courses")),
        module_select = select("module_id", "Module", &module_options(modules), Some(&module_filter), Some("All modules")),
        type_select = select("quiz_type", "Type", &type_options(), Some(&type_filter), Some("All types")),
        bulk = bulk_form("/quizzes/bulk", BULK_FORM, true),
        pages = pagination_links(
            "/quizzes",
            &[
                ("course_id", course_filter.clone()),
                ("module_id", module_filter.clone()),
                ("quiz_type", type_filter.clone()),
            ],
            pagination
        ),
        fields = quiz_fields(None, modules, params.module_id),
    )
}

pub fn edit(quiz: &Quiz, modules: &[ModuleChoice]) -> String {
    format!(
        r#"<form method="post" action="/quizzes/{id}" data-draft="quiz-{id}">{fields}<button type="submit">Save changes</button></form>
<p><a href="/questions?quiz_id={id}">Questions of this quiz</a> | <a href="/quizzes?module_id={module_id}">Back to quizzes</a></p>"#,
        id = quiz.id,
        module_id = quiz.module_id,
        fields = quiz_fields(Some(quiz), modules, None),
    )
}
