use super::layout::pagination_links;
use super::{
    checkbox_input, delete_button, empty_row, escape, number_input, select, status_badge,
    text_input, textarea, toggle_button,
};
use crate::model::Pagination;
use crate::model::catalog::{Module, ModuleListRow};
use crate::payloads::catalog::ListModulesParams;
use crate::store::modules::ORDER_MAX;

fn module_fields(module: Option<&Module>) -> String {
    format!(
        "{}{}{}{}{}",
        text_input(
            "title",
            "Title",
            module.map(|m| m.title.as_str()).unwrap_or_default(),
            255
        ),
        textarea(
            "description",
            "Description",
            module.map(|m| m.description.as_str()).unwrap_or_default(),
            Some(2000)
        ),
        number_input(
            "order_sequence",
            "Order",
            Some(module.map(|m| m.order_sequence).unwrap_or(1)),
            1,
            ORDER_MAX,
            true
        ),
        number_input(
            "pass_threshold",
            "Pass threshold (%)",
            Some(module.map(|m| m.pass_threshold).unwrap_or(70)),
            0,
            100,
            true
        ),
        checkbox_input("is_active", "Active", module.is_none_or(|m| m.is_active)),
    )
}

/// `courses` are `(id, title, is_active)`.
pub fn list(
    rows: &[ModuleListRow],
    pagination: &Pagination,
    courses: &[(i64, String, bool)],
    params: &ListModulesParams,
) -> String {
    let all_courses: Vec<(String, String)> = courses
        .iter()
        .map(|(id, title, _)| (id.to_string(), title.clone()))
        .collect();
    let open_courses: Vec<(String, String)> = courses
        .iter()
        .filter(|(_, _, active)| *active)
        .map(|(id, title, _)| (id.to_string(), title.clone()))
        .collect();
    let course_filter = params.course_id.map(|id| id.to_string()).unwrap_or_default();
    let search = params.search.clone().unwrap_or_default();

    let mut table = String::new();
    for row in rows {
        let module = &row.module;
        table.push_str(&format!(
            r#"<tr><td>{order}</td><td>{title}</td><td>{course}</td><td>{lessons}</td><td>{quizzes}</td><td>{threshold}%</td><td>{status}</td>
<td><a href="/modules/{id}/edit">Edit</a> <a href="/lessons?module_id={id}">Lessons</a> <a href="/quizzes?module_id={id}">Quizzes</a> {toggle} {delete}</td></tr>"#,
            order = module.order_sequence,
            title = escape(&module.title),
            course = escape(&row.course_title),
            lessons = row.lesson_count,
            quizzes = row.quiz_count,
            threshold = module.pass_threshold,
            status = status_badge(module.is_active),
            id = module.id,
            toggle = toggle_button(&format!("/modules/{}/toggle", module.id), module.is_active),
            delete = delete_button(
                &format!("/modules/{}/delete", module.id),
                &format!("module '{}'", module.title)
            ),
        ));
    }
    if rows.is_empty() {
        table = empty_row(8, "No modules found.");
    }

    format!(
        r#"<form method="get" action="/modules" class="filters">{course_select}
<input type="search" name="search" value="{search_value}" placeholder="Search by title"> <button type="submit">Filter</button></form>
<table><thead><tr><th>#</th><th>Title</th><th>Course</th><th>Lessons</th><th>Quizzes</th><th>Pass</th><th>Status</th><th></th></tr></thead>
<tbody>{table}</tbody></table>
{pages}
<h2>New module</h2>
<form method="post" action="/modules" data-draft="new-module">{target}{fields}<button type="submit">Create module</button></form>"#,
        course_select = select("course_id", "Course", &all_courses, Some(&course_filter), Some("All courses")),
        search_value = escape(&search),
        pages = pagination_links(
            "/modules",
            &[("course_id", course_filter.clone()), ("search", search.clone())],
            pagination
        ),
        target = select("course_id", "Course", &open_courses, Some(&course_filter), None),
        fields = module_fields(None),
    )
}

pub fn edit(module: &Module, course_title: &str) -> String {
    format!(
        r#"<p>Course: {course}</p>
<form method="post" action="/modules/{id}" data-draft="module-{id}">{fields}<button type="submit">Save changes</button></form>
<p><a href="/modules?course_id={course_id}">Back to modules</a></p>"#,
        course = escape(course_title),
        id = module.id,
        course_id = module.course_id,
        fields = module_fields(Some(module)),
    )
}
