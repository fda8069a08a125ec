use super::layout::pagination_links;
use super::{
    checkbox_input, delete_button, empty_row, escape, number_input, select, status_badge,
    text_input, textarea, toggle_button,
};
use crate::model::Pagination;
use crate::model::catalog::{Lesson, LessonListRow, ModuleChoice};
use crate::payloads::catalog::ListLessonsParams;

pub const CONTENT_MAX: usize = 20000;

/// `(module id, "Course / Module")` pairs.
pub fn module_options(modules: &[ModuleChoice]) -> Vec<(String, String)> {
    modules
        .iter()
        .map(|m| {
            (
                m.id.to_string(),
                format!("{} / {}", m.course_title, m.title),
            )
        })
        .collect()
}

pub fn list(
    rows: &[LessonListRow],
    pagination: &Pagination,
    modules: &[ModuleChoice],
    courses: &[(i64, String, bool)],
    params: &ListLessonsParams,
) -> String {
    let course_options: Vec<(String, String)> = courses
        .iter()
        .map(|(id, title, _)| (id.to_string(), title.clone()))
        .collect();
    let module_list = module_options(modules);
    let course_filter = params.course_id.map(|id| id.to_string()).unwrap_or_default();
    let module_filter = params.module_id.map(|id| id.to_string()).unwrap_or_default();
    let search = params.search.clone().unwrap_or_default();

    let mut table = String::new();
    for row in rows {
        let lesson = &row.lesson;
        table.push_str(&format!(
            r#"<tr><td>{order}</td><td>{title}</td><td>{course} / {module}</td><td>{duration}</td><td>{status}</td>
<td><a href="/lessons/{id}/edit">Edit</a> {toggle} {delete}</td></tr>"#,
            order = lesson.order_sequence,
            title = escape(&lesson.title),
            course = escape(&row.course_title),
            module = escape(&row.module_title),
            duration = lesson
                .estimated_duration
                .map(|m| format!("{} min", m))
                .unwrap_or_else(|| "-".to_string()),
            status = status_badge(lesson.is_active),
            id = lesson.id,
            toggle = toggle_button(&format!("/lessons/{}/toggle", lesson.id), lesson.is_active),
            delete = delete_button(
                &format!("/lessons/{}/delete", lesson.id),
                &format!("lesson '{}'", lesson.title)
            ),
        ));
    }
    if rows.is_empty() {
        table = empty_row(6, "No lessons found.");
    }

    format!(
        r#"<form method="get" action="/lessons" class="filters">{course_select}{module_select}
<input type="search" name="search" value="{search_value}" placeholder="Search by title"> <button type="submit">Filter</button></form>
<table><thead><tr><th>#</th><th>Title</th><th>Module</th><th>Duration</th><th>Status</th><th></th></tr></thead>
<tbody>{table}</tbody></table>
{pages}
<h2>New lesson</h2>
<form method="post" action="/lessons" data-draft="new-lesson">{target}{title}{content}{order}{duration}
<button type="submit">Create lesson</button></form>"#,
        course_select = select("course_id", "Course", &course_options, Some(&course_filter), Some("All courses")),
        module_select = select("module_id", "Module", &module_list, Some(&module_filter), Some("All modules")),
        search_value = escape(&search),
        pages = pagination_links(
            "/lessons",
            &[
                ("course_id", course_filter.clone()),
                ("module_id", module_filter.clone()),
                ("search", search.clone()),
            ],
            pagination
        ),
        target = select("module_id", "Module", &module_list, Some(&module_filter), None),
        title = text_input("title", "Title", "", 255),
        content = textarea("content", "Content", "", Some(CONTENT_MAX)),
        order = number_input("order_sequence", "Order (blank for last)", None, 1, 9999, false),
        duration = number_input("estimated_duration", "Estimated minutes", None, 1, 10000, false),
    )
}

pub fn edit(lesson: &Lesson, module_title: &str) -> String {
    format!(
        r#"<p>Module: {module}</p>
<form method="post" action="/lessons/{id}" data-draft="lesson-{id}">{title}{content}{order}{duration}{active}
<button type="submit">Save changes</button></form>
<p><a href="/lessons?module_id={module_id}">Back to lessons</a></p>"#,
        module = escape(module_title),
        id = lesson.id,
        module_id = lesson.module_id,
        title = text_input("title", "Title", &lesson.title, 255),
        content = textarea("content", "Content", &lesson.content, Some(CONTENT_MAX)),
        order = number_input("order_sequence", "Order", Some(lesson.order_sequence), 1, 9999, false),
        duration = number_input(
            "estimated_duration",
            "Estimated minutes",
            lesson.estimated_duration,
            1,
            10000,
            false
        ),
        active = checkbox_input("is_active", "Active", lesson.is_active),
    )
}
