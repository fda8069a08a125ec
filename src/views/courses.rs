use super::layout::pagination_links;
use super::{
    bulk_checkbox, bulk_form, checkbox_input, delete_button, empty_row, escape, format_date,
    status_badge, text_input, textarea, toggle_button,
};
use crate::model::Pagination;
use crate::model::catalog::{Course, CourseListRow};
use crate::store::courses::TITLE_MAX;

const BULK_FORM: &str = "course-bulk";

fn course_fields(course: Option<&Course>) -> String {
    format!(
        "{}{}{}",
        text_input(
            "title",
            "Title",
            course.map(|c| c.title.as_str()).unwrap_or_default(),
            TITLE_MAX
        ),
        textarea(
            "description",
            "Description",
            course.map(|c| c.description.as_str()).unwrap_or_default(),
            Some(2000)
        ),
        checkbox_input("is_active", "Active", course.is_none_or(|c| c.is_active)),
    )
}

pub fn list(rows: &[CourseListRow], pagination: &Pagination, search: &str) -> String {
    let mut table = String::new();
    for row in rows {
        let course = &row.course;
        table.push_str(&format!(
            r#"<tr><td>{check}</td><td>{title}</td><td>{modules}</td><td>{enrollments}</td><td>{status}</td><td>{created}</td>
<td><a href="/courses/{id}/edit">Edit</a> {toggle} {delete}</td></tr>"#,
            check = bulk_checkbox(BULK_FORM, course.id),
            title = escape(&course.title),
            modules = row.module_count,
            enrollments = row.enrollment_count,
            status = status_badge(course.is_active),
            created = format_date(&course.created_at),
            id = course.id,
            toggle = toggle_button(&format!("/courses/{}/toggle", course.id), course.is_active),
            delete = delete_button(
                &format!("/courses/{}/delete", course.id),
                &format!("course '{}'", course.title)
            ),
        ));
    }
    if rows.is_empty() {
        table = empty_row(7, "No courses found.");
    }

    format!(
        r#"<form method="get" action="/courses" class="filters">
<input type="search" name="search" value="{search}" placeholder="Search by title"> <button type="submit">Filter</button></form>
{bulk}
<table><thead><tr><th></th><th>Title</th><th>Modules</th><th>Enrollments</th><th>Status</th><th>Created</th><th></th></tr></thead>
<tbody>{table}</tbody></table>
{pages}
<h2>New course</h2>
<form method="post" action="/courses" data-draft="new-course">{fields}<button type="submit">Create course</button></form>"#,
        search = escape(search),
        bulk = bulk_form("/courses/bulk", BULK_FORM, true),
        pages = pagination_links("/courses", &[("search", search.to_string())], pagination),
        fields = course_fields(None),
    )
}

pub fn edit(course: &Course) -> String {
    format!(
        r#"<form method="post" action="/courses/{id}" data-draft="course-{id}">{fields}<button type="submit">Save changes</button></form>
<p><a href="/modules?course_id={id}">Modules of this course</a> | <a href="/courses">Back to courses</a></p>"#,
        id = course.id,
        fields = course_fields(Some(course)),
    )
}
