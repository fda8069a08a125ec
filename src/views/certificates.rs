use super::layout::pagination_links;
use super::students::date_filter_options;
use super::{empty_row, escape, format_date, post_button, select};
use crate::model::Pagination;
use crate::model::learner::{CertificateListRow, StudentChoice};
use crate::payloads::learner::{DateFilter, ListCertificatesParams};

pub fn list(
    rows: &[CertificateListRow],
    pagination: &Pagination,
    courses: &[(i64, String, bool)],
    students: &[StudentChoice],
    params: &ListCertificatesParams,
) -> String {
    let course_options: Vec<(String, String)> = courses
        .iter()
        .map(|(id, title, _)| (id.to_string(), title.clone()))
        .collect();
    let student_options: Vec<(String, String)> = students
        .iter()
        .map(|s| {
            (
                s.id.to_string(),
                format!("{} {} <{}>", s.first_name, s.last_name, s.email),
            )
        })
        .collect();
    let search = params.search.clone().unwrap_or_default();
    let course_filter = params.course_id.map(|id| id.to_string()).unwrap_or_default();
    let window = DateFilter::parse(params.date_filter.as_deref())
        .map(|f| f.as_str().to_string())
        .unwrap_or_default();

    let mut table = String::new();
    for row in rows {
        let certificate = &row.certificate;
        table.push_str(&format!(
            r#"<tr><td><a href="{url}">{code}</a></td><td><a href="/students/{user_id}">{first} {last}</a><br>{email}</td><td>{course}</td><td>{issued}</td><td>{revoke}</td></tr>"#,
            url = escape(&certificate.verification_url),
            code = escape(&certificate.certificate_code),
            user_id = certificate.user_id,
            first = escape(&row.first_name),
            last = escape(&row.last_name),
            email = escape(&row.email),
            course = escape(&row.course_title),
            issued = format_date(&certificate.issued_at),
            revoke = post_button(
                &format!("/certificates/{}/delete", certificate.id),
                "Revoke",
                Some(&format!("Revoke certificate {}?", certificate.certificate_code)),
            ),
        ));
    }
    if rows.is_empty() {
        table = empty_row(5, "No certificates found.");
    }

    format!(
        r#"<form method="get" action="/certificates" class="filters">
<input type="search" name="search" value="{search_value}" placeholder="Student or code">{course_select}{date_select}
<button type="submit">Filter</button></form>
<table><thead><tr><th>Code</th><th>Student</th><th>Course</th><th>Issued</th><th></th></tr></thead>
<tbody>{table}</tbody></table>
{pages}
<h2>Issue certificate</h2>
<form method="post" action="/certificates">{student_select}{target_course}<button type="submit">Issue</button></form>"#,
        search_value = escape(&search),
        course_select = select("course_id", "Course", &course_options, Some(&course_filter), Some("All courses")),
        date_select = select("date_filter", "Issued", &date_filter_options(), Some(&window), Some("Any time")),
        pages = pagination_links(
            "/certificates",
            &[
                ("search", search.clone()),
                ("course_id", course_filter.clone()),
                ("date_filter", window.clone()),
            ],
            pagination
        ),
        student_select = select("user_id", "Student", &student_options, None, None),
        target_course = select("course_id", "Course", &course_options, None, None),
    )
}
