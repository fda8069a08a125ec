use super::layout::pagination_links;
use super::{
    bulk_checkbox, bulk_form, empty_row, escape, format_date, format_optional_date, select,
    status_badge, toggle_button,
};
use crate::model::Pagination;
use crate::model::learner::{StudentDetail, StudentListRow};
use crate::payloads::learner::{DateFilter, ListStudentsParams};

const BULK_FORM: &str = "student-bulk";

pub fn date_filter_options() -> Vec<(String, String)> {
    DateFilter::ALL
        .iter()
        .map(|f| (f.as_str().to_string(), f.label().to_string()))
        .collect()
}

pub fn list(rows: &[StudentListRow], pagination: &Pagination, params: &ListStudentsParams) -> String {
    let search = params.search.clone().unwrap_or_default();
    let window = DateFilter::parse(params.date_filter.as_deref())
        .map(|f| f.as_str().to_string())
        .unwrap_or_default();

    let mut table = String::new();
    for row in rows {
        let student = &row.student;
        table.push_str(&format!(
            r#"<tr><td>{check}</td><td><a href="/students/{id}">{name}</a></td><td>{email}</td><td>{institute}</td>
<td>{enrollments}</td><td>{certificates}</td><td>{joined}</td><td>{status}</td><td>{toggle}</td></tr>"#,
            check = bulk_checkbox(BULK_FORM, student.id),
            id = student.id,
            name = escape(&student.full_name()),
            email = escape(&student.email),
            institute = escape(&student.institute_name),
            enrollments = row.enrollment_count,
            certificates = row.certificate_count,
            joined = format_date(&student.created_at),
            status = status_badge(student.is_active),
            toggle = toggle_button(&format!("/students/{}/toggle", student.id), student.is_active),
        ));
    }
    if rows.is_empty() {
        table = empty_row(9, "No students found.");
    }

    format!(
        r#"<form method="get" action="/students" class="filters">
<input type="search" name="search" value="{search_value}" placeholder="Name, email or institute">{date_select}
<button type="submit">Filter</button></form>
{bulk}
<table><thead><tr><th></th><th>Name</th><th>Email</th><th>Institute</th><th>Enrollments</th><th>Certificates</th><th>Joined</th><th>Status</th><th></th></tr></thead>
<tbody>{table}</tbody></table>
{pages}"#,
        search_value = escape(&search),
        date_select = select("date_filter", "Joined", &date_filter_options(), Some(&window), Some("Any time")),
        bulk = bulk_form("/students/bulk", BULK_FORM, false),
        pages = pagination_links(
            "/students",
            &[("search", search.clone()), ("date_filter", window.clone())],
            pagination
        ),
    )
}

pub fn detail(detail: &StudentDetail) -> String {
    let student = &detail.student;

    let mut enrollments = String::new();
    for enrollment in &detail.enrollments {
        enrollments.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&enrollment.course_title),
            escape(&enrollment.status.replace('_', " ")),
            format_date(&enrollment.enrolled_at),
            format_optional_date(enrollment.completed_at.as_ref()),
        ));
    }
    if detail.enrollments.is_empty() {
        enrollments = empty_row(4, "Not enrolled in any course.");
    }

    let mut attempts = String::new();
    for attempt in &detail.attempts {
        attempts.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}%</td><td>{}</td><td>{}</td></tr>",
            escape(&attempt.quiz_title),
            attempt.attempt_number,
            attempt.score.with_scale(1),
            if attempt.passed { "Passed" } else { "Failed" },
            format_optional_date(attempt.completed_at.as_ref()),
        ));
    }
    if detail.attempts.is_empty() {
        attempts = empty_row(5, "No quiz attempts yet.");
    }

    let mut certificates = String::new();
    for row in &detail.certificates {
        certificates.push_str(&format!(
            r#"<tr><td>{}</td><td><a href="{}">{}</a></td><td>{}</td></tr>"#,
            escape(&row.course_title),
            escape(&row.certificate.verification_url),
            escape(&row.certificate.certificate_code),
            format_date(&row.certificate.issued_at),
        ));
    }
    if detail.certificates.is_empty() {
        certificates = empty_row(3, "No certificates issued.");
    }

    format!(
        r#"<dl><dt>Email</dt><dd>{email}</dd><dt>Institute</dt><dd>{institute}</dd><dt>Joined</dt><dd>{joined}</dd><dt>Status</dt><dd>{status}</dd></dl>
{toggle}
<h2>Enrollments</h2>
<table><thead><tr><th>Course</th><th>Status</th><th>Enrolled</th><th>Completed</th></tr></thead><tbody>{enrollments}</tbody></table>
<h2>Recent quiz attempts</h2>
<table><thead><tr><th>Quiz</th><th>Attempt</th><th>Score</th><th>Result</th><th>Completed</th></tr></thead><tbody>{attempts}</tbody></table>
<h2>Certificates</h2>
<table><thead><tr><th>Course</th><th>Code</th><th>Issued</th></tr></thead><tbody>{certificates}</tbody></table>
<p><a href="/students">Back to students</a></p>"#,
        email = escape(&student.email),
        institute = escape(&student.institute_name),
        joined = format_date(&student.created_at),
        status = status_badge(student.is_active),
        toggle = toggle_button(&format!("/students/{}/toggle", student.id), student.is_active),
    )
}
