//! Server-rendered HTML for the back-office screens.
//!
//! Every value that originates from the database or the request goes
//! through [`escape`] before it is interpolated.

use chrono::{DateTime, Utc};

pub mod certificates;
pub mod courses;
pub mod dashboard;
pub mod layout;
pub mod lessons;
pub mod modules;
pub mod questions;
pub mod quizzes;
pub mod students;

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_optional_date(at: Option<&DateTime<Utc>>) -> String {
    at.map(format_date).unwrap_or_else(|| "-".to_string())
}

pub fn status_badge(active: bool) -> &'static str {
    if active {
        r#"<span class="badge badge-success">Active</span>"#
    } else {
        r#"<span class="badge badge-muted">Inactive</span>"#
    }
}

fn checked(on: bool) -> &'static str {
    if on { " checked" } else { "" }
}

fn selected(on: bool) -> &'static str {
    if on { " selected" } else { "" }
}

pub fn text_input(name: &str, label: &str, value: &str, max_length: usize) -> String {
    format!(
        r#"<label>{label}<input type="text" name="{name}" value="{value}" maxlength="{max_length}" required></label>"#,
        label = escape(label),
        value = escape(value),
    )
}

/// Textarea with a live character counter when `max_length` is given.
pub fn textarea(name: &str, label: &str, value: &str, max_length: Option<usize>) -> String {
    let limit = max_length
        .map(|n| format!(r#" maxlength="{}" data-counter"#, n))
        .unwrap_or_default();
    format!(
        r#"<label>{label}<textarea name="{name}" rows="4"{limit}>{value}</textarea></label>"#,
        label = escape(label),
        value = escape(value),
    )
}

pub fn number_input(
    name: &str,
    label: &str,
    value: Option<i32>,
    min: i32,
    max: i32,
    required: bool,
) -> String {
    format!(
        r#"<label>{label}<input type="number" name="{name}" value="{value}" min="{min}" max="{max}"{required}></label>"#,
        label = escape(label),
        value = value.map(|v| v.to_string()).unwrap_or_default(),
        required = if required { " required" } else { "" },
    )
}

pub fn checkbox_input(name: &str, label: &str, on: bool) -> String {
    format!(
        r#"<label class="inline"><input type="checkbox" name="{name}" value="on"{checked}> {label}</label>"#,
        label = escape(label),
        checked = checked(on),
    )
}

/// `<select>` over `(value, label)` pairs with an optional blank first entry.
pub fn select(
    name: &str,
    label: &str,
    choices: &[(String, String)],
    current: Option<&str>,
    blank: Option<&str>,
) -> String {
    let mut options = String::new();
    if let Some(placeholder) = blank {
        options.push_str(&format!(r#"<option value="">{}</option>"#, escape(placeholder)));
    }
    for (value, text) in choices {
        options.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            escape(value),
            selected(current == Some(value.as_str())),
            escape(text)
        ));
    }
    format!(
        r#"<label>{label}<select name="{name}">{options}</select></label>"#,
        label = escape(label),
    )
}

/// Small POST form rendered as a single button.
pub fn post_button(action: &str, label: &str, confirm: Option<&str>) -> String {
    let confirm_attr = confirm
        .map(|message| format!(r#" data-confirm="{}""#, escape(message)))
        .unwrap_or_default();
    format!(
        r#"<form method="post" action="{action}" class="inline"{confirm_attr}><button type="submit">{label}</button></form>"#,
        action = escape(action),
        label = escape(label),
    )
}

pub fn toggle_button(action: &str, active: bool) -> String {
    post_button(action, if active { "Deactivate" } else { "Activate" }, None)
}

pub fn delete_button(action: &str, what: &str) -> String {
    post_button(
        action,
        "Delete",
        Some(&format!("Delete {}? This cannot be undone.", what)),
    )
}

/// Bulk action bar; row checkboxes reference the form by id.
pub fn bulk_form(action: &str, form_id: &str, allow_delete: bool) -> String {
    let delete_option = if allow_delete {
        r#"<option value="delete">Delete</option>"#
    } else {
        ""
    };
    format!(
        r#"<form method="post" action="{action}" id="{form_id}" class="bulk-bar" data-confirm="Apply this action to every selected row?">
<select name="action"><option value="">Bulk action</option><option value="activate">Activate</option><option value="deactivate">Deactivate</option>{delete_option}</select>
<button type="submit">Apply</button></form>"#,
        action = escape(action),
    )
}

pub fn bulk_checkbox(form_id: &str, id: i64) -> String {
    format!(r#"<input type="checkbox" name="id" value="{id}" form="{form_id}">"#)
}

pub fn empty_row(columns: usize, message: &str) -> String {
    format!(
        r#"<tr><td colspan="{columns}" class="empty">{}</td></tr>"#,
        escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#x27;y&#x27;&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn select_marks_current_value() {
        let html = select(
            "quiz_type",
            "Type",
            &[
                ("module".to_string(), "Module quiz".to_string()),
                ("final".to_string(), "Final exam".to_string()),
            ],
            Some("final"),
            Some("All types"),
        );
        assert!(html.contains(r#"<option value="final" selected>Final exam</option>"#));
        assert!(html.contains(r#"<option value="module">Module quiz</option>"#));
        assert!(html.starts_with("<label>Type<select"));
    }

    #[test]
    fn delete_button_asks_for_confirmation() {
        let html = delete_button("/courses/3/delete", "course 'A<B'");
        assert!(html.contains(r#"data-confirm="Delete course &#x27;A&lt;B&#x27;?"#));
        assert!(html.contains(r#"action="/courses/3/delete""#));
    }
}
