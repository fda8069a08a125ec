use super::escape;
use crate::auth::AdminIdentity;
use crate::model::Pagination;
use crate::payloads::Banner;
use axum::http::StatusCode;
use url::form_urlencoded;

/// Sidebar entry highlighted for the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Courses,
    Modules,
    Lessons,
    Quizzes,
    Questions,
    Students,
    Certificates,
}

impl Section {
    const ALL: [Section; 8] = [
        Section::Dashboard,
        Section::Courses,
        Section::Modules,
        Section::Lessons,
        Section::Quizzes,
        Section::Questions,
        Section::Students,
        Section::Certificates,
    ];

    fn href(&self) -> &'static str {
        match self {
            Section::Dashboard => "/",
            Section::Courses => "/courses",
            Section::Modules => "/modules",
            Section::Lessons => "/lessons",
            Section::Quizzes => "/quizzes",
            Section::Questions => "/questions",
            Section::Students => "/students",
            Section::Certificates => "/certificates",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Courses => "Courses",
            Section::Modules => "Modules",
            Section::Lessons => "Lessons",
            Section::Quizzes => "Quizzes",
            Section::Questions => "Questions",
            Section::Students => "Students",
            Section::Certificates => "Certificates",
        }
    }
}

const STYLE: &str = r#"<style>
body{font-family:system-ui,sans-serif;margin:0;display:grid;grid-template-columns:200px 1fr;grid-template-rows:auto 1fr auto;min-height:100vh}
header{grid-column:1/3;background:#1f3b57;color:#fff;padding:.6rem 1rem;display:flex;justify-content:space-between}
nav{background:#f1f4f7;padding:1rem}nav a{display:block;padding:.3rem 0;color:#1f3b57}nav a.current{font-weight:bold}
main{padding:1rem 2rem}footer{grid-column:1/3;padding:.5rem 1rem;font-size:.8rem;color:#666}
table{border-collapse:collapse;width:100%}td,th{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}
.banner{padding:.6rem;margin-bottom:1rem}.banner.notice{background:#e3f6e5}.banner.error{background:#fbe3e3}
.badge-success{color:#1d7a2e}.badge-muted{color:#888}form.inline{display:inline}label{display:block;margin:.4rem 0}
label.inline{display:inline}.counter{font-size:.75rem;color:#666}.empty{color:#888;text-align:center}
</style>"#;

/// Confirmation prompts, textarea counters and draft auto-save for forms
/// marked with `data-draft`.
const SCRIPT: &str = r#"<script>
document.querySelectorAll('form[data-confirm]').forEach(function(f){
  f.addEventListener('submit',function(e){if(!window.confirm(f.dataset.confirm)){e.preventDefault();}});
});
document.querySelectorAll('textarea[data-counter]').forEach(function(t){
  var c=document.createElement('div');c.className='counter';t.after(c);
  var upd=function(){c.textContent=t.value.length+' / '+t.maxLength;};t.addEventListener('input',upd);upd();
});
document.querySelectorAll('form[data-draft]').forEach(function(f){
  var key='draft:'+f.dataset.draft;
  try{var saved=JSON.parse(localStorage.getItem(key)||'{}');
    Object.keys(saved).forEach(function(n){var el=f.elements[n];if(el&&el.type!=='checkbox'&&!el.value){el.value=saved[n];}});}catch(_){}
  f.addEventListener('input',function(){var data={};
    Array.prototype.forEach.call(f.elements,function(el){if(el.name&&el.type!=='checkbox'&&el.type!=='hidden'){data[el.name]=el.value;}});
    localStorage.setItem(key,JSON.stringify(data));});
  f.addEventListener('submit',function(){localStorage.removeItem(key);});
});
</script>"#;

fn banner_html(banner: &Banner) -> String {
    let mut html = String::new();
    if let Some(notice) = banner.notice.as_deref().filter(|n| !n.is_empty()) {
        html.push_str(&format!(
            r#"<div class="banner notice" role="status">{}</div>"#,
            escape(notice)
        ));
    }
    if let Some(error) = banner.error.as_deref().filter(|e| !e.is_empty()) {
        html.push_str(&format!(
            r#"<div class="banner error" role="alert">{}</div>"#,
            escape(error)
        ));
    }
    html
}

fn sidebar(current: Section) -> String {
    Section::ALL
        .iter()
        .map(|section| {
            format!(
                r#"<a href="{}"{}>{}</a>"#,
                section.href(),
                if *section == current {
                    r#" class="current""#
                } else {
                    ""
                },
                section.label()
            )
        })
        .collect()
}

/// Wraps a screen body in the shared page chrome.
pub fn page(
    title: &str,
    current: Section,
    admin: &AdminIdentity,
    banner: &Banner,
    body: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"><title>{title} | LMS Admin</title>{STYLE}</head>
<body>
<header><strong>LMS Admin</strong><span>Signed in as {admin}</span></header>
<nav>{nav}</nav>
<main><h1>{title}</h1>{banners}{body}</main>
<footer>LMS administration</footer>
{SCRIPT}
</body></html>"#,
        title = escape(title),
        admin = escape(&admin.username),
        nav = sidebar(current),
        banners = banner_html(banner),
    )
}

/// Stand-alone page for errors that cannot be reported through a redirect.
pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"><title>{code} | LMS Admin</title>{STYLE}</head>
<body><main><h1>{code} {reason}</h1><div class="banner error" role="alert">{message}</div>
<p><a href="/">Back to the dashboard</a></p></main></body></html>"#,
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        message = escape(message),
    )
}

/// Builds `path?k=v&...`, skipping blank values.
pub fn link(path: &str, params: &[(&str, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        if !value.is_empty() {
            serializer.append_pair(key, value);
            any = true;
        }
    }
    if any {
        format!("{}?{}", path, serializer.finish())
    } else {
        path.to_string()
    }
}

/// Previous/next links that keep the active filters.
pub fn pagination_links(path: &str, filters: &[(&str, String)], pagination: &Pagination) -> String {
    if pagination.total_pages() <= 1 {
        return format!(
            r#"<p class="pagination">{} result(s)</p>"#,
            pagination.total
        );
    }
    let page_link = |page: i64, label: &str| {
        let mut params = filters.to_vec();
        params.push(("page", page.to_string()));
        format!(
            r#"<a href="{}">{}</a>"#,
            escape(&link(path, &params)),
            label
        )
    };

    let mut html = String::from(r#"<p class="pagination">"#);
    if pagination.has_previous() {
        html.push_str(&page_link(pagination.page - 1, "&laquo; Previous"));
        html.push(' ');
    }
    html.push_str(&format!(
        "Page {} of {} ({} results)",
        pagination.page,
        pagination.total_pages(),
        pagination.total
    ));
    if pagination.has_next() {
        html.push(' ');
        html.push_str(&page_link(pagination.page + 1, "Next &raquo;"));
    }
    html.push_str("</p>");
    html
}
