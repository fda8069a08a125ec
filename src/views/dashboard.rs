use super::{empty_row, escape, format_date};
use crate::model::learner::{ActivityItem, DashboardStats};

fn tile(label: &str, value: String, link: &str) -> String {
    format!(r#"<a class="tile" href="{link}"><strong>{value}</strong><span>{label}</span></a>"#)
}

pub fn render(stats: &DashboardStats, activity: &[ActivityItem]) -> String {
    let tiles = [
        tile(
            "Courses",
            format!("{} ({} active)", stats.total_courses, stats.active_courses),
            "/courses",
        ),
        tile("Modules", stats.total_modules.to_string(), "/modules"),
        tile("Lessons", stats.total_lessons.to_string(), "/lessons"),
        tile("Quizzes", stats.total_quizzes.to_string(), "/quizzes"),
        tile("Questions", stats.total_questions.to_string(), "/questions"),
        tile(
            "Students",
            format!("{} ({} active)", stats.total_students, stats.active_students),
            "/students",
        ),
        tile(
            "Certificates",
            stats.total_certificates.to_string(),
            "/certificates",
        ),
        tile(
            "Quiz attempts",
            format!("{} ({:.1}% passed)", stats.total_attempts, stats.pass_rate()),
            "/quizzes",
        ),
    ]
    .concat();

    let mut feed: String = activity
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                item.kind.label(),
                escape(&item.description),
                format_date(&item.at)
            )
        })
        .collect();
    if activity.is_empty() {
        feed = empty_row(3, "No activity yet.");
    }

    format!(
        r#"<section class="tiles">{tiles}</section>
<h2>Recent activity</h2>
<table><thead><tr><th>Type</th><th>Event</th><th>When</th></tr></thead><tbody>{feed}</tbody></table>"#
    )
}
