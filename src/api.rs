//! HTTP handlers of the back-office, one module per screen.
//!
//! GET handlers render a full page. POST handlers perform one store call and
//! answer with a 303 redirect carrying a `notice` or `error` banner.

pub mod certificates;
pub mod courses;
pub mod dashboard;
pub mod lessons;
pub mod modules;
pub mod options;
pub mod questions;
pub mod quizzes;
pub mod students;

mod helper;

/// Banner text for a toggle that left the entity in state `active`.
fn toggled(entity: &str, active: bool) -> String {
    format!(
        "{} {}.",
        entity,
        if active { "activated" } else { "deactivated" }
    )
}
