use crate::errors::AppError;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::warn;
use url::form_urlencoded;

/// A rendered HTML page.
#[derive(Debug)]
pub struct Page(pub String);

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        Html(self.0).into_response()
    }
}

/// Redirect-after-write: a 303 to `target` with a success banner.
pub fn redirect_with_notice(target: &str, notice: &str) -> Redirect {
    Redirect::to(&with_param(target, "notice", notice))
}

/// Redirect-after-write: a 303 to `target` with an error banner.
pub fn redirect_with_error(target: &str, error: &str) -> Redirect {
    Redirect::to(&with_param(target, "error", error))
}

/// Turns the outcome of a write into the redirect shown to the browser.
///
/// Recoverable failures (validation, integrity, missing rows) go back to
/// `back` as an inline banner; anything else is rendered as an error page.
pub fn finish_write(
    outcome: Result<String, AppError>,
    success: &str,
    back: &str,
) -> Result<Redirect, AppError> {
    match outcome {
        Ok(notice) => Ok(redirect_with_notice(success, &notice)),
        Err(err) if err.is_recoverable() => {
            warn!("Write rejected, redirecting to {}: {}", back, err);
            Ok(redirect_with_error(back, &err.user_message()))
        }
        Err(err) => Err(err),
    }
}

fn with_param(target: &str, key: &str, value: &str) -> String {
    let encoded: String = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();
    let separator = if target.contains('?') { '&' } else { '?' };
    format!("{}{}{}", target, separator, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn notice_is_url_encoded() {
        let loc = location(redirect_with_notice("/courses", "Course 'A&B' created"));
        assert_eq!(loc, "/courses?notice=Course+%27A%26B%27+created");
    }

    #[test]
    fn param_is_appended_to_existing_query() {
        let loc = location(redirect_with_error("/quizzes?module_id=3", "No"));
        assert_eq!(loc, "/quizzes?module_id=3&error=No");
    }

    #[test]
    fn recoverable_errors_redirect_back() {
        let outcome = Err(AppError::Validation("Title is required.".to_string()));
        let redirect = finish_write(outcome, "/courses", "/courses/1/edit").unwrap();
        assert_eq!(
            location(redirect),
            "/courses/1/edit?error=Title+is+required."
        );
    }

    #[test]
    fn internal_errors_are_not_swallowed() {
        let outcome = Err(AppError::InternalServerError(anyhow::anyhow!("boom")));
        assert!(finish_write(outcome, "/courses", "/courses").is_err());
    }
}
