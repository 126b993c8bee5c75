use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::state::AppState;

pub mod handlers;
pub mod templates;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/dashboard", get(handlers::dashboard))
        .route("/profile", get(handlers::profile))
        .route("/settings", get(handlers::settings))
}

/// Render a template into an HTML response.
pub fn render<T: Template>(template: &T) -> Response {
    render_with_status(StatusCode::OK, template)
}

pub fn render_with_status<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Maps the `?notice=` codes set by redirects to the message shown. Unknown
/// codes show nothing, so arbitrary text is never reflected into a page.
pub fn notice_message(code: Option<&str>) -> Option<&'static str> {
    match code? {
        "registered" => Some("Registration successful. Please log in."),
        "logged_out" => Some("You have been logged out."),
        "password_reset" => Some("Your password has been reset. Please log in."),
        "account_deleted" => Some("Your account and all its data have been deleted."),
        "password_changed" => Some("Password updated."),
        "reset_sent" => Some("If that email is registered, a reset link has been issued."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_notices_only() {
        assert!(notice_message(Some("registered")).is_some());
        assert!(notice_message(Some("<script>")).is_none());
        assert!(notice_message(None).is_none());
    }
}
