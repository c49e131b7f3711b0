//! Browser pages

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Extension;
use loglens_core::{CallerIdentity, Decision, Operation};

use crate::handlers::deny;
use crate::AppState;

const LOGIN_TEMPLATE: &str = include_str!("../assets/login.html");
const VIEWER_TEMPLATE: &str = include_str!("../assets/viewer.html");

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_login(mount_path: &str, error: Option<&str>) -> String {
    LOGIN_TEMPLATE
        .replace("{{mount_path}}", &escape_html(mount_path))
        .replace("{{error_message}}", &escape_html(error.unwrap_or_default()))
}

pub fn render_viewer(mount_path: &str, client_logging_enabled: bool) -> String {
    VIEWER_TEMPLATE
        .replace("{{mount_path}}", &escape_html(mount_path))
        .replace("{{client_logging}}", if client_logging_enabled { "true" } else { "false" })
}

/// The log viewer; requires the same rights as the file endpoints
pub async fn view(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> Response {
    if let Decision::Denied(reason) = state
        .gate
        .authorize(&identity, Operation::AdminFileOperation)
    {
        return deny(&state, &identity, reason);
    }
    Html(render_viewer(&state.mount_path, state.gate.client_logging_enabled())).into_response()
}

pub async fn index(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.url("/view"))
}
