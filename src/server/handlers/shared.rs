use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{
    app_state::AppState,
    guard::CurrentUser,
    templates::{AccessDeniedTemplate, HtmlTemplate, LayoutContext, NotFoundTemplate},
};

/// Ensure the request carries a resolved identity before a protected page
/// renders. Anonymous callers get the access-denied page.
pub fn require_user_page(
    state: &AppState,
    identity: Option<String>,
    route: &'static str,
) -> Result<String, Response> {
    match identity {
        Some(username) => Ok(username),
        None => {
            warn!(target: "auth", route, "anonymous request to protected page");
            let layout = LayoutContext::new(state, None, "Access denied");
            Err(HtmlTemplate::with_status(
                AccessDeniedTemplate::new(layout),
                StatusCode::FORBIDDEN,
            )
            .into_response())
        }
    }
}

/// Ensure the request carries a resolved identity before a protected form
/// submission runs. Anonymous callers get a bare 403.
pub fn require_user_form(
    identity: Option<String>,
    route: &'static str,
) -> Result<String, Response> {
    match identity {
        Some(username) => Ok(username),
        None => {
            warn!(target: "auth", route, "anonymous submission to protected route");
            Err((StatusCode::FORBIDDEN, "You must be signed in to do that.").into_response())
        }
    }
}

/// Fallback for every unmatched route.
pub async fn not_found_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    let layout = LayoutContext::new(&state, user, "Page not found");
    HtmlTemplate::with_status(NotFoundTemplate::new(layout), StatusCode::NOT_FOUND)
        .into_response()
}
