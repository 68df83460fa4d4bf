use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tracing::debug;

use crate::{
    app_state::AppState,
    guard::CurrentUser,
    templates::{ChatTemplate, HtmlTemplate, LayoutContext},
};

use crate::server::constants::MAX_CHAT_MESSAGE_CHARS;

use super::shared::{require_user_form, require_user_page};

/// GET /chat — display the chat room to signed-in users.
pub async fn chat_form_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    let username = match require_user_page(&state, user, "/chat") {
        Ok(username) => username,
        Err(response) => return response,
    };

    render_chat_page(&state, username, None, StatusCode::OK)
}

/// POST /chat — echo the submitted message back to the sender. Messages are
/// not persisted or broadcast.
pub async fn chat_submit_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ChatForm>,
) -> Response {
    let username = match require_user_form(user, "/chat") {
        Ok(username) => username,
        Err(response) => return response,
    };

    let message: String = form
        .message
        .trim()
        .chars()
        .take(MAX_CHAT_MESSAGE_CHARS)
        .collect();

    if message.is_empty() {
        return render_chat_page(&state, username, None, StatusCode::OK);
    }

    debug!(target: "chat", username = %username, "echoing chat message");
    render_chat_page(&state, username, Some(message), StatusCode::OK)
}

fn render_chat_page(
    state: &AppState,
    username: String,
    message: Option<String>,
    status: StatusCode,
) -> Response {
    let layout = LayoutContext::new(state, Some(username.clone()), "Chat");
    let mut template = ChatTemplate::new(layout, username);
    if let Some(message) = message {
        template = template.with_message(message);
    }

    HtmlTemplate::with_status(template, status).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}
