use axum::extract::State;
use axum::response::IntoResponse;

use crate::{
    app_state::AppState,
    guard::CurrentUser,
    templates::{EventsTemplate, HtmlTemplate, LayoutContext},
};

/// GET /events — static listing of upcoming events; open to everyone.
pub async fn events_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    let layout = LayoutContext::new(&state, user, "Events");
    HtmlTemplate::new(EventsTemplate::new(layout))
}
