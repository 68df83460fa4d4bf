use axum::routing::get;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::server::constants::MULTIPART_OVERHEAD_BYTES;
use crate::server::handlers;

/// Construct the application's HTTP router with all routes and middleware
/// configured. Dispatch is total: anything outside the table below lands in
/// the 404 fallback.
pub fn build_router(state: AppState) -> Router {
    let upload_body_limit = state
        .config()
        .storage
        .max_file_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let upload_routes = Router::new()
        .route(
            "/upload",
            get(handlers::uploads::upload_form_handler)
                .post(handlers::uploads::upload_submit_handler),
        )
        .layer(RequestBodyLimitLayer::new(upload_body_limit as usize));

    Router::new()
        .route("/", get(handlers::home::home_handler))
        .route(
            "/login",
            get(handlers::auth::login_form_handler).post(handlers::auth::login_submit_handler),
        )
        .route(
            "/signup",
            get(handlers::auth::signup_form_handler).post(handlers::auth::signup_submit_handler),
        )
        .route("/logout", get(handlers::auth::logout_handler))
        .route(
            "/chat",
            get(handlers::chat::chat_form_handler).post(handlers::chat::chat_submit_handler),
        )
        .route("/events", get(handlers::events::events_handler))
        .merge(upload_routes)
        .fallback(handlers::shared::not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
