use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    app_state::AppState,
    cookies,
    credentials::{randomized_backoff, CredentialError},
    guard::{self, CurrentUser},
    rate_limit::RateLimitError,
    server::utils::server_error_response,
    templates::{HtmlTemplate, LayoutContext, LoginTemplate, SignupTemplate},
};

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";
const USERNAME_TAKEN_MESSAGE: &str = "Username already exists.";
const EMPTY_FIELDS_MESSAGE: &str = "Username and password must not be empty.";

/// GET /login — display the login form, or bounce signed-in users home.
pub async fn login_form_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    let layout = LayoutContext::new(&state, None, "Log in");
    HtmlTemplate::new(LoginTemplate::new(layout)).into_response()
}

/// POST /login — verify credentials, establish a session, set the cookie.
pub async fn login_submit_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<LoginForm>,
) -> Response {
    let client_ip = addr.ip();

    if let Err(err) = state.login_rate_limiter().check_ip(client_ip) {
        warn!(target: "auth", ip = %client_ip, %err, "rate limited login by IP");
        return rate_limited_login_response(&state, &form.username, &err);
    }

    if let Err(err) = state.login_rate_limiter().check_username(&form.username) {
        warn!(target: "auth", username = %form.username, %err, "rate limited login by username");
        return rate_limited_login_response(&state, &form.username, &err);
    }

    let verified = match state
        .credentials()
        .verify(&form.username, &form.password)
        .await
    {
        Ok(verified) => verified,
        Err(err) => {
            error!(target: "auth", %err, "error verifying password");
            return server_error_response();
        }
    };

    if !verified {
        randomized_backoff().await;
        return render_login_page(
            &state,
            &form.username,
            Some(INVALID_CREDENTIALS_MESSAGE.to_string()),
            StatusCode::UNAUTHORIZED,
        );
    }

    let token = state.sessions().create(&form.username);
    info!(target: "auth", username = %form.username, "user logged in");

    redirect_with_session_cookie(&state, &token)
}

/// GET /signup — display the registration form.
pub async fn signup_form_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    let layout = LayoutContext::new(&state, None, "Sign up");
    HtmlTemplate::new(SignupTemplate::new(layout)).into_response()
}

/// POST /signup — register the account and log the new user straight in.
pub async fn signup_submit_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<SignupForm>,
) -> Response {
    let client_ip = addr.ip();

    if let Err(err) = state.login_rate_limiter().check_ip(client_ip) {
        warn!(target: "auth", ip = %client_ip, %err, "rate limited signup by IP");
        let mut response = render_signup_page(
            &state,
            &form.username,
            Some("Too many attempts. Please wait and try again.".to_string()),
            StatusCode::TOO_MANY_REQUESTS,
        );
        attach_retry_after(&mut response, err.retry_after().as_secs());
        return response;
    }

    match state
        .credentials()
        .register(&form.username, &form.password)
        .await
    {
        Ok(()) => {}
        Err(CredentialError::UsernameTaken) => {
            warn!(target: "auth", username = %form.username, "signup with taken username");
            return render_signup_page(
                &state,
                &form.username,
                Some(USERNAME_TAKEN_MESSAGE.to_string()),
                StatusCode::CONFLICT,
            );
        }
        Err(CredentialError::InvalidUsername | CredentialError::InvalidPassword) => {
            return render_signup_page(
                &state,
                &form.username,
                Some(EMPTY_FIELDS_MESSAGE.to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
        Err(err) => {
            error!(target: "auth", %err, "failed to register account");
            return server_error_response();
        }
    }

    let token = state.sessions().create(&form.username);
    info!(target: "auth", username = %form.username, "account registered");

    redirect_with_session_cookie(&state, &token)
}

/// GET /logout — revoke the session and clear the cookie. Always redirects
/// home, even when no session was live.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Response {
    let cookie_name = &state.config().session.cookie_name;

    if let Some(token) = guard::session_token(&headers, cookie_name) {
        state.sessions().revoke(&token);
        info!(target: "auth", "session revoked on logout");
    }

    let mut response = Redirect::to("/").into_response();
    match HeaderValue::from_str(&cookies::clear_session_cookie(cookie_name)) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(err) => {
            error!(target: "auth", %err, "failed to build clearing cookie header");
        }
    }
    response
}

fn redirect_with_session_cookie(state: &AppState, token: &str) -> Response {
    let cookie = cookies::session_cookie(&state.config().session.cookie_name, token);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            let mut response = Redirect::to("/").into_response();
            response.headers_mut().insert(header::SET_COOKIE, value);
            response
        }
        Err(err) => {
            error!(target: "auth", %err, "failed to build session cookie header");
            server_error_response()
        }
    }
}

fn render_login_page(
    state: &AppState,
    username: &str,
    error_message: Option<String>,
    status: StatusCode,
) -> Response {
    let layout = LayoutContext::new(state, None, "Log in");
    let mut template = LoginTemplate::new(layout).with_username(username);
    if let Some(message) = error_message {
        template = template.with_error_message(message);
    }

    HtmlTemplate::with_status(template, status).into_response()
}

fn render_signup_page(
    state: &AppState,
    username: &str,
    error_message: Option<String>,
    status: StatusCode,
) -> Response {
    let layout = LayoutContext::new(state, None, "Sign up");
    let mut template = SignupTemplate::new(layout).with_username(username);
    if let Some(message) = error_message {
        template = template.with_error_message(message);
    }

    HtmlTemplate::with_status(template, status).into_response()
}

fn rate_limited_login_response(
    state: &AppState,
    username: &str,
    error: &RateLimitError,
) -> Response {
    let message = match error {
        RateLimitError::Ip(_) => {
            "Too many login attempts from this IP address. Please wait and try again.".to_string()
        }
        RateLimitError::Username(_) => {
            "Too many login attempts for this username. Please wait before trying again."
                .to_string()
        }
    };

    let mut response = render_login_page(
        state,
        username,
        Some(message),
        StatusCode::TOO_MANY_REQUESTS,
    );
    attach_retry_after(&mut response, error.retry_after().as_secs());
    response
}

fn attach_retry_after(response: &mut Response, seconds: u64) {
    if let Ok(value) = HeaderValue::from_str(&seconds.max(1).to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
}
