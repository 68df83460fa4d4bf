use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use time::OffsetDateTime;
use tracing::error;

use crate::app_state::AppState;

/// Shared layout context injected into all templates
#[derive(Clone, Debug)]
pub struct LayoutContext {
    pub title: String,
    pub brand_name: String,
    pub username: Option<String>,
    pub current_year: i32,
}

impl LayoutContext {
    /// Build a layout context for the resolved request identity
    pub fn new(state: &AppState, username: Option<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            brand_name: state.config().ui.brand_name.clone(),
            username,
            current_year: OffsetDateTime::now_utc().year(),
        }
    }
}

/// Wrapper that converts Askama templates into Axum responses with logging
pub struct HtmlTemplate<T: Template> {
    template: T,
    status: StatusCode,
}

impl<T: Template> HtmlTemplate<T> {
    pub fn new(template: T) -> Self {
        Self {
            template,
            status: StatusCode::OK,
        }
    }

    pub fn with_status(template: T, status: StatusCode) -> Self {
        Self { template, status }
    }
}

impl<T: Template> From<T> for HtmlTemplate<T> {
    fn from(template: T) -> Self {
        Self::new(template)
    }
}

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(err) => {
                error!(target: "templates", error = %err, "failed to render template");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Template rendering error",
                )
                    .into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "home.html", escape = "html")]
pub struct HomeTemplate {
    pub layout: LayoutContext,
    pub uploads: Vec<String>,
}

impl HomeTemplate {
    pub fn new(layout: LayoutContext) -> Self {
        Self {
            layout,
            uploads: Vec::new(),
        }
    }

    pub fn with_uploads(mut self, uploads: Vec<String>) -> Self {
        self.uploads = uploads;
        self
    }
}

#[derive(Template)]
#[template(path = "login.html", escape = "html")]
pub struct LoginTemplate {
    pub layout: LayoutContext,
    pub username: String,
    pub error_message: Option<String>,
}

impl LoginTemplate {
    pub fn new(layout: LayoutContext) -> Self {
        Self {
            layout,
            username: String::new(),
            error_message: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

#[derive(Template)]
#[template(path = "signup.html", escape = "html")]
pub struct SignupTemplate {
    pub layout: LayoutContext,
    pub username: String,
    pub error_message: Option<String>,
}

impl SignupTemplate {
    pub fn new(layout: LayoutContext) -> Self {
        Self {
            layout,
            username: String::new(),
            error_message: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

#[derive(Template)]
#[template(path = "upload.html", escape = "html")]
pub struct UploadTemplate {
    pub layout: LayoutContext,
    pub max_file_size_display: String,
    pub error_message: Option<String>,
}

impl UploadTemplate {
    pub fn new(layout: LayoutContext, max_file_size_display: String) -> Self {
        Self {
            layout,
            max_file_size_display,
            error_message: None,
        }
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

#[derive(Template)]
#[template(path = "upload_success.html", escape = "html")]
pub struct UploadSuccessTemplate {
    pub layout: LayoutContext,
    pub stored_name: String,
    pub size_display: String,
}

impl UploadSuccessTemplate {
    pub fn new(layout: LayoutContext, stored_name: String, size_display: String) -> Self {
        Self {
            layout,
            stored_name,
            size_display,
        }
    }
}

#[derive(Template)]
#[template(path = "chat.html", escape = "html")]
pub struct ChatTemplate {
    pub layout: LayoutContext,
    pub username: String,
    pub message: Option<String>,
}

impl ChatTemplate {
    pub fn new(layout: LayoutContext, username: String) -> Self {
        Self {
            layout,
            username,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Template)]
#[template(path = "events.html", escape = "html")]
pub struct EventsTemplate {
    pub layout: LayoutContext,
}

impl EventsTemplate {
    pub fn new(layout: LayoutContext) -> Self {
        Self { layout }
    }
}

#[derive(Template)]
#[template(path = "access_denied.html", escape = "html")]
pub struct AccessDeniedTemplate {
    pub layout: LayoutContext,
}

impl AccessDeniedTemplate {
    pub fn new(layout: LayoutContext) -> Self {
        Self { layout }
    }
}

#[derive(Template)]
#[template(path = "not_found.html", escape = "html")]
pub struct NotFoundTemplate {
    pub layout: LayoutContext,
}

impl NotFoundTemplate {
    pub fn new(layout: LayoutContext) -> Self {
        Self { layout }
    }
}
