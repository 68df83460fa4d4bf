use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

use crate::{
    app_state::AppState,
    guard::CurrentUser,
    ingest::{self, IngestError},
    templates::{HtmlTemplate, LayoutContext, UploadSuccessTemplate, UploadTemplate},
};

use crate::server::utils::human_readable_size;

use super::shared::{require_user_form, require_user_page};

/// GET /upload — display the file upload form to signed-in users.
pub async fn upload_form_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    let username = match require_user_page(&state, user, "/upload") {
        Ok(username) => username,
        Err(response) => return response,
    };

    render_upload_form(&state, &username, StatusCode::OK, None)
}

/// POST /upload — ingest a multipart file upload into the upload directory.
pub async fn upload_submit_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Response {
    let username = match require_user_form(user, "/upload") {
        Ok(username) => username,
        Err(response) => return response,
    };

    let upload_dir = state.config().storage.upload_dir.clone();
    let max_file_size = state.config().storage.max_file_size_bytes;

    let upload = match ingest::ingest_file_field(&mut multipart, &upload_dir, max_file_size, &username).await
    {
        Ok(upload) => upload,
        Err(IngestError::NoFileField) => {
            return render_upload_form(
                &state,
                &username,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some("No file provided.".to_string()),
            );
        }
        Err(IngestError::EmptyFilename) => {
            return render_upload_form(
                &state,
                &username,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some("No file selected for upload.".to_string()),
            );
        }
        Err(IngestError::TooLarge { limit }) => {
            let limit_display = human_readable_size(limit);
            return render_upload_form(
                &state,
                &username,
                StatusCode::PAYLOAD_TOO_LARGE,
                Some(format!("Files must be {limit_display} or smaller.")),
            );
        }
        Err(IngestError::Multipart(err)) => {
            warn!(target: "upload", %err, "malformed multipart payload");
            return render_upload_form(
                &state,
                &username,
                StatusCode::BAD_REQUEST,
                Some("The upload form could not be processed. Please try again.".to_string()),
            );
        }
        Err(IngestError::Io(err)) => {
            error!(target: "upload", %err, "failed to persist uploaded file");
            return render_upload_form(
                &state,
                &username,
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("The file could not be saved. Please try again.".to_string()),
            );
        }
    };

    info!(
        target: "upload",
        username = %upload.owner,
        original_name = %upload.original_name,
        stored_name = %upload.stored_name,
        size_bytes = upload.size_bytes,
        "file uploaded successfully"
    );

    let layout = LayoutContext::new(&state, Some(username), "Upload successful");
    let size_display = human_readable_size(upload.size_bytes);
    HtmlTemplate::new(UploadSuccessTemplate::new(
        layout,
        upload.stored_name,
        size_display,
    ))
    .into_response()
}

fn render_upload_form(
    state: &AppState,
    username: &str,
    status: StatusCode,
    error_message: Option<String>,
) -> Response {
    let layout = LayoutContext::new(state, Some(username.to_string()), "Upload");
    let max_file_size_display = human_readable_size(state.config().storage.max_file_size_bytes);

    let mut template = UploadTemplate::new(layout, max_file_size_display);
    if let Some(message) = error_message {
        template = template.with_error_message(message);
    }

    HtmlTemplate::with_status(template, status).into_response()
}
