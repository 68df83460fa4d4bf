use std::path::Path;

use axum::{extract::State, response::IntoResponse};
use tracing::error;

use crate::{
    app_state::AppState,
    guard::CurrentUser,
    templates::{HomeTemplate, HtmlTemplate, LayoutContext},
};

/// Render the application home page, personalized for authenticated callers
/// and listing the files already stored in the upload directory.
pub async fn home_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    let layout = LayoutContext::new(&state, user.clone(), "Home");
    let mut template = HomeTemplate::new(layout);

    if user.is_some() {
        match list_uploaded_files(&state.config().storage.upload_dir).await {
            Ok(uploads) => template = template.with_uploads(uploads),
            Err(err) => {
                error!(target: "files", %err, "failed to list uploaded files");
            }
        }
    }

    HtmlTemplate::new(template)
}

/// List the stored upload names, skipping in-flight temp files.
async fn list_uploaded_files(upload_dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(upload_dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        if name.ends_with(".uploading") {
            continue;
        }

        names.push(name.to_string());
    }

    names.sort();
    Ok(names)
}
