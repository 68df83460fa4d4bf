use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, Multipart, MultipartError};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

/// A successfully ingested upload. Immutable once returned; the stored path is
/// always inside the configured upload directory.
#[derive(Debug)]
pub struct StoredUpload {
    pub original_name: String,
    pub stored_name: String,
    pub stored_path: PathBuf,
    pub size_bytes: u64,
    pub owner: String,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("multipart body contains no file field")]
    NoFileField,
    #[error("no file was selected for upload")]
    EmptyFilename,
    #[error("file exceeds the {limit} byte upload limit")]
    TooLarge { limit: u64 },
    #[error("failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("failed to persist uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

/// Walk a `multipart/form-data` body and persist the part named `file` into
/// `upload_dir`. The filename is reduced to its base name before any path is
/// built, so a traversal attempt like `../../etc/passwd` lands as `passwd`
/// inside the upload directory. An existing file of the same name is
/// overwritten; last write wins.
pub async fn ingest_file_field(
    multipart: &mut Multipart,
    upload_dir: &Path,
    max_file_size: u64,
    owner: &str,
) -> Result<StoredUpload, IngestError> {
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|name| name.to_string());
        match field_name.as_deref() {
            Some("file") => {
                return persist_file_part(field, upload_dir, max_file_size, owner).await;
            }
            _ => {
                // Drain unrelated fields so the body stays parseable.
                if let Err(err) = field.text().await {
                    debug!(
                        target: "upload",
                        field = field_name.as_deref().unwrap_or(""),
                        %err,
                        "discarding unexpected multipart field"
                    );
                }
            }
        }
    }

    Err(IngestError::NoFileField)
}

async fn persist_file_part(
    mut field: Field<'_>,
    upload_dir: &Path,
    max_file_size: u64,
    owner: &str,
) -> Result<StoredUpload, IngestError> {
    let original_name = match field.file_name().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(IngestError::EmptyFilename),
    };

    let Some(stored_name) = sanitize_filename(&original_name) else {
        return Err(IngestError::EmptyFilename);
    };

    fs::create_dir_all(upload_dir).await?;

    // Unique per-request temp name: concurrent uploads of the same filename
    // must not stream into the same file before the rename.
    let temp_path = upload_dir.join(format!(".{}.uploading", nanoid::nanoid!()));
    let final_path = upload_dir.join(&stored_name);

    let mut file = fs::File::create(&temp_path).await?;
    let mut bytes_written: u64 = 0;

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) => {
                drop(file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(IngestError::Multipart(err));
            }
        };

        bytes_written = bytes_written.saturating_add(chunk.len() as u64);
        if bytes_written > max_file_size {
            drop(file);
            let _ = fs::remove_file(&temp_path).await;
            return Err(IngestError::TooLarge {
                limit: max_file_size,
            });
        }

        if let Err(err) = file.write_all(&chunk).await {
            drop(file);
            let _ = fs::remove_file(&temp_path).await;
            return Err(IngestError::Io(err));
        }
    }

    if let Err(err) = file.flush().await {
        drop(file);
        let _ = fs::remove_file(&temp_path).await;
        return Err(IngestError::Io(err));
    }
    drop(file);

    if let Err(err) = fs::rename(&temp_path, &final_path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(IngestError::Io(err));
    }

    Ok(StoredUpload {
        original_name,
        stored_name,
        stored_path: final_path,
        size_bytes: bytes_written,
        owner: owner.to_string(),
    })
}

/// Reduce a client-supplied filename to a filesystem-safe base name. Returns
/// `None` when nothing usable remains (empty input, bare `..`, control
/// characters only).
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = Path::new(trimmed)
        .file_name()
        .and_then(|segment| segment.to_str())?;

    let cleaned: String = candidate.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }

    Some(cleaned.chars().take(255).collect())
}
