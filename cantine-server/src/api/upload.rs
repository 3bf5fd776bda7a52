//! Multipart file extraction

use axum::extract::Multipart;
use shared::error::{AppError, ErrorCode};
use shared::models::MediaKind;

use crate::state::AppState;
use crate::storage::process_image;

/// Uploaded file: original name and raw bytes
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Read the `file` field (or an unnamed field) from a multipart body
pub async fn read_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
    })? {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") {
            let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let data = field
                .bytes()
                .await
                .map_err(|e| {
                    AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
                })?
                .to_vec();
            return Ok(UploadedFile { filename, data });
        }
    }
    Err(AppError::new(ErrorCode::NoFileProvided))
}

/// Stored image: object key and public URL
pub struct StoredImage {
    pub key: String,
    pub url: String,
}

/// Multipart upload → validate → JPEG → SHA-256 → object storage
pub async fn store_image(
    state: &AppState,
    kind: MediaKind,
    multipart: Multipart,
) -> Result<StoredImage, AppError> {
    let file = read_file(multipart).await?;
    let image = process_image(&file.filename, &file.data)?;
    let hash = image.hash.clone();

    let key = state.storage.put_image(kind, image).await.map_err(|e| {
        tracing::error!(hash = %hash, error = %e, "Object storage upload failed");
        AppError::new(ErrorCode::FileStorageFailed)
    })?;
    let url = state.storage.public_url(&key);
    tracing::info!(kind = %kind, key = %key, "Image uploaded");
    Ok(StoredImage { key, url })
}
