//! Object storage for uploaded pictures
//!
//! Every upload is re-encoded to JPEG and stored under a content hash:
//! `{prefix}/{sha256}.jpg`. Identical pictures share one object.

use aws_config::SdkConfig;
use aws_sdk_s3::Client as S3Client;
use image::codecs::jpeg::JpegEncoder;
use sha2::{Digest, Sha256};
use shared::error::{AppError, ErrorCode};
use shared::models::MediaKind;
use std::io::Cursor;

use crate::config::StorageConfig;
use crate::error::BoxError;

/// Maximum upload size (20MB)
pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

const JPEG_QUALITY: u8 = 85;

const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// S3 bucket handle
#[derive(Clone)]
pub struct Storage {
    pub client: S3Client,
    pub bucket: String,
    public_base_url: String,
}

impl Storage {
    pub fn new(sdk: &SdkConfig, config: &StorageConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk)
            .region(aws_config::Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            builder = builder.credentials_provider(aws_credential_types::Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "cantine-static",
            ));
        }

        let public_base_url = match (&config.public_base_url, &config.endpoint) {
            (Some(base), _) => base.trim_end_matches('/').to_string(),
            (None, Some(endpoint)) => {
                format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket)
            }
            (None, None) => format!(
                "https://{}.s3.{}.amazonaws.com",
                config.bucket, config.region
            ),
        };

        Self {
            client: S3Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url,
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    /// Upload a processed picture; same content maps to the same key.
    pub async fn put_image(&self, kind: MediaKind, image: ProcessedImage) -> Result<String, BoxError> {
        let key = image_key(kind, &image.hash);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(image.bytes.into())
            .content_type("image/jpeg")
            .send()
            .await?;
        tracing::info!(key = %key, "Image uploaded to S3");
        Ok(key)
    }

    pub async fn delete(&self, key: &str) -> Result<(), BoxError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }
}

pub fn image_key(kind: MediaKind, hash: &str) -> String {
    format!("{}/{hash}.jpg", kind.key_prefix())
}

/// JPEG bytes ready for upload
#[derive(Debug)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`
    pub hash: String,
}

/// Validate an upload and re-encode it as JPEG
pub fn process_image(filename: &str, data: &[u8]) -> Result<ProcessedImage, AppError> {
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large: {} bytes (max {MAX_FILE_SIZE})", data.len()),
        ));
    }

    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Unsupported format: {ext}. Supported: png, jpg, jpeg, webp"),
        ));
    }

    let img = image::load_from_memory(data).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
    })?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        img.to_rgb8().write_with_encoder(encoder).map_err(|e| {
            AppError::with_message(
                ErrorCode::InternalError,
                format!("Image compression failed: {e}"),
            )
        })?;
    }

    let hash = hex::encode(Sha256::digest(&buffer));
    Ok(ProcessedImage {
        bytes: buffer,
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb};

    fn png_bytes() -> Vec<u8> {
        let img = ImageBuffer::from_pixel(4, 4, Rgb([200u8, 40, 40]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn png_is_reencoded_as_jpeg() {
        let processed = process_image("photo.PNG", &png_bytes()).unwrap();
        assert_eq!(&processed.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(processed.hash.len(), 64);

        let again = process_image("other.png", &png_bytes()).unwrap();
        assert_eq!(processed.hash, again.hash);
    }

    #[test]
    fn rejects_bad_uploads() {
        assert_eq!(
            process_image("a.png", &[]).unwrap_err().code,
            ErrorCode::EmptyFile
        );
        assert_eq!(
            process_image("a.gif", &png_bytes()).unwrap_err().code,
            ErrorCode::UnsupportedFileFormat
        );
        assert_eq!(
            process_image("a.jpg", b"definitely not a jpeg").unwrap_err().code,
            ErrorCode::InvalidImageFile
        );
        let huge = vec![0u8; MAX_FILE_SIZE + 1];
        assert_eq!(
            process_image("a.jpg", &huge).unwrap_err().code,
            ErrorCode::FileTooLarge
        );
    }

    #[test]
    fn keys_are_grouped_by_kind() {
        assert_eq!(image_key(MediaKind::Carousel, "ab"), "carousel/ab.jpg");
        assert_eq!(image_key(MediaKind::DishPhoto, "cd"), "dishes/cd.jpg");
    }
}
