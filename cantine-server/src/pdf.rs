//! HTML to PDF through the external rendering service

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use std::time::Duration;

use crate::error::BoxError;

#[derive(Serialize)]
struct RenderRequest<'a> {
    html: &'a str,
}

#[derive(Clone)]
pub struct PdfRenderer {
    client: reqwest::Client,
    url: Option<String>,
}

impl PdfRenderer {
    pub fn new(url: Option<String>) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, url })
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// POST `{ "html": … }`; the response body is the PDF
    pub async fn render(&self, html: &str) -> Result<Vec<u8>, AppError> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| AppError::service_disabled("PDF rendering"))?;

        let response = self
            .client
            .post(url)
            .json(&RenderRequest { html })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "PDF service unreachable");
                AppError::new(ErrorCode::DocumentRenderFailed)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "PDF service returned an error");
            return Err(AppError::new(ErrorCode::DocumentRenderFailed));
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "PDF response body unreadable");
            AppError::new(ErrorCode::DocumentRenderFailed)
        })?;
        if bytes.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::DocumentRenderFailed,
                "PDF service returned an empty document",
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_renderer_reports_service_disabled() {
        let renderer = PdfRenderer::new(None).unwrap();
        assert!(!renderer.is_enabled());
        let err = renderer.render("<html></html>").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceDisabled);
    }

    #[tokio::test]
    async fn unreachable_service_is_a_render_failure() {
        // port 9 (discard) on localhost is not expected to speak HTTP
        let renderer = PdfRenderer::new(Some("http://127.0.0.1:9/render".into())).unwrap();
        let err = renderer.render("<html></html>").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DocumentRenderFailed);
    }
}
