//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    /// Human-readable message, shown to the client as-is
    pub message: String,
    /// Optional structured context (field errors, ids, current status)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Generic not found, tagged with the resource name
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn admin_required() -> Self {
        Self::new(ErrorCode::AdminRequired)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    pub fn already_exists(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::AlreadyExists, format!("{} already exists", r))
            .with_detail("resource", r)
    }

    /// Integration (email, webhook, PDF, storage) is not configured
    pub fn service_disabled(service: &str) -> Self {
        Self::with_message(
            ErrorCode::ServiceDisabled,
            format!("{service} is not configured"),
        )
        .with_detail("service", service)
    }

    /// Status change refused by a lifecycle state machine
    pub fn invalid_transition(code: ErrorCode, from: &str, to: &str) -> Self {
        Self::with_message(code, format!("Cannot change status from {from} to {to}"))
            .with_detail("from", from)
            .with_detail("to", to)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut err = AppError::new(ErrorCode::ValidationFailed);
        for (field, field_errors) in errors.field_errors() {
            let codes: Vec<String> = field_errors.iter().map(|e| e.code.to_string()).collect();
            err = err.with_detail(field.to_string(), codes);
        }
        err
    }
}

/// Unified API response envelope
///
/// `code` is 0 on success. On failure `details` carries the error context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: None,
            details: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

impl<T> ApiResponse<T> {
    /// Rebuild an [`AppError`] from an error envelope received over HTTP
    pub fn into_error(self) -> Option<AppError> {
        let code = self.code.filter(|c| *c != 0)?;
        let code = ErrorCode::try_from(code).unwrap_or(ErrorCode::Unknown);
        Some(AppError {
            code,
            message: self.message,
            details: self.details,
        })
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::OrderNotFound);
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        assert_eq!(err.message, "Order not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("field", "phone")
            .with_detail("reason", "required");

        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "phone");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_convenience_constructors() {
        let err = AppError::not_found("Dish");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Dish not found");
        assert!(err.details.as_ref().unwrap().contains_key("resource"));

        let err = AppError::service_disabled("PDF rendering");
        assert_eq!(err.code, ErrorCode::ServiceDisabled);
        assert_eq!(err.http_status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = AppError::invalid_transition(
            ErrorCode::OrderInvalidTransition,
            "picked_up",
            "pending",
        );
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert_eq!(err.details.unwrap().get("from").unwrap(), "picked_up");
    }

    #[test]
    fn test_from_validation_errors() {
        #[derive(Validate)]
        struct Signup {
            #[validate(email)]
            email: String,
        }

        let errors = Signup {
            email: "nope".into(),
        }
        .validate()
        .unwrap_err();
        let err = AppError::from(errors);
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.details.unwrap().contains_key("email"));
    }

    #[test]
    fn test_api_response_error_roundtrip() {
        let err = AppError::new(ErrorCode::ProfileIncomplete).with_detail("field", "phone");
        let response = ApiResponse::<()>::error(&err);
        assert_eq!(response.code, Some(3002));

        let json = serde_json::to_string(&response).unwrap();
        let parsed: ApiResponse<()> = serde_json::from_str(&json).unwrap();
        let back = parsed.into_error().unwrap();
        assert_eq!(back.code, ErrorCode::ProfileIncomplete);
        assert_eq!(back.message, err.message);
    }

    #[test]
    fn test_success_envelope_is_not_an_error() {
        let response = ApiResponse::success(42);
        assert_eq!(response.code, Some(0));
        assert!(response.into_error().is_none());

        let json = serde_json::to_string(&ApiResponse::<()>::ok()).unwrap();
        assert_eq!(json, r#"{"code":0,"message":"OK"}"#);
    }
}
