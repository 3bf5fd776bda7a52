//! Service-layer error type
//!
//! `ServiceError` sits between infrastructure failures (`sqlx::Error`, AWS SDK,
//! HTTP clients) and the API-layer `AppError`, so service code can use `?`
//! on both without mapping at every call site.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// - `Db`: infrastructure errors, logged and mapped to `InternalError`
/// - `App`: business-rule errors, passed through to the client
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service infrastructure error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_errors_pass_through() {
        let err: AppError = ServiceError::from(AppError::not_found("Commande 7")).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn infrastructure_errors_become_internal() {
        let boxed: BoxError = "connection reset".into();
        let err: AppError = ServiceError::from(boxed).into();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert!(!err.message.contains("connection reset"));
    }
}
