//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ClientNotFound
            | Self::OrderNotFound
            | Self::DishNotFound
            | Self::OptionNotFound
            | Self::MediaNotFound
            | Self::EventRequestNotFound
            | Self::DocumentNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::EmailAlreadyRegistered
            | Self::OptionValueExists
            | Self::OrderInvalidTransition
            | Self::OrderNotCancellable
            | Self::OrderIdempotencyMismatch
            | Self::PaymentInvalidTransition
            | Self::EventInvalidTransition => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::AdminRequired | Self::CannotModifySelf => {
                StatusCode::FORBIDDEN
            }

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 429 Too Many Requests
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            // 422 Unprocessable (business rules on well-formed input)
            Self::ProfileIncomplete | Self::DishUnavailable => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient or unconfigured integrations)
            Self::NetworkError | Self::TimeoutError | Self::ServiceDisabled => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 502 Bad Gateway (upstream renderer failed)
            Self::DocumentRenderFailed => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
