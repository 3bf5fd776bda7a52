//! Client error types

use shared::error::ErrorCode;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error envelope returned by the server
    #[error("API error {code} ({status}): {message}")]
    Api {
        status: u16,
        code: u16,
        message: String,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Server error code, when the server answered with an error envelope
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => ErrorCode::try_from(*code).ok(),
            _ => None,
        }
    }

    /// Missing, expired or rejected session
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::NotAuthenticated | ErrorCode::TokenExpired | ErrorCode::TokenInvalid)
        )
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api(code: u16) -> ClientError {
        ClientError::Api {
            status: 401,
            code,
            message: "nope".into(),
        }
    }

    #[test]
    fn decodes_known_codes() {
        assert_eq!(api(1003).code(), Some(ErrorCode::TokenExpired));
        assert!(api(1003).is_unauthenticated());
        assert!(!api(4001).is_unauthenticated());
        assert_eq!(api(65000).code(), None);
        assert_eq!(ClientError::InvalidResponse("x".into()).code(), None);
    }
}
