//! Client JWT authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::Role;

use crate::state::AppState;

/// JWT claims for a client session
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientClaims {
    /// Client ID
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated client extracted from the bearer token
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub client_id: String,
    pub email: String,
    pub role: Role,
}

impl ClientIdentity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a session token; returns the token and its expiry
pub fn create_token(
    client_id: &str,
    email: &str,
    role: Role,
    secret: &str,
) -> Result<(String, DateTime<Utc>), jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::hours(JWT_EXPIRY_HOURS);
    let claims = ClientClaims {
        sub: client_id.to_string(),
        email: email.to_string(),
        role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, expires_at))
}

pub fn verify_token(token: &str, secret: &str) -> Result<ClientIdentity, AppError> {
    let data = jsonwebtoken::decode::<ClientClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::new(ErrorCode::TokenExpired),
            _ => AppError::new(ErrorCode::TokenInvalid),
        }
    })?;

    Ok(ClientIdentity {
        client_id: data.claims.sub,
        email: data.claims.email,
        role: data.claims.role,
    })
}

/// Verifies the bearer token and stores a `ClientIdentity` in request extensions
pub async fn client_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;

    let identity = verify_token(token, &state.jwt_secret)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Runs after `client_auth_middleware`; rejects non-admin sessions
pub async fn admin_guard(request: Request, next: Next) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<ClientIdentity>()
        .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated))?;
    if !identity.is_admin() {
        return Err(AppError::admin_required());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_keeps_role() {
        let (token, expires_at) = create_token("c-1", "a@b.fr", Role::Admin, "secret").unwrap();
        assert!(expires_at > Utc::now() + chrono::Duration::hours(23));

        let identity = verify_token(&token, "secret").unwrap();
        assert_eq!(identity.client_id, "c-1");
        assert_eq!(identity.email, "a@b.fr");
        assert!(identity.is_admin());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let (token, _) = create_token("c-1", "a@b.fr", Role::Client, "secret").unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let past = (Utc::now() - chrono::Duration::hours(2)).timestamp() as usize;
        let claims = ClientClaims {
            sub: "c-1".into(),
            email: "a@b.fr".into(),
            role: Role::Client,
            exp: past,
            iat: past - 60,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let err = verify_token(&token, "secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }
}
