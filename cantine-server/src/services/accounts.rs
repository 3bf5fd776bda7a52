//! Sign-up and sign-in

use shared::error::{AppError, ErrorCode};
use shared::models::{AuthResponse, LoginRequest, RegisterRequest, Role};

use crate::auth::create_token;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn session(
    state: &AppState,
    client: shared::models::ClientProfile,
) -> ServiceResult<AuthResponse> {
    let (token, expires_at) = create_token(&client.id, &client.email, client.role, &state.jwt_secret)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to sign session token");
            AppError::new(ErrorCode::InternalError)
        })?;
    Ok(AuthResponse {
        token,
        expires_at,
        client,
    })
}

pub async fn register(state: &AppState, req: RegisterRequest) -> ServiceResult<AuthResponse> {
    let email = normalize_email(&req.email);
    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AppError::new(ErrorCode::InternalError)
    })?;
    let role = if state.config.admin_emails.contains(&email) {
        Role::Admin
    } else {
        Role::Client
    };

    let id = uuid::Uuid::new_v4().to_string();
    let client = db::clients::create(
        &state.pool,
        &id,
        &email,
        &password_hash,
        req.marketing_opt_in,
        role,
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::EmailAlreadyRegistered))?;

    tracing::info!(client_id = %client.id, role = %client.role, "Client registered");
    session(state, client)
}

pub async fn login(state: &AppState, req: LoginRequest) -> ServiceResult<AuthResponse> {
    let email = normalize_email(&req.email);
    let Some(credentials) = db::clients::credentials_by_email(&state.pool, &email).await? else {
        return Err(AppError::invalid_credentials().into());
    };
    if !verify_password(&req.password, &credentials.password_hash) {
        tracing::info!(target: "audit", client_id = %credentials.id, "Failed sign-in");
        return Err(AppError::invalid_credentials().into());
    }

    let client = db::clients::find(&state.pool, &credentials.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;
    tracing::info!(client_id = %client.id, "Client signed in");
    session(state, client)
}
