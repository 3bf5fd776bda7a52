//! Client Profile Model

use super::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Minimum password length at registration (mirrors the `RegisterRequest` rule)
pub const MIN_PASSWORD_LEN: u64 = 8;

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Client,
    Admin,
}

text_enum!(Role, "role", {
    Client => "client",
    Admin => "admin",
});

impl Role {
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Client profile (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ClientProfile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Free text: allergies, dietary preferences
    pub preferences: Option<String>,
    pub marketing_opt_in: bool,
    pub photo: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl ClientProfile {
    /// Enough contact information to place an order
    pub fn is_complete(&self) -> bool {
        filled(&self.first_name) && filled(&self.last_name) && filled(&self.phone)
    }

    /// Fields still required before ordering
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !filled(&self.first_name) {
            missing.push("first_name");
        }
        if !filled(&self.last_name) {
            missing.push("last_name");
        }
        if !filled(&self.phone) {
            missing.push("phone");
        }
        missing
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Profile edit payload (client edits their own profile)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 80))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub last_name: Option<String>,
    #[validate(length(min = 6, max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    #[validate(length(max = 2000))]
    pub preferences: Option<String>,
    pub marketing_opt_in: Option<bool>,
}

/// Admin role change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// Sign-up payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[serde(default)]
    pub marketing_opt_in: bool,
}

/// Sign-in payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session returned by sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub client: ClientProfile,
}
