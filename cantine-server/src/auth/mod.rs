//! Session boundary: client JWTs, admin guard, rate limiting

pub mod client_auth;
pub mod rate_limit;

pub use client_auth::{ClientIdentity, admin_guard, client_auth_middleware, create_token};
pub use rate_limit::RateLimiter;
