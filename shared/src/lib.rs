//! Shared types for Cantine
//!
//! Domain models, error codes and the pure business rules used by both
//! the server and the ordering client: cart grouping, dish availability,
//! order/event lifecycles, money formatting and document rendering.

pub mod cart;
pub mod document;
pub mod error;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
