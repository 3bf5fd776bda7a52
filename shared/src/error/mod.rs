//! Unified error system for Cantine
//!
//! - [`ErrorCode`]: numeric codes shared by server and client
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: code + message + structured details
//! - [`ApiResponse`]: JSON envelope returned by every endpoint
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Client profile errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog and media errors
//! - 7xxx: Event request errors
//! - 8xxx: Document errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::DishNotFound);
//! let err = AppError::validation("Quantity must be positive").with_detail("field", "quantity");
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(2));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
