//! Cantine Client - ordering client for the Cantine API
//!
//! - [`HttpClient`]: typed calls to the server API
//! - [`CartStore`]: locally persisted cart
//! - [`Checkout`]: turns the cart into one order per pickup date-time

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod http;

pub use cart::{CartError, CartStore};
pub use checkout::{Checkout, CheckoutError, CheckoutOptions, CheckoutOutcome};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, OrderApi};

// Re-export shared types for convenience
pub use shared::cart::CartLine;
pub use shared::error::ApiResponse;
