//! cantine-server: restaurant ordering and back-office API
//!
//! - Public catalog, carousel and option lists
//! - Client accounts, orders (one per pickup date-time) and event requests
//! - Admin dashboard: orders, clients, dishes, documents, options, media
//! - Outbound boundaries: S3 media, SES email, automation webhook, PDF service

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod logger;
pub mod pdf;
pub mod services;
pub mod state;
pub mod storage;
pub mod util;
pub mod webhook;

pub use api::create_router;
pub use config::Config;
pub use state::AppState;
