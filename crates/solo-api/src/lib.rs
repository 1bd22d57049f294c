//! Axum HTTP API server for the SoloSphere marketplace.
//!
//! This crate provides:
//! - Cookie-based session issuance and verification (signed JWT)
//! - The ownership gate protecting per-user bid queries
//! - REST routes over the job and bid repositories

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::{AuthUser, SessionKeys};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
