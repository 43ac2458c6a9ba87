//! # vocabase-api
//!
//! HTTP API server for vocabase.
//!
//! Library portion of the server binary: configuration, auth, error
//! mapping, the response envelope, upload handling, and all route handlers.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod state;
pub mod upload;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;
