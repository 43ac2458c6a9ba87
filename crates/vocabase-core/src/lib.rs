//! # vocabase-core
//!
//! Core types, traits, and abstractions for the vocabase backend.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the database and API crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod policy;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use policy::{authorize, AuthContext};
pub use traits::*;
