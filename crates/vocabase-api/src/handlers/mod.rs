//! HTTP route handlers.

pub mod auth;
pub mod documents;
pub mod highlights;
pub mod users;
pub mod vocabs;
