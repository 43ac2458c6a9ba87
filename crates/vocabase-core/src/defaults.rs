//! Centralized default constants for the vocabase system.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for the vocab listing.
pub const VOCAB_PAGE_LIMIT: i64 = 20;

/// Default page size for highlight listings.
pub const HIGHLIGHT_PAGE_LIMIT: i64 = 50;

/// Default page size for document and user listings.
pub const PAGE_LIMIT_SMALL: i64 = 10;

/// Hard cap applied to every listing endpoint's `limit` parameter.
pub const MAX_PAGE_LIMIT: i64 = 200;

// =============================================================================
// FIELD LENGTH LIMITS
// =============================================================================

/// Maximum characters for a vocab word.
pub const MAX_WORD_LEN: usize = 100;

/// Maximum characters for a vocab meaning.
pub const MAX_MEANING_LEN: usize = 1000;

/// Maximum characters per tag.
pub const MAX_TAG_LEN: usize = 30;

/// Maximum characters per example sentence.
pub const MAX_EXAMPLE_LEN: usize = 500;

/// Maximum characters for a highlight comment.
pub const MAX_COMMENT_LEN: usize = 1000;

/// Maximum characters for a comment emoji marker.
pub const MAX_EMOJI_LEN: usize = 10;

/// Maximum characters for a highlight source tag.
pub const MAX_SOURCE_TAG_LEN: usize = 50;

/// Maximum characters for an uploaded file name.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Minimum characters for an account password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum characters for first/last name.
pub const MAX_NAME_LEN: usize = 50;

// =============================================================================
// TOKENS
// =============================================================================

/// Default access-token lifetime in seconds (15 minutes).
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Default refresh-token lifetime in seconds (7 days).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

// =============================================================================
// UPLOADS
// =============================================================================

/// Default maximum upload size in bytes (20 MB).
pub const UPLOAD_MAX_BYTES: usize = 20 * 1024 * 1024;

/// Default allowed upload content types.
pub const UPLOAD_ALLOWED_TYPES: &[&str] = &["application/pdf"];
