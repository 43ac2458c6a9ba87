//! Error types for vocabase.

use thiserror::Error;

/// Result type alias using vocabase's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vocabase operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Vocabulary entry not found
    #[error("Vocabulary not found: {0}")]
    VocabNotFound(uuid::Uuid),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(uuid::Uuid),

    /// Highlight not found
    #[error("Highlight not found: {0}")]
    HighlightNotFound(uuid::Uuid),

    /// Input failed validation at the boundary
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, malformed, or expired credential, or wrong email/password
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Account exists but has been deactivated
    #[error("Account deactivated")]
    AccountDeactivated,

    /// Authenticated but not authorized (role or ownership)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unique-constraint violation or re-creation of an existing resource
    #[error("Duplicate resource: {0}")]
    Duplicate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Internal(e.to_string())
    }
}

impl Error {
    /// True when the underlying sqlx error is a unique-constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("document abc".to_string());
        assert_eq!(err.to_string(), "Not found: document abc");
    }

    #[test]
    fn test_error_display_vocab_not_found() {
        let id = Uuid::nil();
        let err = Error::VocabNotFound(id);
        assert_eq!(err.to_string(), format!("Vocabulary not found: {}", id));
    }

    #[test]
    fn test_error_display_invalid_credential() {
        let err = Error::InvalidCredential("Invalid email or password".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid credential: Invalid email or password"
        );
    }

    #[test]
    fn test_error_display_account_deactivated() {
        assert_eq!(Error::AccountDeactivated.to_string(), "Account deactivated");
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("admin role required".to_string());
        assert_eq!(err.to_string(), "Forbidden: admin role required");
    }

    #[test]
    fn test_error_display_duplicate() {
        let err = Error::Duplicate("email already registered".to_string());
        assert_eq!(err.to_string(), "Duplicate resource: email already registered");
    }

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("word must not be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: word must not be empty");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_highlight_not_found_with_random_uuid() {
        let id = Uuid::new_v4();
        let err = Error::HighlightNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::NotFound("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("NotFound"));
    }
}
