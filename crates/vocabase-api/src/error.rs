//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`. Errors serialize to the
//! stable envelope `{ error: <kind>, message, details? }`; internals of
//! unexpected failures are logged but never leaked to clients.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::Value as JsonValue;
use tracing::error;

use vocabase_core::Error;

#[derive(Debug)]
pub enum ApiError {
    /// 400 with optional per-field details.
    Validation {
        message: String,
        details: Option<JsonValue>,
    },
    /// 401, uniform for bad/missing/expired credentials.
    InvalidCredential(String),
    /// 403, distinct from Forbidden so clients can prompt for reactivation.
    AccountDeactivated,
    /// 403.
    Forbidden(String),
    /// 404.
    NotFound(String),
    /// 409.
    Duplicate(String),
    /// 500; the inner error is logged, the client sees a generic message.
    Internal(Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// Validation failure with per-field messages.
    pub fn validation_fields(message: impl Into<String>, fields: Vec<(&str, String)>) -> Self {
        let details = fields
            .into_iter()
            .map(|(field, msg)| (field.to_string(), JsonValue::String(msg)))
            .collect::<serde_json::Map<_, _>>();
        ApiError::Validation {
            message: message.into(),
            details: Some(JsonValue::Object(details)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "ValidationError",
            ApiError::InvalidCredential(_) => "InvalidCredential",
            ApiError::AccountDeactivated => "AccountDeactivated",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::NotFound(_) => "ResourceNotFound",
            ApiError::Duplicate(_) => "Duplicate",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::validation(msg),
            Error::InvalidCredential(msg) => ApiError::InvalidCredential(msg),
            Error::AccountDeactivated => ApiError::AccountDeactivated,
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::VocabNotFound(id) => ApiError::NotFound(format!("Vocabulary {} not found", id)),
            Error::DocumentNotFound(id) => ApiError::NotFound(format!("Document {} not found", id)),
            Error::HighlightNotFound(id) => {
                ApiError::NotFound(format!("Highlight {} not found", id))
            }
            Error::Duplicate(msg) => ApiError::Duplicate(msg),
            err if err.is_unique_violation() => {
                ApiError::Duplicate("Resource already exists".to_string())
            }
            err => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let kind = self.kind();
        let (status, message, details) = match self {
            ApiError::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, message, details)
            }
            ApiError::InvalidCredential(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::AccountDeactivated => (
                StatusCode::FORBIDDEN,
                "Account is deactivated".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Duplicate(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Internal(err) => {
                error!(
                    subsystem = "api",
                    component = "error",
                    error = %err,
                    "Internal server error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = serde_json::json!({
            "error": kind,
            "message": message,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings_are_stable() {
        assert_eq!(ApiError::validation("x").kind(), "ValidationError");
        assert_eq!(
            ApiError::InvalidCredential("x".into()).kind(),
            "InvalidCredential"
        );
        assert_eq!(ApiError::AccountDeactivated.kind(), "AccountDeactivated");
        assert_eq!(ApiError::NotFound("x".into()).kind(), "ResourceNotFound");
        assert_eq!(ApiError::Duplicate("x".into()).kind(), "Duplicate");
    }

    #[test]
    fn test_core_not_found_variants_map_to_404_kind() {
        let id = uuid::Uuid::new_v4();
        for err in [
            Error::VocabNotFound(id),
            Error::DocumentNotFound(id),
            Error::HighlightNotFound(id),
            Error::NotFound("gone".into()),
        ] {
            assert_eq!(ApiError::from(err).kind(), "ResourceNotFound");
        }
    }

    #[test]
    fn test_unexpected_error_becomes_internal() {
        let err = ApiError::from(Error::Internal("secret detail".into()));
        assert_eq!(err.kind(), "InternalError");
    }

    #[test]
    fn test_validation_fields_builds_details_object() {
        let err = ApiError::validation_fields(
            "Validation failed",
            vec![("word", "required".to_string())],
        );
        match err {
            ApiError::Validation {
                details: Some(details),
                ..
            } => assert_eq!(details["word"], "required"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
