//! Success response envelope.
//!
//! All endpoints answer `{ success, data?, message?, pagination? }`, with
//! pagination as `{ page, limit, total, pages }` on list responses.

use serde::Serialize;
use vocabase_core::Page;

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            pagination: None,
        }
    }

    /// Build a list response from a repository page.
    pub fn paginated(page: Page<T>) -> ApiResponse<Vec<T>> {
        let pagination = Pagination {
            page: page.page,
            limit: page.limit,
            total: page.total,
            pages: page.pages(),
        };
        ApiResponse {
            success: true,
            data: Some(page.items),
            message: None,
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// Success with a message and no payload.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 1);
        assert!(json.get("message").is_none());
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn test_paginated_carries_page_math() {
        let page = Page {
            items: vec!["a", "b"],
            total: 41,
            page: 2,
            limit: 20,
        };
        let json = serde_json::to_value(ApiResponse::paginated(page)).unwrap();
        assert_eq!(json["pagination"]["pages"], 3);
        assert_eq!(json["pagination"]["page"], 2);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_message_only_has_no_data() {
        let json = serde_json::to_value(ApiResponse::message_only("done")).unwrap();
        assert_eq!(json["message"], "done");
        assert!(json.get("data").is_none());
    }
}
