//! Repository traits for vocabase abstractions.
//!
//! These traits define the store interfaces the HTTP layer talks to,
//! enabling pluggable backends and testability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// PAGINATION
// =============================================================================

/// Page-number pagination shared by every listing operation.
///
/// `page` is 1-based; `limit` is clamped by the caller against the endpoint's
/// maximum before it reaches the repository.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Build a page request from raw query values, defaulting and clamping.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// A page of results plus the total count across all pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    /// Number of pages needed to cover `total` at the page's limit.
    pub fn pages(&self) -> i64 {
        if self.limit <= 0 {
            return 0;
        }
        (self.total + self.limit - 1) / self.limit
    }
}

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Request for creating a user. The password is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Partial profile update. `email` and `role` are honored only on the admin
/// path; the handler strips them for self-service updates.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Filters for the admin user listing.
#[derive(Debug, Clone, Default)]
pub struct ListUsersRequest {
    /// Case-insensitive substring match over email.
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Repository for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Duplicate` when the email (compared
    /// case-insensitively) is already registered.
    async fn insert(&self, req: CreateUserRequest) -> Result<User>;

    /// Case-insensitive email lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Apply a partial profile update and return the fresh record.
    async fn update(&self, id: Uuid, req: UpdateUserRequest) -> Result<User>;

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()>;

    /// Soft delete via the active flag.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<()>;

    /// Hard delete, cascading to owned vocabs, documents, and highlights.
    async fn delete_cascade(&self, id: Uuid) -> Result<()>;

    async fn list(&self, req: ListUsersRequest, page: PageRequest) -> Result<Page<UserPublic>>;

    /// Cross-resource counts for one account. `NotFound` when the user does
    /// not exist.
    async fn stats(&self, id: Uuid) -> Result<UserStats>;
}

// =============================================================================
// DOCUMENT REPOSITORY
// =============================================================================

/// Filters for the owner-scoped document listing.
#[derive(Debug, Clone, Default)]
pub struct ListDocumentsRequest {
    /// Case-insensitive substring match over file name.
    pub search: Option<String>,
}

/// Repository for document metadata.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Import a document: return the existing record for this (owner, hash)
    /// pair when present, otherwise create a new one. Never errors on a
    /// duplicate; `is_existing` tells the caller which path was taken.
    async fn import(&self, user_id: Uuid, file_hash: &str, file_name: &str)
        -> Result<ImportOutcome>;

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Document>>;

    /// Batch lookup used by the vocab soft join. Only documents owned by
    /// `user_id` are returned; unknown ids are silently skipped.
    async fn find_refs(&self, ids: &[Uuid], user_id: Uuid) -> Result<Vec<DocumentRef>>;

    async fn list(
        &self,
        user_id: Uuid,
        req: ListDocumentsRequest,
        page: PageRequest,
    ) -> Result<Page<Document>>;

    /// Delete a document and, in the same transaction, every vocab entry
    /// sourced from it and every highlight referencing it.
    async fn delete_cascade(&self, id: Uuid, user_id: Uuid) -> Result<()>;

    /// Same cascade, addressed by `(file_hash, owner)` for the admin path.
    async fn delete_cascade_by_hash(&self, file_hash: &str, user_id: Uuid) -> Result<()>;

    async fn stats(&self, user_id: Uuid, timeframe: Timeframe) -> Result<DocumentStats>;

    /// Per-user roll-up across all owners, sorted by document count descending.
    async fn overview(&self) -> Result<Vec<UserDocumentOverview>>;
}

// =============================================================================
// VOCABULARY REPOSITORY
// =============================================================================

/// Request for creating a vocabulary entry.
#[derive(Debug, Clone)]
pub struct CreateVocabRequest {
    pub word: String,
    pub meaning: String,
    pub pronunciation_url: Option<String>,
    pub tags: Vec<String>,
    pub source: Option<String>,
    pub source_type: SourceKind,
    pub examples: Vec<String>,
}

/// Partial vocab update. Only meaning, pronunciation, tags, and examples are
/// mutable after creation; the word itself is not.
#[derive(Debug, Clone, Default)]
pub struct UpdateVocabRequest {
    pub meaning: Option<String>,
    pub pronunciation_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub examples: Option<Vec<String>>,
}

/// Filters for the owner-scoped vocab listing.
#[derive(Debug, Clone, Default)]
pub struct ListVocabsRequest {
    /// Case-insensitive substring match over word and meaning.
    pub search: Option<String>,
    /// Any-of tag filter.
    pub tags: Option<Vec<String>>,
    pub source: Option<String>,
}

/// Repository for vocabulary entries.
#[async_trait]
pub trait VocabRepository: Send + Sync {
    async fn insert(&self, user_id: Uuid, req: CreateVocabRequest) -> Result<Vocabulary>;

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Vocabulary>>;

    async fn list(
        &self,
        user_id: Uuid,
        req: ListVocabsRequest,
        page: PageRequest,
    ) -> Result<Page<Vocabulary>>;

    async fn update(&self, id: Uuid, user_id: Uuid, req: UpdateVocabRequest)
        -> Result<Vocabulary>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()>;

    /// Admin delete, unscoped by owner.
    async fn delete_any(&self, id: Uuid) -> Result<()>;

    /// Append `{date: now, correct}` to the review history and return the
    /// updated entry. The history is unbounded by design.
    async fn add_review(&self, id: Uuid, user_id: Uuid, correct: bool) -> Result<Vocabulary>;

    async fn stats(&self, user_id: Uuid, timeframe: Timeframe) -> Result<VocabStats>;

    /// Per-user roll-up across all owners, sorted by entry count descending.
    async fn overview(&self) -> Result<Vec<UserVocabOverview>>;
}

// =============================================================================
// HIGHLIGHT REPOSITORY
// =============================================================================

/// Request for creating a highlight.
#[derive(Debug, Clone)]
pub struct CreateHighlightRequest {
    pub vocab_id: Uuid,
    pub document_id: Uuid,
    /// Must match the stored hash of `document_id`; a stale client hash is
    /// rejected as not-found.
    pub file_hash: String,
    pub text: String,
    pub position: HighlightPosition,
    pub comment: HighlightComment,
    pub tags: Vec<String>,
    pub source_tag: Option<String>,
}

/// Partial highlight update. `updated_at` is refreshed even when the payload
/// is empty.
#[derive(Debug, Clone, Default)]
pub struct UpdateHighlightRequest {
    pub text: Option<String>,
    pub comment: Option<HighlightComment>,
    pub tags: Option<Vec<String>>,
    pub source_tag: Option<String>,
}

/// Owner-scoped highlight listing selector.
#[derive(Debug, Clone)]
pub enum HighlightScope {
    Document(Uuid),
    FileHash(String),
    /// Free-text search across all of the owner's highlights.
    All,
}

/// Filters shared by the highlight listings.
#[derive(Debug, Clone, Default)]
pub struct ListHighlightsRequest {
    /// Case-insensitive substring match over the highlighted text.
    pub search: Option<String>,
    /// Any-of tag filter.
    pub tags: Option<Vec<String>>,
}

/// Repository for highlights.
#[async_trait]
pub trait HighlightRepository: Send + Sync {
    /// Create a highlight after verifying that the vocab and the document
    /// exist, belong to `user_id`, and that the document's stored hash equals
    /// `req.file_hash`. Any mismatch is `NotFound` (existence is not leaked).
    async fn create(&self, user_id: Uuid, req: CreateHighlightRequest) -> Result<Highlight>;

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Highlight>>;

    async fn list(
        &self,
        user_id: Uuid,
        scope: HighlightScope,
        req: ListHighlightsRequest,
        page: PageRequest,
    ) -> Result<Page<Highlight>>;

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        req: UpdateHighlightRequest,
    ) -> Result<Highlight>;

    /// Owner-scoped hard delete. Never touches the linked vocabulary.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()>;
}

/// Timestamp helper shared by repositories; isolated for test override.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults_and_clamps() {
        let p = PageRequest::new(None, None, 20, 200);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 20);

        let p = PageRequest::new(Some(0), Some(1000), 20, 200);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 200);

        let p = PageRequest::new(Some(3), Some(50), 20, 200);
        assert_eq!(p.offset(), 100);
    }

    #[test]
    fn test_page_count_rounds_up() {
        let page = Page::<i32> {
            items: vec![],
            total: 101,
            page: 1,
            limit: 20,
        };
        assert_eq!(page.pages(), 6);

        let empty = Page::<i32> {
            items: vec![],
            total: 0,
            page: 1,
            limit: 20,
        };
        assert_eq!(empty.pages(), 0);
    }
}
