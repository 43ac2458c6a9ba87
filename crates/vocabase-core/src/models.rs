//! Core data models for vocabase.
//!
//! These types are shared across all vocabase crates and represent the
//! domain entities plus the wire shapes the HTTP layer serializes. Field
//! casing follows the established client contract (camelCase for user
//! profile fields and the highlight position, snake_case elsewhere).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

// =============================================================================
// USER TYPES
// =============================================================================

/// Account role. Admins may read and mutate resources of any owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parse from the stored text column. Unknown values fall back to `User`
    /// so a bad row can never grant admin rights.
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full user record including the password hash. Never serialized to clients;
/// convert to [`UserPublic`] at the boundary.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Client-facing view of a user (no credential material).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub role: Role,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

/// Cross-resource roll-up for one account: entry counts plus the signup date.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    #[serde(rename = "totalVocabulary")]
    pub total_vocabulary: i64,
    #[serde(rename = "totalDocuments")]
    pub total_documents: i64,
    #[serde(rename = "totalHighlights")]
    pub total_highlights: i64,
    #[serde(rename = "joinedDate")]
    pub joined_date: DateTime<Utc>,
}

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// Metadata for an uploaded file. The bytes themselves live on disk under a
/// content-addressed path; this record only carries the digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 hex digest of the file bytes, used for per-owner dedup.
    pub file_hash: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a document import: either a freshly created record or the
/// pre-existing one for the same (owner, hash) pair.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub document: Document,
    #[serde(rename = "isExisting")]
    pub is_existing: bool,
    pub message: String,
}

/// Time-windowed document statistics.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStats {
    #[serde(rename = "totalDocuments")]
    pub total_documents: i64,
    /// Day-bucketed import counts for the trailing 7 days (oldest first).
    #[serde(rename = "recentActivity")]
    pub recent_activity: Vec<DailyCount>,
    pub timeframe: Timeframe,
}

/// Count of documents imported on a single calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct DailyCount {
    /// ISO date string (YYYY-MM-DD).
    pub date: String,
    #[serde(rename = "documentsAdded")]
    pub documents_added: i64,
}

/// Per-user document roll-up for the admin overview listing.
#[derive(Debug, Clone, Serialize)]
pub struct UserDocumentOverview {
    pub user_id: Uuid,
    #[serde(rename = "totalDocuments")]
    pub total_documents: i64,
    #[serde(rename = "totalHighlights")]
    pub total_highlights: i64,
    /// Most recent import by this user.
    #[serde(rename = "lastActivity")]
    pub last_activity: DateTime<Utc>,
    pub email: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub role: Role,
}

// =============================================================================
// VOCABULARY TYPES
// =============================================================================

/// Where a vocabulary entry originated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Created while reading an uploaded document; `source` holds the
    /// document id as text (soft reference, resolved at read time).
    Document,
    /// Imported from a shared word package.
    Package,
    /// Entered by hand. Serialized as `"self"` (keyword, so the variant
    /// cannot carry that name directly).
    #[default]
    #[serde(rename = "self")]
    Slf,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Document => "document",
            SourceKind::Package => "package",
            SourceKind::Slf => "self",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document" => Some(SourceKind::Document),
            "package" => Some(SourceKind::Package),
            "self" => Some(SourceKind::Slf),
            _ => None,
        }
    }
}

/// One entry in the append-only review log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub date: DateTime<Utc>,
    pub correct: bool,
}

/// A learned word or phrase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Normalized to lowercase on insert.
    pub word: String,
    pub meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation_url: Option<String>,
    pub tags: Vec<String>,
    /// Free-text source label; a document id when `source_type` is `document`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub source_type: SourceKind,
    pub examples: Vec<String>,
    pub review_history: Vec<ReviewEntry>,
    pub created_at: DateTime<Utc>,
}

/// Slim document view attached to a vocab entry by the read-time soft join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: Uuid,
    pub file_name: String,
    pub file_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Vocabulary entry enriched with its source document, when resolvable.
/// A dangling source reference simply leaves `document` unset.
#[derive(Debug, Clone, Serialize)]
pub struct VocabularyWithDocument {
    #[serde(flatten)]
    pub vocab: Vocabulary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentRef>,
}

/// Aggregated vocabulary statistics for one owner and time window.
#[derive(Debug, Clone, Serialize)]
pub struct VocabStats {
    pub total: i64,
    #[serde(rename = "totalReviews")]
    pub total_reviews: i64,
    /// Rounded to two decimal places.
    #[serde(rename = "avgReviewsPerVocab")]
    pub avg_reviews_per_vocab: f64,
    #[serde(rename = "bySourceType")]
    pub by_source_type: HashMap<String, i64>,
    /// ISO-week-bucketed counts of entries created in the current calendar month.
    #[serde(rename = "weeklyBreakdown")]
    pub weekly_breakdown: Vec<WeeklyCount>,
    pub timeframe: Timeframe,
}

/// Count of vocab entries created in one ISO week.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyCount {
    pub week: i32,
    pub year: i32,
    pub count: i64,
}

/// Per-user roll-up for the admin overview listing.
#[derive(Debug, Clone, Serialize)]
pub struct UserVocabOverview {
    pub user_id: Uuid,
    #[serde(rename = "totalVocabs")]
    pub total_vocabs: i64,
    #[serde(rename = "totalReviews")]
    pub total_reviews: i64,
    #[serde(rename = "lastActivity")]
    pub last_activity: Option<DateTime<Utc>>,
    pub email: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub role: Role,
}

// =============================================================================
// HIGHLIGHT TYPES
// =============================================================================

/// A rectangle in PDF-viewer coordinates. All four corners and both
/// dimensions are required; a partial rectangle is rejected at the boundary
/// by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "pageNumber", skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i32>,
}

/// Spatial position of a highlight. Persisted verbatim; the server performs
/// no coordinate normalization so the viewer can restore it exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightPosition {
    #[serde(rename = "boundingRect")]
    pub bounding_rect: Rect,
    pub rects: Vec<Rect>,
    #[serde(rename = "pageNumber", skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i32>,
}

/// Text span captured by a highlight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightContent {
    pub text: String,
}

/// Optional annotation attached to a highlight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighlightComment {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub emoji: String,
}

/// A spatial annotation on a document, linked to one vocabulary entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vocab_id: Uuid,
    pub document_id: Uuid,
    /// Denormalized copy of the document's content hash for hash-based lookup.
    pub file_hash: String,
    pub content: HighlightContent,
    pub position: HighlightPosition,
    pub comment: HighlightComment,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_tag: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// TIME WINDOWS
// =============================================================================

/// Statistics time window. `Week` is a trailing 7-day window; `Month` and
/// `Year` are calendar-to-date, not rolling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    All,
    Week,
    Month,
    Year,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::All => "all",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Timeframe::All),
            "week" => Some(Timeframe::Week),
            "month" => Some(Timeframe::Month),
            "year" => Some(Timeframe::Year),
            _ => None,
        }
    }
}

/// Pretty-print as serialized in JSON payloads.
impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a position to its persisted JSON form.
impl HighlightPosition {
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_unknown_falls_back_to_user() {
        assert_eq!(Role::parse("root"), Role::User);
        assert_eq!(Role::parse("admin"), Role::Admin);
    }

    #[test]
    fn test_source_kind_round_trip() {
        for kind in [SourceKind::Document, SourceKind::Package, SourceKind::Slf] {
            assert_eq!(SourceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SourceKind::parse("web"), None);
    }

    #[test]
    fn test_source_kind_serde_uses_self_keyword() {
        let json = serde_json::to_string(&SourceKind::Slf).unwrap();
        assert_eq!(json, "\"self\"");
        let parsed: SourceKind = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(parsed, SourceKind::Slf);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!(Timeframe::parse("week"), Some(Timeframe::Week));
        assert_eq!(Timeframe::parse("decade"), None);
    }

    #[test]
    fn test_rect_rejects_partial() {
        let partial = serde_json::json!({ "x1": 1.0, "y1": 2.0, "x2": 3.0 });
        assert!(serde_json::from_value::<Rect>(partial).is_err());
    }

    #[test]
    fn test_position_wire_shape() {
        let raw = serde_json::json!({
            "boundingRect": { "x1": 1.0, "y1": 2.0, "x2": 3.0, "y2": 4.0,
                              "width": 2.0, "height": 2.0, "pageNumber": 1 },
            "rects": [],
            "pageNumber": 1
        });
        let pos: HighlightPosition = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&pos).unwrap(), raw);
    }

    #[test]
    fn test_user_public_has_no_password_field() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.c".into(),
            password_hash: "secret".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: Role::User,
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserPublic::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("firstName").is_some());
    }
}
