//! Highlight endpoints: creation against a vocab/document pair, scoped
//! listings, partial updates, and deletion.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use vocabase_core::defaults::{
    HIGHLIGHT_PAGE_LIMIT, MAX_COMMENT_LEN, MAX_EMOJI_LEN, MAX_PAGE_LIMIT, MAX_SOURCE_TAG_LEN,
    MAX_TAG_LEN,
};
use vocabase_core::{
    CreateHighlightRequest, Highlight, HighlightComment, HighlightContent, HighlightPosition,
    HighlightRepository, HighlightScope, ListHighlightsRequest, PageRequest,
    UpdateHighlightRequest,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateHighlightBody {
    pub vocab_id: Uuid,
    pub document_id: Uuid,
    pub file_hash: String,
    pub content: HighlightContent,
    pub position: HighlightPosition,
    #[serde(default)]
    pub comment: HighlightComment,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source_tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHighlightBody {
    pub content: Option<HighlightContent>,
    pub comment: Option<HighlightComment>,
    pub tags: Option<Vec<String>>,
    pub source_tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListHighlightsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    /// Comma-separated tag list, any-of semantics.
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHighlightsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Free-text query over the highlighted text.
    pub q: Option<String>,
    pub tags: Option<String>,
}

fn validate_comment(comment: &HighlightComment) -> Result<(), ApiError> {
    let mut fields: Vec<(&str, String)> = Vec::new();
    if comment.text.len() > MAX_COMMENT_LEN {
        fields.push((
            "comment.text",
            format!("Comment must be at most {MAX_COMMENT_LEN} characters"),
        ));
    }
    if comment.emoji.len() > MAX_EMOJI_LEN {
        fields.push((
            "comment.emoji",
            format!("Emoji marker must be at most {MAX_EMOJI_LEN} characters"),
        ));
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_fields("Validation failed", fields))
    }
}

fn validate_tags(tags: &[String]) -> Result<(), ApiError> {
    if tags
        .iter()
        .any(|t| t.trim().is_empty() || t.len() > MAX_TAG_LEN)
    {
        return Err(ApiError::validation_fields(
            "Validation failed",
            vec![("tags", format!("Tags must be 1-{MAX_TAG_LEN} characters"))],
        ));
    }
    Ok(())
}

fn split_tags(raw: Option<String>) -> Option<Vec<String>> {
    raw.map(|raw| {
        raw.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
    })
    .filter(|t: &Vec<String>| !t.is_empty())
}

/// Create a highlight linking a vocab entry to a spot in a document.
///
/// The supplied file hash must match the document on record; position data
/// is stored verbatim.
pub async fn create_highlight(
    auth: RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateHighlightBody>,
) -> Result<(StatusCode, Json<ApiResponse<Highlight>>), ApiError> {
    if body.content.text.trim().is_empty() {
        return Err(ApiError::validation_fields(
            "Validation failed",
            vec![("content.text", "Highlighted text is required".to_string())],
        ));
    }
    validate_comment(&body.comment)?;
    validate_tags(&body.tags)?;
    if let Some(source_tag) = &body.source_tag {
        if source_tag.len() > MAX_SOURCE_TAG_LEN {
            return Err(ApiError::validation_fields(
                "Validation failed",
                vec![(
                    "source_tag",
                    format!("Source tag must be at most {MAX_SOURCE_TAG_LEN} characters"),
                )],
            ));
        }
    }

    let highlight = state
        .db
        .highlights
        .create(
            auth.user.id,
            CreateHighlightRequest {
                vocab_id: body.vocab_id,
                document_id: body.document_id,
                file_hash: body.file_hash,
                text: body.content.text,
                position: body.position,
                comment: body.comment,
                tags: body.tags,
                source_tag: body.source_tag,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(highlight))))
}

async fn list_scoped(
    state: &AppState,
    user_id: Uuid,
    scope: HighlightScope,
    search: Option<String>,
    tags: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<ApiResponse<Vec<Highlight>>>, ApiError> {
    let page = PageRequest::new(page, limit, HIGHLIGHT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let result = state
        .db
        .highlights
        .list(
            user_id,
            scope,
            ListHighlightsRequest {
                search,
                tags: split_tags(tags),
            },
            page,
        )
        .await?;
    Ok(Json(ApiResponse::paginated(result)))
}

/// List the caller's highlights in one document.
pub async fn list_by_document(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Query(query): Query<ListHighlightsQuery>,
) -> Result<Json<ApiResponse<Vec<Highlight>>>, ApiError> {
    list_scoped(
        &state,
        auth.user.id,
        HighlightScope::Document(document_id),
        query.search,
        query.tags,
        query.page,
        query.limit,
    )
    .await
}

/// List the caller's highlights for a file hash, independent of which
/// document record the client has.
pub async fn list_by_file_hash(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(file_hash): Path<String>,
    Query(query): Query<ListHighlightsQuery>,
) -> Result<Json<ApiResponse<Vec<Highlight>>>, ApiError> {
    list_scoped(
        &state,
        auth.user.id,
        HighlightScope::FileHash(file_hash),
        query.search,
        query.tags,
        query.page,
        query.limit,
    )
    .await
}

/// Free-text search across all of the caller's highlights.
pub async fn search_highlights(
    auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<SearchHighlightsQuery>,
) -> Result<Json<ApiResponse<Vec<Highlight>>>, ApiError> {
    list_scoped(
        &state,
        auth.user.id,
        HighlightScope::All,
        query.q,
        query.tags,
        query.page,
        query.limit,
    )
    .await
}

/// Get one highlight by id.
pub async fn get_highlight(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Highlight>>, ApiError> {
    let highlight = state
        .db
        .highlights
        .find_by_id(id, auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Highlight {} not found", id)))?;
    Ok(Json(ApiResponse::ok(highlight)))
}

/// Partially update a highlight. `updated_at` is refreshed even for an
/// empty payload.
pub async fn update_highlight(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateHighlightBody>,
) -> Result<Json<ApiResponse<Highlight>>, ApiError> {
    if let Some(content) = &body.content {
        if content.text.trim().is_empty() {
            return Err(ApiError::validation_fields(
                "Validation failed",
                vec![("content.text", "Highlighted text must not be empty".to_string())],
            ));
        }
    }
    if let Some(comment) = &body.comment {
        validate_comment(comment)?;
    }
    if let Some(tags) = &body.tags {
        validate_tags(tags)?;
    }

    let highlight = state
        .db
        .highlights
        .update(
            id,
            auth.user.id,
            UpdateHighlightRequest {
                text: body.content.map(|c| c.text),
                comment: body.comment,
                tags: body.tags,
                source_tag: body.source_tag,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(highlight)))
}

/// Delete a highlight. The linked vocab entry is untouched.
pub async fn delete_highlight(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.db.highlights.delete(id, auth.user.id).await?;
    Ok(Json(ApiResponse::message_only("Highlight deleted")))
}
