//! Vocabulary endpoints: CRUD, review recording, statistics, and the
//! admin roll-ups.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use vocabase_core::defaults::{
    MAX_EXAMPLE_LEN, MAX_MEANING_LEN, MAX_PAGE_LIMIT, MAX_TAG_LEN, MAX_WORD_LEN, VOCAB_PAGE_LIMIT,
};
use vocabase_core::{
    CreateVocabRequest, DocumentRef, DocumentRepository, ListVocabsRequest, Page, PageRequest,
    SourceKind, UpdateVocabRequest, UserRepository, UserVocabOverview, VocabRepository, VocabStats,
    Vocabulary, VocabularyWithDocument,
};

use crate::auth::{RequireAdmin, RequireAuth};
use crate::error::ApiError;
use crate::handlers::documents::parse_timeframe;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateVocabBody {
    pub word: String,
    pub meaning: String,
    pub pronunciation_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub source_type: SourceKind,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVocabBody {
    pub meaning: Option<String>,
    pub pronunciation_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub examples: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListVocabsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    /// Comma-separated tag list, any-of semantics.
    pub tags: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub timeframe: Option<String>,
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

fn validate_examples(examples: &[String]) -> Result<(), ApiError> {
    if examples.iter().any(|e| e.len() > MAX_EXAMPLE_LEN) {
        return Err(ApiError::validation_fields(
            "Validation failed",
            vec![(
                "examples",
                format!("Examples must be at most {MAX_EXAMPLE_LEN} characters"),
            )],
        ));
    }
    Ok(())
}

fn validate_create(body: &CreateVocabBody) -> Result<(), ApiError> {
    let mut fields: Vec<(&str, String)> = Vec::new();
    if body.word.trim().is_empty() || body.word.len() > MAX_WORD_LEN {
        fields.push(("word", format!("Word must be 1-{MAX_WORD_LEN} characters")));
    }
    if body.meaning.trim().is_empty() || body.meaning.len() > MAX_MEANING_LEN {
        fields.push((
            "meaning",
            format!("Meaning must be 1-{MAX_MEANING_LEN} characters"),
        ));
    }
    if body.source_type == SourceKind::Document && body.source.is_none() {
        fields.push((
            "source",
            "Source document id is required for document-sourced entries".to_string(),
        ));
    }
    if !fields.is_empty() {
        return Err(ApiError::validation_fields("Validation failed", fields));
    }
    validate_tags(&body.tags)?;
    validate_examples(&body.examples)
}

/// Attach source documents to a batch of vocab entries in one lookup.
///
/// Only entries with `source_type=document` and a parseable id participate;
/// dangling references leave `document` unset.
async fn join_documents(
    state: &AppState,
    user_id: Uuid,
    vocabs: Vec<Vocabulary>,
) -> Result<Vec<VocabularyWithDocument>, ApiError> {
    let ids: Vec<Uuid> = vocabs
        .iter()
        .filter(|v| v.source_type == SourceKind::Document)
        .filter_map(|v| v.source.as_deref().and_then(|s| Uuid::parse_str(s).ok()))
        .collect();

    let refs: HashMap<Uuid, DocumentRef> = if ids.is_empty() {
        HashMap::new()
    } else {
        state
            .db
            .documents
            .find_refs(&ids, user_id)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect()
    };

    Ok(vocabs
        .into_iter()
        .map(|vocab| {
            let document = match vocab.source_type {
                SourceKind::Document => vocab
                    .source
                    .as_deref()
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .and_then(|id| refs.get(&id).cloned()),
                _ => None,
            };
            VocabularyWithDocument { vocab, document }
        })
        .collect())
}

/// Create a vocabulary entry for the caller.
pub async fn create_vocab(
    auth: RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateVocabBody>,
) -> Result<(StatusCode, Json<ApiResponse<Vocabulary>>), ApiError> {
    validate_create(&body)?;

    let vocab = state
        .db
        .vocabs
        .insert(
            auth.user.id,
            CreateVocabRequest {
                word: body.word,
                meaning: body.meaning,
                pronunciation_url: body.pronunciation_url,
                tags: body.tags,
                source: body.source,
                source_type: body.source_type,
                examples: body.examples,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(vocab))))
}

/// List the caller's vocabulary with search, tag, and source filters.
/// Source documents are soft-joined onto the page.
pub async fn list_my_vocabs(
    auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListVocabsQuery>,
) -> Result<Json<ApiResponse<Vec<VocabularyWithDocument>>>, ApiError> {
    let page = PageRequest::new(query.page, query.limit, VOCAB_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let tags = query.tags.map(|raw| {
        raw.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
    });

    let result = state
        .db
        .vocabs
        .list(
            auth.user.id,
            ListVocabsRequest {
                search: query.search,
                tags: tags.filter(|t| !t.is_empty()),
                source: query.source,
            },
            page,
        )
        .await?;

    let joined = join_documents(&state, auth.user.id, result.items).await?;
    Ok(Json(ApiResponse::paginated(Page {
        items: joined,
        total: result.total,
        page: result.page,
        limit: result.limit,
    })))
}

/// Get one vocab entry with its source document resolved.
pub async fn get_vocab(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VocabularyWithDocument>>, ApiError> {
    let vocab = state
        .db
        .vocabs
        .find_by_id(id, auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Vocabulary {} not found", id)))?;

    let mut joined = join_documents(&state, auth.user.id, vec![vocab]).await?;
    // join_documents returns exactly one element for a one-element input.
    let entry = joined
        .pop()
        .ok_or_else(|| ApiError::NotFound(format!("Vocabulary {} not found", id)))?;
    Ok(Json(ApiResponse::ok(entry)))
}

/// Update the mutable fields of a vocab entry.
pub async fn update_vocab(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVocabBody>,
) -> Result<Json<ApiResponse<Vocabulary>>, ApiError> {
    if let Some(meaning) = &body.meaning {
        if meaning.trim().is_empty() || meaning.len() > MAX_MEANING_LEN {
            return Err(ApiError::validation_fields(
                "Validation failed",
                vec![(
                    "meaning",
                    format!("Meaning must be 1-{MAX_MEANING_LEN} characters"),
                )],
            ));
        }
    }
    if let Some(tags) = &body.tags {
        validate_tags(tags)?;
    }
    if let Some(examples) = &body.examples {
        validate_examples(examples)?;
    }

    let vocab = state
        .db
        .vocabs
        .update(
            id,
            auth.user.id,
            UpdateVocabRequest {
                meaning: body.meaning,
                pronunciation_url: body.pronunciation_url,
                tags: body.tags,
                examples: body.examples,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(vocab)))
}

/// Delete one of the caller's vocab entries.
pub async fn delete_vocab(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.db.vocabs.delete(id, auth.user.id).await?;
    Ok(Json(ApiResponse::message_only("Vocabulary deleted")))
}

/// Record a review outcome; history is append-only and unbounded.
pub async fn review_vocab(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<ApiResponse<Vocabulary>>, ApiError> {
    let vocab = state
        .db
        .vocabs
        .add_review(id, auth.user.id, body.correct)
        .await?;
    Ok(Json(ApiResponse::ok(vocab)))
}

/// Time-windowed statistics for the caller's vocabulary.
pub async fn vocab_stats(
    auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<VocabStats>>, ApiError> {
    let timeframe = parse_timeframe(&query.timeframe)?;
    let stats = state.db.vocabs.stats(auth.user.id, timeframe).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Admin: vocabulary statistics for another user.
pub async fn vocab_stats_for_user(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<VocabStats>>, ApiError> {
    let timeframe = parse_timeframe(&query.timeframe)?;
    state
        .db
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))?;
    let stats = state.db.vocabs.stats(user_id, timeframe).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Admin: per-user roll-up across all accounts.
pub async fn vocab_overview(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserVocabOverview>>>, ApiError> {
    let overview = state.db.vocabs.overview().await?;
    Ok(Json(ApiResponse::ok(overview)))
}

/// Admin: delete any user's vocab entry.
pub async fn admin_delete_vocab(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.db.vocabs.delete_any(id).await?;
    Ok(Json(ApiResponse::message_only("Vocabulary deleted")))
}
