//! Document import, listing, and statistics endpoints.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use vocabase_core::defaults::{MAX_PAGE_LIMIT, PAGE_LIMIT_SMALL};
use vocabase_core::{
    Document, DocumentRepository, DocumentStats, ImportOutcome, ListDocumentsRequest, PageRequest,
    Timeframe, UserDocumentOverview, UserRepository,
};

use crate::auth::{RequireAdmin, RequireAuth};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload;

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub timeframe: Option<String>,
}

pub(crate) fn parse_timeframe(raw: &Option<String>) -> Result<Timeframe, ApiError> {
    match raw {
        None => Ok(Timeframe::default()),
        Some(s) => Timeframe::parse(s).ok_or_else(|| {
            ApiError::validation(format!(
                "Invalid timeframe '{s}', expected one of all, week, month, year"
            ))
        }),
    }
}

/// Import a PDF via multipart upload.
///
/// The file is hashed, persisted at a content-addressed path, and recorded
/// per owner. Re-importing the same bytes answers 200 with the existing
/// record and `isExisting=true`.
pub async fn import_document(
    auth: RequireAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ImportOutcome>>), ApiError> {
    let file = upload::read_file_field(
        multipart,
        state.config.upload_max_bytes,
        &state.config.upload_allowed_types,
    )
    .await?;

    let file_hash = upload::sha256_hex(&file.bytes);
    upload::persist(&state.config.upload_dir, &file_hash, &file.bytes).await?;

    let outcome = state
        .db
        .documents
        .import(auth.user.id, &file_hash, &file.file_name)
        .await?;

    info!(
        subsystem = "api",
        component = "documents",
        op = "import",
        user_id = %auth.user.id,
        document_id = %outcome.document.id,
        file_hash = %file_hash,
        upload_bytes = file.bytes.len(),
        is_existing = outcome.is_existing,
        "Import handled"
    );

    let status = if outcome.is_existing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let message = outcome.message.clone();
    Ok((status, Json(ApiResponse::ok_with_message(outcome, message))))
}

/// List the caller's documents.
pub async fn list_documents(
    auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<ApiResponse<Vec<Document>>>, ApiError> {
    let page = PageRequest::new(query.page, query.limit, PAGE_LIMIT_SMALL, MAX_PAGE_LIMIT);
    let result = state
        .db
        .documents
        .list(
            auth.user.id,
            ListDocumentsRequest {
                search: query.search,
            },
            page,
        )
        .await?;
    Ok(Json(ApiResponse::paginated(result)))
}

/// Get one of the caller's documents by id.
pub async fn get_document(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    let document = state
        .db
        .documents
        .find_by_id(id, auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Document {} not found", id)))?;
    Ok(Json(ApiResponse::ok(document)))
}

/// Delete a document along with its sourced vocabs and highlights.
pub async fn delete_document(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.db.documents.delete_cascade(id, auth.user.id).await?;
    Ok(Json(ApiResponse::message_only("Document deleted")))
}

/// Time-windowed statistics for the caller's documents.
pub async fn document_stats(
    auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<DocumentStats>>, ApiError> {
    let timeframe = parse_timeframe(&query.timeframe)?;
    let stats = state.db.documents.stats(auth.user.id, timeframe).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Admin: document statistics for another user.
pub async fn document_stats_for_user(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<DocumentStats>>, ApiError> {
    let timeframe = parse_timeframe(&query.timeframe)?;
    state
        .db
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))?;
    let stats = state.db.documents.stats(user_id, timeframe).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Admin: per-user document roll-up across all accounts.
pub async fn document_overview(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserDocumentOverview>>>, ApiError> {
    let overview = state.db.documents.overview().await?;
    Ok(Json(ApiResponse::ok(overview)))
}

/// Admin: delete any user's document, addressed by content hash, along with
/// its sourced vocabs and highlights.
pub async fn admin_delete_document(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path((file_hash, user_id)): Path<(String, Uuid)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .db
        .documents
        .delete_cascade_by_hash(&file_hash, user_id)
        .await?;
    Ok(Json(ApiResponse::message_only("Document deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeframe_defaults_to_all() {
        assert_eq!(parse_timeframe(&None).unwrap(), Timeframe::All);
        assert_eq!(
            parse_timeframe(&Some("week".to_string())).unwrap(),
            Timeframe::Week
        );
        assert!(parse_timeframe(&Some("fortnight".to_string())).is_err());
    }
}
