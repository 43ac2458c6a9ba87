//! Highlight repository implementation.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use vocabase_core::{
    CreateHighlightRequest, Error, Highlight, HighlightComment, HighlightContent,
    HighlightPosition, HighlightRepository, HighlightScope, ListHighlightsRequest, Page,
    PageRequest, Result, UpdateHighlightRequest,
};

use crate::escape_like;

/// PostgreSQL implementation of HighlightRepository.
#[derive(Clone)]
pub struct PgHighlightRepository {
    pool: Pool<Postgres>,
}

impl PgHighlightRepository {
    /// Create a new PgHighlightRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const HIGHLIGHT_COLUMNS: &str = "id, user_id, vocab_id, document_id, file_hash, content_text, \
                                 position, comment_text, comment_emoji, tags, source_tag, \
                                 created_at, updated_at";

fn map_row_to_highlight(row: sqlx::postgres::PgRow) -> Result<Highlight> {
    let position_json: JsonValue = row.get("position");
    let position: HighlightPosition = serde_json::from_value(position_json)?;

    Ok(Highlight {
        id: row.get("id"),
        user_id: row.get("user_id"),
        vocab_id: row.get("vocab_id"),
        document_id: row.get("document_id"),
        file_hash: row.get("file_hash"),
        content: HighlightContent {
            text: row.get("content_text"),
        },
        position,
        comment: HighlightComment {
            text: row.get("comment_text"),
            emoji: row.get("comment_emoji"),
        },
        tags: row.get("tags"),
        source_tag: row.get("source_tag"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl HighlightRepository for PgHighlightRepository {
    async fn create(&self, user_id: Uuid, req: CreateHighlightRequest) -> Result<Highlight> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Both referents must exist and belong to the caller. A mismatch in
        // any of them reads as not-found so nothing about other owners'
        // resources leaks.
        let vocab_owned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM vocabs WHERE id = $1 AND user_id = $2",
        )
        .bind(req.vocab_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if vocab_owned == 0 {
            return Err(Error::VocabNotFound(req.vocab_id));
        }

        let stored_hash = sqlx::query_scalar::<_, String>(
            "SELECT file_hash FROM documents WHERE id = $1 AND user_id = $2",
        )
        .bind(req.document_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::DocumentNotFound(req.document_id))?;

        // A stale client-side hash means the client is annotating a different
        // file than the one on record.
        if stored_hash != req.file_hash {
            return Err(Error::DocumentNotFound(req.document_id));
        }

        let id = Uuid::now_v7();
        let row = sqlx::query(&format!(
            "INSERT INTO highlights (id, user_id, vocab_id, document_id, file_hash,
                                     content_text, position, comment_text, comment_emoji,
                                     tags, source_tag)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {HIGHLIGHT_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(req.vocab_id)
        .bind(req.document_id)
        .bind(&req.file_hash)
        .bind(&req.text)
        .bind(req.position.to_json())
        .bind(&req.comment.text)
        .bind(&req.comment.emoji)
        .bind(&req.tags)
        .bind(&req.source_tag)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        let highlight = map_row_to_highlight(row)?;
        info!(
            subsystem = "db",
            component = "highlights",
            op = "create",
            user_id = %user_id,
            highlight_id = %highlight.id,
            vocab_id = %req.vocab_id,
            document_id = %req.document_id,
            "Highlight created"
        );
        Ok(highlight)
    }

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Highlight>> {
        let row = sqlx::query(&format!(
            "SELECT {HIGHLIGHT_COLUMNS} FROM highlights WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row_to_highlight).transpose()
    }

    async fn list(
        &self,
        user_id: Uuid,
        scope: HighlightScope,
        req: ListHighlightsRequest,
        page: PageRequest,
    ) -> Result<Page<Highlight>> {
        let mut filter = String::from("WHERE user_id = $1 ");
        let mut param_idx = 2;

        match &scope {
            HighlightScope::Document(_) => {
                filter.push_str(&format!("AND document_id = ${param_idx} "));
                param_idx += 1;
            }
            HighlightScope::FileHash(_) => {
                filter.push_str(&format!("AND file_hash = ${param_idx} "));
                param_idx += 1;
            }
            HighlightScope::All => {}
        }

        if req.search.is_some() {
            filter.push_str(&format!(
                "AND content_text ILIKE '%' || ${param_idx} || '%' ESCAPE '\\' "
            ));
            param_idx += 1;
        }
        if req.tags.is_some() {
            filter.push_str(&format!("AND tags && ${param_idx} "));
        }

        let escaped_search = req.search.as_deref().map(escape_like);

        let count_sql = format!("SELECT COUNT(*) FROM highlights {filter}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        match &scope {
            HighlightScope::Document(doc_id) => count_q = count_q.bind(*doc_id),
            HighlightScope::FileHash(hash) => count_q = count_q.bind(hash),
            HighlightScope::All => {}
        }
        if let Some(search) = &escaped_search {
            count_q = count_q.bind(search);
        }
        if let Some(tags) = &req.tags {
            count_q = count_q.bind(tags);
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(Error::Database)?;

        let list_sql = format!(
            "SELECT {HIGHLIGHT_COLUMNS} FROM highlights {filter}
             ORDER BY created_at DESC LIMIT {} OFFSET {}",
            page.limit,
            page.offset()
        );
        let mut list_q = sqlx::query(&list_sql).bind(user_id);
        match &scope {
            HighlightScope::Document(doc_id) => list_q = list_q.bind(*doc_id),
            HighlightScope::FileHash(hash) => list_q = list_q.bind(hash),
            HighlightScope::All => {}
        }
        if let Some(search) = &escaped_search {
            list_q = list_q.bind(search);
        }
        if let Some(tags) = &req.tags {
            list_q = list_q.bind(tags);
        }
        let rows = list_q.fetch_all(&self.pool).await.map_err(Error::Database)?;

        let items = rows
            .into_iter()
            .map(map_row_to_highlight)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        req: UpdateHighlightRequest,
    ) -> Result<Highlight> {
        // updated_at is refreshed unconditionally; $1 = id, $2 = user_id,
        // optional params from $3.
        let mut updates: Vec<String> = vec!["updated_at = now()".to_string()];
        let mut param_idx = 3;

        if req.text.is_some() {
            updates.push(format!("content_text = ${param_idx}"));
            param_idx += 1;
        }
        if req.comment.is_some() {
            updates.push(format!("comment_text = ${param_idx}"));
            param_idx += 1;
            updates.push(format!("comment_emoji = ${param_idx}"));
            param_idx += 1;
        }
        if req.tags.is_some() {
            updates.push(format!("tags = ${param_idx}"));
            param_idx += 1;
        }
        if req.source_tag.is_some() {
            updates.push(format!("source_tag = ${param_idx}"));
        }

        let query = format!(
            "UPDATE highlights SET {} WHERE id = $1 AND user_id = $2 RETURNING {HIGHLIGHT_COLUMNS}",
            updates.join(", ")
        );

        let mut q = sqlx::query(&query).bind(id).bind(user_id);
        if let Some(text) = &req.text {
            q = q.bind(text);
        }
        if let Some(comment) = &req.comment {
            q = q.bind(&comment.text).bind(&comment.emoji);
        }
        if let Some(tags) = &req.tags {
            q = q.bind(tags);
        }
        if let Some(source_tag) = &req.source_tag {
            q = q.bind(source_tag);
        }

        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::HighlightNotFound(id))?;

        map_row_to_highlight(row)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::HighlightNotFound(id));
        }
        Ok(())
    }
}
