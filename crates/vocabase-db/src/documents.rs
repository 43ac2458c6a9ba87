//! Document repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use vocabase_core::{
    DailyCount, Document, DocumentRef, DocumentRepository, DocumentStats, Error, ImportOutcome,
    ListDocumentsRequest, Page, PageRequest, Result, Role, SourceKind, Timeframe,
    UserDocumentOverview,
};

use crate::escape_like;

/// PostgreSQL implementation of DocumentRepository.
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    /// Create a new PgDocumentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row_to_document(row: sqlx::postgres::PgRow) -> Document {
    Document {
        id: row.get("id"),
        user_id: row.get("user_id"),
        file_hash: row.get("file_hash"),
        file_name: row.get("file_name"),
        created_at: row.get("created_at"),
    }
}

/// WHERE fragment restricting `created_at` to the given window. The week
/// window trails 7 days; month and year are calendar-to-date.
fn timeframe_filter(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::All => "",
        Timeframe::Week => "AND created_at >= now() - INTERVAL '7 days' ",
        Timeframe::Month => "AND created_at >= date_trunc('month', now()) ",
        Timeframe::Year => "AND created_at >= date_trunc('year', now()) ",
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn import(
        &self,
        user_id: Uuid,
        file_hash: &str,
        file_name: &str,
    ) -> Result<ImportOutcome> {
        // Same owner re-importing the same bytes gets the existing record.
        let existing = sqlx::query(
            "SELECT id, user_id, file_hash, file_name, created_at
             FROM documents WHERE user_id = $1 AND file_hash = $2",
        )
        .bind(user_id)
        .bind(file_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if let Some(row) = existing {
            let document = map_row_to_document(row);
            info!(
                subsystem = "db",
                component = "documents",
                op = "import",
                user_id = %user_id,
                document_id = %document.id,
                file_hash,
                is_existing = true,
                "Document already imported by this user"
            );
            return Ok(ImportOutcome {
                document,
                is_existing: true,
                message: "Document already exists".to_string(),
            });
        }

        // Other owners may hold the same hash; their records stay independent
        // but the caller is told the content is known elsewhere.
        let known_elsewhere = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE file_hash = $1",
        )
        .bind(file_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?
            > 0;

        let id = Uuid::now_v7();
        let row = sqlx::query(
            "INSERT INTO documents (id, user_id, file_hash, file_name)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, file_hash, file_name, created_at",
        )
        .bind(id)
        .bind(user_id)
        .bind(file_hash)
        .bind(file_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // A concurrent import of the same file can hit the unique index
            // between the lookup and the insert; surface it as a duplicate.
            let e = Error::Database(e);
            if e.is_unique_violation() {
                Error::Duplicate("Document already exists".to_string())
            } else {
                e
            }
        })?;

        let document = map_row_to_document(row);
        info!(
            subsystem = "db",
            component = "documents",
            op = "import",
            user_id = %user_id,
            document_id = %document.id,
            file_hash,
            is_existing = false,
            "Document imported"
        );

        let message = if known_elsewhere {
            "Document exists for other users, created new record for you".to_string()
        } else {
            "Document imported".to_string()
        };

        Ok(ImportOutcome {
            document,
            is_existing: false,
            message,
        })
    }

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, user_id, file_hash, file_name, created_at
             FROM documents WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row_to_document))
    }

    async fn find_refs(&self, ids: &[Uuid], user_id: Uuid) -> Result<Vec<DocumentRef>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT id, file_name, file_hash, created_at
             FROM documents WHERE id = ANY($1) AND user_id = $2",
        )
        .bind(ids)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| DocumentRef {
                id: row.get("id"),
                file_name: row.get("file_name"),
                file_hash: row.get("file_hash"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn list(
        &self,
        user_id: Uuid,
        req: ListDocumentsRequest,
        page: PageRequest,
    ) -> Result<Page<Document>> {
        let mut filter = String::from("WHERE user_id = $1 ");
        if req.search.is_some() {
            filter.push_str("AND file_name ILIKE '%' || $2 || '%' ESCAPE '\\' ");
        }
        let escaped_search = req.search.as_deref().map(escape_like);

        let count_sql = format!("SELECT COUNT(*) FROM documents {filter}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        if let Some(search) = &escaped_search {
            count_q = count_q.bind(search);
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(Error::Database)?;

        let list_sql = format!(
            "SELECT id, user_id, file_hash, file_name, created_at
             FROM documents {filter}
             ORDER BY created_at DESC LIMIT {} OFFSET {}",
            page.limit,
            page.offset()
        );
        let mut list_q = sqlx::query(&list_sql).bind(user_id);
        if let Some(search) = &escaped_search {
            list_q = list_q.bind(search);
        }
        let rows = list_q.fetch_all(&self.pool).await.map_err(Error::Database)?;

        Ok(Page {
            items: rows.into_iter().map(map_row_to_document).collect(),
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn delete_cascade(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if owned == 0 {
            return Err(Error::DocumentNotFound(id));
        }

        // Vocab entries sourced from this document go with it; the source
        // column stores the document id as text.
        let vocabs_deleted = sqlx::query(
            "DELETE FROM vocabs
             WHERE user_id = $1 AND source = $2 AND source_type = $3",
        )
        .bind(user_id)
        .bind(id.to_string())
        .bind(SourceKind::Document.as_str())
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        let highlights_deleted =
            sqlx::query("DELETE FROM highlights WHERE user_id = $1 AND document_id = $2")
                .bind(user_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?
                .rows_affected();

        sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "documents",
            op = "delete_cascade",
            user_id = %user_id,
            document_id = %id,
            vocabs_deleted,
            highlights_deleted,
            "Document deleted with dependents"
        );
        Ok(())
    }

    async fn delete_cascade_by_hash(&self, file_hash: &str, user_id: Uuid) -> Result<()> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM documents WHERE file_hash = $1 AND user_id = $2",
        )
        .bind(file_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound("Document not found".to_string()))?;

        self.delete_cascade(id, user_id).await
    }

    async fn stats(&self, user_id: Uuid, timeframe: Timeframe) -> Result<DocumentStats> {
        let total_sql = format!(
            "SELECT COUNT(*) FROM documents WHERE user_id = $1 {}",
            timeframe_filter(timeframe)
        );
        let total_documents = sqlx::query_scalar::<_, i64>(&total_sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        // Recent activity is always the trailing 7 days, regardless of the
        // requested window.
        let rows = sqlx::query(
            "SELECT to_char(created_at::date, 'YYYY-MM-DD') AS day, COUNT(*) AS n
             FROM documents
             WHERE user_id = $1 AND created_at >= now() - INTERVAL '7 days'
             GROUP BY day ORDER BY day",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let recent_activity = rows
            .into_iter()
            .map(|row| DailyCount {
                date: row.get("day"),
                documents_added: row.get("n"),
            })
            .collect();

        Ok(DocumentStats {
            total_documents,
            recent_activity,
            timeframe,
        })
    }

    async fn overview(&self) -> Result<Vec<UserDocumentOverview>> {
        // COUNT(DISTINCT d.id) undoes the fan-out from the highlight join.
        let rows = sqlx::query(
            "SELECT d.user_id, COUNT(DISTINCT d.id) AS total_documents,
                    COUNT(h.id) AS total_highlights,
                    MAX(d.created_at) AS last_activity,
                    u.email, u.first_name, u.last_name, u.role
             FROM documents d
             JOIN users u ON u.id = d.user_id
             LEFT JOIN highlights h ON h.document_id = d.id
             GROUP BY d.user_id, u.email, u.first_name, u.last_name, u.role
             ORDER BY total_documents DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| UserDocumentOverview {
                user_id: row.get("user_id"),
                total_documents: row.get("total_documents"),
                total_highlights: row.get("total_highlights"),
                last_activity: row.get("last_activity"),
                email: row.get("email"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
                role: Role::parse(row.get::<String, _>("role").as_str()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_filter_all_is_empty() {
        assert_eq!(timeframe_filter(Timeframe::All), "");
        assert!(timeframe_filter(Timeframe::Week).contains("7 days"));
        assert!(timeframe_filter(Timeframe::Month).contains("date_trunc('month'"));
        assert!(timeframe_filter(Timeframe::Year).contains("date_trunc('year'"));
    }
}
