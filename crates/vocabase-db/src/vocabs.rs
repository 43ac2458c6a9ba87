//! Vocabulary repository implementation.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use vocabase_core::{
    CreateVocabRequest, Error, ListVocabsRequest, Page, PageRequest, Result, ReviewEntry,
    SourceKind, Timeframe, UpdateVocabRequest, UserVocabOverview, VocabRepository, VocabStats,
    Vocabulary, WeeklyCount,
};

use crate::escape_like;

/// PostgreSQL implementation of VocabRepository.
#[derive(Clone)]
pub struct PgVocabRepository {
    pool: Pool<Postgres>,
}

impl PgVocabRepository {
    /// Create a new PgVocabRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const VOCAB_COLUMNS: &str = "id, user_id, word, meaning, pronunciation_url, tags, source, \
                             source_type, examples, review_history, created_at";

fn map_row_to_vocab(row: sqlx::postgres::PgRow) -> Result<Vocabulary> {
    let history: JsonValue = row.get("review_history");
    let review_history: Vec<ReviewEntry> = serde_json::from_value(history)?;

    Ok(Vocabulary {
        id: row.get("id"),
        user_id: row.get("user_id"),
        word: row.get("word"),
        meaning: row.get("meaning"),
        pronunciation_url: row.get("pronunciation_url"),
        tags: row.get("tags"),
        source: row.get("source"),
        source_type: SourceKind::parse(row.get::<String, _>("source_type").as_str())
            .unwrap_or_default(),
        examples: row.get("examples"),
        review_history,
        created_at: row.get("created_at"),
    })
}

/// WHERE fragment restricting `created_at` to the given window.
fn timeframe_filter(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::All => "",
        Timeframe::Week => "AND created_at >= now() - INTERVAL '7 days' ",
        Timeframe::Month => "AND created_at >= date_trunc('month', now()) ",
        Timeframe::Year => "AND created_at >= date_trunc('year', now()) ",
    }
}

#[async_trait]
impl VocabRepository for PgVocabRepository {
    async fn insert(&self, user_id: Uuid, req: CreateVocabRequest) -> Result<Vocabulary> {
        let id = Uuid::now_v7();
        let row = sqlx::query(&format!(
            "INSERT INTO vocabs (id, user_id, word, meaning, pronunciation_url, tags,
                                 source, source_type, examples)
             VALUES ($1, $2, LOWER($3), $4, $5, $6, $7, $8, $9)
             RETURNING {VOCAB_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(req.word.trim())
        .bind(&req.meaning)
        .bind(&req.pronunciation_url)
        .bind(&req.tags)
        .bind(&req.source)
        .bind(req.source_type.as_str())
        .bind(&req.examples)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let vocab = map_row_to_vocab(row)?;
        info!(
            subsystem = "db",
            component = "vocabs",
            op = "insert",
            user_id = %user_id,
            vocab_id = %vocab.id,
            word = %vocab.word,
            source_type = %vocab.source_type.as_str(),
            "Vocabulary entry created"
        );
        Ok(vocab)
    }

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Vocabulary>> {
        let row = sqlx::query(&format!(
            "SELECT {VOCAB_COLUMNS} FROM vocabs WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row_to_vocab).transpose()
    }

    async fn list(
        &self,
        user_id: Uuid,
        req: ListVocabsRequest,
        page: PageRequest,
    ) -> Result<Page<Vocabulary>> {
        let mut filter = String::from("WHERE user_id = $1 ");
        let mut param_idx = 2;

        if req.search.is_some() {
            filter.push_str(&format!(
                "AND (word ILIKE '%' || ${param_idx} || '%' ESCAPE '\\'
                 OR meaning ILIKE '%' || ${param_idx} || '%' ESCAPE '\\') "
            ));
            param_idx += 1;
        }
        if req.tags.is_some() {
            // Any-of semantics via array overlap.
            filter.push_str(&format!("AND tags && ${param_idx} "));
            param_idx += 1;
        }
        if req.source.is_some() {
            filter.push_str(&format!("AND source = ${param_idx} "));
        }

        let escaped_search = req.search.as_deref().map(escape_like);

        let count_sql = format!("SELECT COUNT(*) FROM vocabs {filter}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        if let Some(search) = &escaped_search {
            count_q = count_q.bind(search);
        }
        if let Some(tags) = &req.tags {
            count_q = count_q.bind(tags);
        }
        if let Some(source) = &req.source {
            count_q = count_q.bind(source);
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(Error::Database)?;

        let list_sql = format!(
            "SELECT {VOCAB_COLUMNS} FROM vocabs {filter}
             ORDER BY created_at DESC LIMIT {} OFFSET {}",
            page.limit,
            page.offset()
        );
        let mut list_q = sqlx::query(&list_sql).bind(user_id);
        if let Some(search) = &escaped_search {
            list_q = list_q.bind(search);
        }
        if let Some(tags) = &req.tags {
            list_q = list_q.bind(tags);
        }
        if let Some(source) = &req.source {
            list_q = list_q.bind(source);
        }
        let rows = list_q.fetch_all(&self.pool).await.map_err(Error::Database)?;

        let items = rows
            .into_iter()
            .map(map_row_to_vocab)
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
        req: UpdateVocabRequest,
    ) -> Result<Vocabulary> {
        // Dynamic SET list; $1 = id, $2 = user_id, optional params from $3.
        let mut updates: Vec<String> = Vec::new();
        let mut param_idx = 3;

        if req.meaning.is_some() {
            updates.push(format!("meaning = ${param_idx}"));
            param_idx += 1;
        }
        if req.pronunciation_url.is_some() {
            updates.push(format!("pronunciation_url = ${param_idx}"));
            param_idx += 1;
        }
        if req.tags.is_some() {
            updates.push(format!("tags = ${param_idx}"));
            param_idx += 1;
        }
        if req.examples.is_some() {
            updates.push(format!("examples = ${param_idx}"));
        }

        if updates.is_empty() {
            return self
                .find_by_id(id, user_id)
                .await?
                .ok_or(Error::VocabNotFound(id));
        }

        let query = format!(
            "UPDATE vocabs SET {} WHERE id = $1 AND user_id = $2 RETURNING {VOCAB_COLUMNS}",
            updates.join(", ")
        );

        let mut q = sqlx::query(&query).bind(id).bind(user_id);
        if let Some(meaning) = &req.meaning {
            q = q.bind(meaning);
        }
        if let Some(url) = &req.pronunciation_url {
            q = q.bind(url);
        }
        if let Some(tags) = &req.tags {
            q = q.bind(tags);
        }
        if let Some(examples) = &req.examples {
            q = q.bind(examples);
        }

        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::VocabNotFound(id))?;

        map_row_to_vocab(row)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM vocabs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::VocabNotFound(id));
        }
        Ok(())
    }

    async fn delete_any(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM vocabs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::VocabNotFound(id));
        }
        Ok(())
    }

    async fn add_review(&self, id: Uuid, user_id: Uuid, correct: bool) -> Result<Vocabulary> {
        let entry = ReviewEntry {
            date: vocabase_core::traits::now(),
            correct,
        };
        let entry_json = serde_json::to_value(&entry)?;

        // Atomic append; no read-modify-write race on the history array.
        let row = sqlx::query(&format!(
            "UPDATE vocabs SET review_history = review_history || $3::jsonb
             WHERE id = $1 AND user_id = $2
             RETURNING {VOCAB_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(entry_json)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::VocabNotFound(id))?;

        let vocab = map_row_to_vocab(row)?;
        info!(
            subsystem = "db",
            component = "vocabs",
            op = "add_review",
            user_id = %user_id,
            vocab_id = %id,
            correct,
            review_count = vocab.review_history.len(),
            "Review recorded"
        );
        Ok(vocab)
    }

    async fn stats(&self, user_id: Uuid, timeframe: Timeframe) -> Result<VocabStats> {
        let window = timeframe_filter(timeframe);

        let row = sqlx::query(&format!(
            "SELECT COUNT(*) AS total,
                    COALESCE(SUM(jsonb_array_length(review_history)), 0) AS total_reviews
             FROM vocabs WHERE user_id = $1 {window}"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let total: i64 = row.get("total");
        let total_reviews: i64 = row.get("total_reviews");
        let avg_reviews_per_vocab = if total > 0 {
            ((total_reviews as f64 / total as f64) * 100.0).round() / 100.0
        } else {
            0.0
        };

        let source_rows = sqlx::query(&format!(
            "SELECT source_type, COUNT(*) AS n
             FROM vocabs WHERE user_id = $1 {window}
             GROUP BY source_type"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let by_source_type: HashMap<String, i64> = source_rows
            .into_iter()
            .map(|row| (row.get::<String, _>("source_type"), row.get::<i64, _>("n")))
            .collect();

        // Weekly breakdown always covers the current calendar month, bucketed
        // by ISO week, independent of the requested window.
        let week_rows = sqlx::query(
            "SELECT EXTRACT(WEEK FROM created_at)::int AS week,
                    EXTRACT(ISOYEAR FROM created_at)::int AS year,
                    COUNT(*) AS n
             FROM vocabs
             WHERE user_id = $1 AND created_at >= date_trunc('month', now())
             GROUP BY week, year
             ORDER BY year, week",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let weekly_breakdown = week_rows
            .into_iter()
            .map(|row| WeeklyCount {
                week: row.get("week"),
                year: row.get("year"),
                count: row.get("n"),
            })
            .collect();

        Ok(VocabStats {
            total,
            total_reviews,
            avg_reviews_per_vocab,
            by_source_type,
            weekly_breakdown,
            timeframe,
        })
    }

    async fn overview(&self) -> Result<Vec<UserVocabOverview>> {
        let rows = sqlx::query(
            "SELECT u.id AS user_id, u.email, u.first_name, u.last_name, u.role,
                    COUNT(v.id) AS total_vocabs,
                    COALESCE(SUM(jsonb_array_length(v.review_history)), 0) AS total_reviews,
                    MAX(v.created_at) AS last_activity
             FROM users u
             LEFT JOIN vocabs v ON v.user_id = u.id
             GROUP BY u.id, u.email, u.first_name, u.last_name, u.role
             ORDER BY total_vocabs DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| UserVocabOverview {
                user_id: row.get("user_id"),
                total_vocabs: row.get("total_vocabs"),
                total_reviews: row.get("total_reviews"),
                last_activity: row.get("last_activity"),
                email: row.get("email"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
                role: vocabase_core::Role::parse(row.get::<String, _>("role").as_str()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_filter_windows() {
        assert_eq!(timeframe_filter(Timeframe::All), "");
        assert!(timeframe_filter(Timeframe::Week).contains("7 days"));
        assert!(timeframe_filter(Timeframe::Month).contains("date_trunc('month'"));
    }

    #[test]
    fn test_average_rounding_to_two_decimals() {
        let total = 3_i64;
        let reviews = 10_i64;
        let avg = ((reviews as f64 / total as f64) * 100.0).round() / 100.0;
        assert_eq!(avg, 3.33);
    }
}
