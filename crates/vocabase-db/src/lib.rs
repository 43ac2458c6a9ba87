//! # vocabase-db
//!
//! PostgreSQL database layer for vocabase.
//!
//! This crate provides:
//! - Connection pool management with capped reconnect
//! - Repository implementations for users, documents, vocabs, and highlights
//! - Time-windowed statistics aggregation
//!
//! ## Example
//!
//! ```rust,ignore
//! use vocabase_db::Database;
//! use vocabase_core::{CreateVocabRequest, SourceKind, VocabRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/vocabase").await?;
//!
//!     let vocab = db.vocabs.insert(user_id, CreateVocabRequest {
//!         word: "ephemeral".to_string(),
//!         meaning: "lasting for a very short time".to_string(),
//!         pronunciation_url: None,
//!         tags: vec!["gre".to_string()],
//!         source: None,
//!         source_type: SourceKind::Slf,
//!         examples: vec![],
//!     }).await?;
//!
//!     println!("Created vocab: {}", vocab.id);
//!     Ok(())
//! }
//! ```
pub mod documents;
pub mod highlights;
pub mod pool;
pub mod users;
pub mod vocabs;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use vocabase_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use documents::PgDocumentRepository;
pub use highlights::PgHighlightRepository;
pub use pool::{
    create_pool, create_pool_with_config, create_pool_with_retry, log_pool_metrics, PoolConfig,
    DEFAULT_CONNECT_ATTEMPTS,
};
pub use users::PgUserRepository;
pub use vocabs::PgVocabRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User account repository.
    pub users: PgUserRepository,
    /// Document metadata repository.
    pub documents: PgDocumentRepository,
    /// Vocabulary entry repository.
    pub vocabs: PgVocabRepository,
    /// Highlight repository.
    pub highlights: PgHighlightRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            documents: PgDocumentRepository::new(pool.clone()),
            vocabs: PgVocabRepository::new(pool.clone()),
            highlights: PgHighlightRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Connect with capped retry, for server startup.
    pub async fn connect_with_retry(url: &str, config: PoolConfig, attempts: u32) -> Result<Self> {
        let pool = create_pool_with_retry(url, config, attempts).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
