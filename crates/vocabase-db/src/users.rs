//! User repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use vocabase_core::{
    CreateUserRequest, Error, ListUsersRequest, Page, PageRequest, Result, Role, UpdateUserRequest,
    User, UserPublic, UserRepository, UserStats,
};

use crate::escape_like;

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row_to_user(row: sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        role: Role::parse(row.get::<String, _>("role").as_str()),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, is_active, created_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, req: CreateUserRequest) -> Result<User> {
        let id = Uuid::now_v7();
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role)
             VALUES ($1, LOWER($2), $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&req.email)
        .bind(&req.password_hash)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(req.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
        .map_err(|e| {
            if e.is_unique_violation() {
                Error::Duplicate("User with this email already exists".to_string())
            } else {
                e
            }
        })?;

        Ok(map_row_to_user(row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row_to_user))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_row_to_user))
    }

    async fn update(&self, id: Uuid, req: UpdateUserRequest) -> Result<User> {
        // Dynamic SET list; $1 = id, optional params start at $2.
        let mut updates: Vec<String> = Vec::new();
        let mut param_idx = 2;

        if req.first_name.is_some() {
            updates.push(format!("first_name = ${param_idx}"));
            param_idx += 1;
        }
        if req.last_name.is_some() {
            updates.push(format!("last_name = ${param_idx}"));
            param_idx += 1;
        }
        if req.email.is_some() {
            updates.push(format!("email = LOWER(${param_idx})"));
            param_idx += 1;
        }
        if req.role.is_some() {
            updates.push(format!("role = ${param_idx}"));
        }

        if updates.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("User {} not found", id)));
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = $1 RETURNING {USER_COLUMNS}",
            updates.join(", ")
        );

        let mut q = sqlx::query(&query).bind(id);
        if let Some(first_name) = &req.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = &req.last_name {
            q = q.bind(last_name);
        }
        if let Some(email) = &req.email {
            q = q.bind(email);
        }
        if let Some(role) = req.role {
            q = q.bind(role.as_str());
        }

        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
            .map_err(|e| {
                if e.is_unique_violation() {
                    Error::Duplicate("User with this email already exists".to_string())
                } else {
                    e
                }
            })?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;

        Ok(map_row_to_user(row))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Dependent records first so a failure cannot leave a user with
        // orphaned data but no account.
        sqlx::query("DELETE FROM highlights WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        sqlx::query("DELETE FROM vocabs WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        sqlx::query("DELETE FROM documents WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn list(&self, req: ListUsersRequest, page: PageRequest) -> Result<Page<UserPublic>> {
        let mut filter = String::from("WHERE TRUE ");
        let mut param_idx = 1;

        if req.search.is_some() {
            filter.push_str(&format!(
                "AND email ILIKE '%' || ${param_idx} || '%' ESCAPE '\\' "
            ));
            param_idx += 1;
        }
        if req.role.is_some() {
            filter.push_str(&format!("AND role = ${param_idx} "));
            param_idx += 1;
        }
        if req.is_active.is_some() {
            filter.push_str(&format!("AND is_active = ${param_idx} "));
        }

        let escaped_search = req.search.as_deref().map(escape_like);

        let count_sql = format!("SELECT COUNT(*) FROM users {filter}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(search) = &escaped_search {
            count_q = count_q.bind(search);
        }
        if let Some(role) = req.role {
            count_q = count_q.bind(role.as_str());
        }
        if let Some(is_active) = req.is_active {
            count_q = count_q.bind(is_active);
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(Error::Database)?;

        let list_sql = format!(
            "SELECT {USER_COLUMNS} FROM users {filter}
             ORDER BY created_at DESC LIMIT {} OFFSET {}",
            page.limit,
            page.offset()
        );
        let mut list_q = sqlx::query(&list_sql);
        if let Some(search) = &escaped_search {
            list_q = list_q.bind(search);
        }
        if let Some(role) = req.role {
            list_q = list_q.bind(role.as_str());
        }
        if let Some(is_active) = req.is_active {
            list_q = list_q.bind(is_active);
        }

        let rows = list_q.fetch_all(&self.pool).await.map_err(Error::Database)?;
        let items = rows
            .into_iter()
            .map(|row| UserPublic::from(map_row_to_user(row)))
            .collect();

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn stats(&self, id: Uuid) -> Result<UserStats> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;

        let total_vocabulary =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vocabs WHERE user_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        let total_documents =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM documents WHERE user_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        let total_highlights =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM highlights WHERE user_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(UserStats {
            total_vocabulary,
            total_documents,
            total_highlights,
            joined_date: user.created_at,
        })
    }
}
