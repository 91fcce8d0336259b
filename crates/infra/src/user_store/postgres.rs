//! Postgres-backed user store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `DuplicateEmail` |
//! | Database (other) | Any other | `Backend` |
//! | Anything else | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;

use taskhub_auth::User;
use taskhub_core::{Email, UserId};

use super::{StoreError, UserStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id                UUID PRIMARY KEY,
    name              TEXT NOT NULL,
    email             TEXT NOT NULL UNIQUE,
    password_hash     TEXT NOT NULL,
    is_email_verified BOOLEAN NOT NULL DEFAULT FALSE,
    created_at        TIMESTAMPTZ NOT NULL,
    updated_at        TIMESTAMPTZ NOT NULL
)
"#;

/// Postgres-backed user store.
///
/// Email uniqueness is enforced by the `users.email` unique constraint.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                StoreError::DuplicateEmail
            } else {
                StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
            }
        }
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Backend(format!("failed to decode user row: {e}"));

    let id: uuid::Uuid = row.try_get("id").map_err(decode)?;
    let email: String = row.try_get("email").map_err(decode)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(decode)?;

    Ok(User {
        id: UserId::from_uuid(id),
        name: row.try_get("name").map_err(decode)?,
        email: Email::parse(&email)
            .map_err(|e| StoreError::Backend(format!("stored email is invalid: {e}")))?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        is_email_verified: row.try_get("is_email_verified").map_err(decode)?,
        created_at,
        updated_at,
    })
}

const SELECT_USER: &str = r#"
SELECT id, name, email, password_hash, is_email_verified, created_at, updated_at
FROM users
"#;

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, is_email_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.is_email_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, name), fields(user_id = %id), err)]
    async fn update_name(
        &self,
        id: UserId,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET name = $2,
                updated_at = GREATEST(created_at, $3)
            WHERE id = $1
            RETURNING id, name, email, password_hash, is_email_verified, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(name)
        .bind(updated_at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user_name", e))?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }

    #[instrument(skip(self, password_hash), fields(user_id = %id), err)]
    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                updated_at = GREATEST(created_at, $3)
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(password_hash)
        .bind(updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user_password", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn mark_email_verified(
        &self,
        id: UserId,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_email_verified = TRUE,
                updated_at = GREATEST(created_at, $2)
            WHERE id = $1 AND is_email_verified = FALSE
            "#,
        )
        .bind(id.as_uuid())
        .bind(updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("mark_email_verified", e))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Zero rows: either already verified or no such user.
        match self.find_by_id(id).await? {
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound),
        }
    }
}
