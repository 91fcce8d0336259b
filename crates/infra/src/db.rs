//! Database connection and store selection.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use crate::user_store::{InMemoryUserStore, PostgresUserStore, StoreError, UserStore};

/// Connect to Postgres and make sure the schema exists.
pub async fn connect_postgres(
    database_url: &str,
    acquire_timeout: Duration,
) -> Result<PostgresUserStore, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    let store = PostgresUserStore::new(pool);
    store.ensure_schema().await?;
    Ok(store)
}

/// Pick the user store for this process.
///
/// With no `database_url` the in-memory store is used. A configured database
/// that cannot be reached is logged and also falls back to memory: startup
/// never aborts on a database failure.
pub async fn open_user_store(
    database_url: Option<&str>,
    acquire_timeout: Duration,
) -> Arc<dyn UserStore> {
    let Some(url) = database_url.filter(|u| !u.trim().is_empty()) else {
        tracing::info!("DATABASE_URL not set; using in-memory user store");
        return Arc::new(InMemoryUserStore::new());
    };

    match connect_postgres(url, acquire_timeout).await {
        Ok(store) => {
            tracing::info!("database connected successfully");
            Arc::new(store)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to database; using in-memory user store");
            Arc::new(InMemoryUserStore::new())
        }
    }
}
