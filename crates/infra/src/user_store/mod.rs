//! User account storage abstractions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use taskhub_auth::User;
use taskhub_core::{Email, UserId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("email address already in use")]
    DuplicateEmail,

    #[error("user not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence for user accounts. Email is unique across all users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; fails with `DuplicateEmail` if the address is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    // Each write sets only its own columns (plus `updated_at`) and fails with
    // `NotFound` if the user is absent.

    /// Set the display name and return the stored record.
    async fn update_name(
        &self,
        id: UserId,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<User, StoreError>;

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Flip `is_email_verified` to true. Returns `false` if it already was,
    /// so exactly one of several racing callers sees `true`.
    async fn mark_email_verified(
        &self,
        id: UserId,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        (**self).insert(user).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn update_name(
        &self,
        id: UserId,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        (**self).update_name(id, name, updated_at).await
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self).update_password_hash(id, password_hash, updated_at).await
    }

    async fn mark_email_verified(
        &self,
        id: UserId,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        (**self).mark_email_verified(id, updated_at).await
    }
}
