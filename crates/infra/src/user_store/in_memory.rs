use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use taskhub_auth::User;
use taskhub_core::{Email, UserId};

use super::{StoreError, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    by_email: HashMap<Email, UserId>,
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Tables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("user store lock poisoned".to_string())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;

        if tables.by_email.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        tables.by_email.insert(user.email.clone(), user.id);
        tables.users.insert(user.id, user);
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables
            .by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.users.get(&id).cloned())
    }

    async fn update_name(
        &self,
        id: UserId,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;

        user.name = name.to_string();
        user.updated_at = updated_at.max(user.created_at);
        Ok(user.clone())
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;

        user.password_hash = password_hash.to_string();
        user.updated_at = updated_at.max(user.created_at);
        Ok(())
    }

    async fn mark_email_verified(
        &self,
        id: UserId,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;

        if user.is_email_verified {
            return Ok(false);
        }
        user.is_email_verified = true;
        user.updated_at = updated_at.max(user.created_at);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User::register(name, Email::parse(email).unwrap(), "hash".into(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn insert_then_find_by_email_and_id() {
        let store = InMemoryUserStore::new();
        let alice = user("Alice", "alice@example.org");
        store.insert(alice.clone()).await.unwrap();

        let by_email = store
            .find_by_email(&Email::parse("ALICE@example.org").unwrap())
            .await
            .unwrap();
        assert_eq!(by_email.as_ref().map(|u| u.id), Some(alice.id));

        let by_id = store.find_by_id(alice.id).await.unwrap();
        assert_eq!(by_id, Some(alice));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(user("Alice", "alice@example.org")).await.unwrap();

        let err = store
            .insert(user("Impostor", "Alice@Example.org"))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::DuplicateEmail);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn verification_flips_once() {
        let store = InMemoryUserStore::new();
        let alice = user("Alice", "alice@example.org");
        store.insert(alice.clone()).await.unwrap();

        assert_eq!(store.mark_email_verified(alice.id, Utc::now()).await, Ok(true));
        assert_eq!(store.mark_email_verified(alice.id, Utc::now()).await, Ok(false));

        let stored = store.find_by_id(alice.id).await.unwrap().unwrap();
        assert!(stored.is_email_verified);
    }

    #[tokio::test]
    async fn rename_from_stale_read_keeps_newer_password() {
        let store = InMemoryUserStore::new();
        let alice = user("Alice", "alice@example.org");
        store.insert(alice.clone()).await.unwrap();

        // Profile edit reads the record before a password change commits.
        let mut snapshot = store.find_by_id(alice.id).await.unwrap().unwrap();
        store
            .update_password_hash(alice.id, "new-hash", Utc::now())
            .await
            .unwrap();

        snapshot.rename("Alice Renamed", Utc::now()).unwrap();
        let renamed = store
            .update_name(snapshot.id, &snapshot.name, snapshot.updated_at)
            .await
            .unwrap();

        assert_eq!(renamed.name, "Alice Renamed");
        assert_eq!(renamed.password_hash, "new-hash");
        let stored = store.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");
        assert_eq!(stored.name, "Alice Renamed");
    }

    #[tokio::test]
    async fn password_change_from_stale_read_keeps_verification() {
        let store = InMemoryUserStore::new();
        let alice = user("Alice", "alice@example.org");
        store.insert(alice.clone()).await.unwrap();

        let mut snapshot = store.find_by_id(alice.id).await.unwrap().unwrap();
        store.mark_email_verified(alice.id, Utc::now()).await.unwrap();

        snapshot.set_password_hash("new-hash".into(), Utc::now());
        store
            .update_password_hash(snapshot.id, &snapshot.password_hash, snapshot.updated_at)
            .await
            .unwrap();

        let stored = store.find_by_id(alice.id).await.unwrap().unwrap();
        assert!(stored.is_email_verified);
        assert_eq!(stored.password_hash, "new-hash");
    }

    #[tokio::test]
    async fn writes_to_unknown_user_are_not_found() {
        let store = InMemoryUserStore::new();
        let ghost = UserId::new();
        let now = Utc::now();

        assert_eq!(store.update_name(ghost, "Ghost", now).await, Err(StoreError::NotFound));
        assert_eq!(
            store.update_password_hash(ghost, "hash", now).await,
            Err(StoreError::NotFound)
        );
        assert_eq!(store.mark_email_verified(ghost, now).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn missing_lookups_return_none() {
        let store = InMemoryUserStore::new();
        assert!(store.is_empty());
        assert_eq!(store.find_by_id(UserId::new()).await.unwrap(), None);
        assert_eq!(
            store
                .find_by_email(&Email::parse("nobody@example.org").unwrap())
                .await
                .unwrap(),
            None
        );
    }
}
