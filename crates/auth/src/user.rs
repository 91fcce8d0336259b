//! User account entity.
//!
//! A user signs up unverified, confirms their address through the mailed
//! verification link, and only then may sign in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskhub_core::{DomainError, DomainResult, Email, Entity, UserId};

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// User account.
///
/// # Invariants
/// - `name` is trimmed, non-empty and at most [`MAX_NAME_LEN`] characters.
/// - `email` is normalized (see [`Email`]).
/// - `is_email_verified` only ever transitions `false -> true`.
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl User {
    /// Create a fresh, unverified account.
    pub fn register(
        name: &str,
        email: Email,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: UserId::new(),
            name: normalize_name(name)?,
            email,
            password_hash,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn verify_email(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_email_verified {
            return Err(DomainError::conflict("email already verified"));
        }
        self.is_email_verified = true;
        self.touch(now);
        Ok(())
    }

    pub fn rename(&mut self, name: &str, now: DateTime<Utc>) -> DomainResult<()> {
        self.name = normalize_name(name)?;
        self.touch(now);
        Ok(())
    }

    pub fn set_password_hash(&mut self, password_hash: String, now: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.touch(now);
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.to_string(),
            is_email_verified: self.is_email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

fn normalize_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Public view of a user (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn alice(now: DateTime<Utc>) -> User {
        User::register(
            "  Alice  ",
            Email::parse("alice@example.org").unwrap(),
            "$argon2id$stub".into(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn register_starts_unverified_with_trimmed_name() {
        let now = Utc::now();
        let user = alice(now);
        assert_eq!(user.name, "Alice");
        assert!(!user.is_email_verified);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn register_rejects_blank_and_oversized_names() {
        let email = Email::parse("a@b.org").unwrap();
        let now = Utc::now();
        assert!(User::register("   ", email.clone(), String::new(), now).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(User::register(&long, email, String::new(), now).is_err());
    }

    #[test]
    fn verify_email_is_one_way() {
        let now = Utc::now();
        let mut user = alice(now);

        user.verify_email(now + Duration::seconds(5)).unwrap();
        assert!(user.is_email_verified);
        assert_eq!(user.updated_at, now + Duration::seconds(5));

        assert!(matches!(
            user.verify_email(now + Duration::seconds(10)),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let now = Utc::now();
        let mut user = alice(now);
        user.rename("Bob", now - Duration::hours(1)).unwrap();
        assert_eq!(user.updated_at, user.created_at);
    }

    #[test]
    fn profile_omits_password_hash() {
        let user = alice(Utc::now());
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["email"], "alice@example.org");
        assert_eq!(json["isEmailVerified"], false);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn identity_is_by_id() {
        let now = Utc::now();
        let a = alice(now);
        let mut b = a.clone();
        b.rename("Someone Else", now).unwrap();
        assert!(a.same_identity_as(&b));
        assert!(!a.same_identity_as(&alice(now)));
    }
}
