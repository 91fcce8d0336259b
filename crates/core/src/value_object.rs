//! Value objects: equality by value, not identity.
//!
//! Value objects have **no identity** - they are defined entirely by their
//! attribute values and are immutable once constructed. To "modify" one,
//! build a new one.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Requires `Clone + PartialEq + Debug`: values are cheap to copy, compared by
/// their attributes, and show up readably in logs and test failures.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A normalized email address.
///
/// Normalization trims surrounding whitespace and lowercases the address so
/// lookups and uniqueness checks are case-insensitive. Validation is
/// deliberately shallow: exactly one `@`, non-empty local part, and a domain
/// containing a dot that neither starts nor ends the domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl ValueObject for Email {}

impl Email {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = raw.trim().to_lowercase();

        let (local, domain) = normalized
            .split_once('@')
            .ok_or_else(|| DomainError::validation("email must contain '@'"))?;

        if local.is_empty() || domain.contains('@') {
            return Err(DomainError::validation("email is malformed"));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(DomainError::validation("email domain is malformed"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("email must not contain whitespace"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let email = Email::parse("  Jane.Doe@Example.ORG ").unwrap();
        assert_eq!(email.as_str(), "jane.doe@example.org");
    }

    #[test]
    fn equal_after_normalization() {
        assert_eq!(
            Email::parse("A@b.co").unwrap(),
            Email::parse("a@B.CO").unwrap()
        );
    }

    #[test]
    fn rejects_malformed_addresses() {
        for raw in ["", "plain", "@example.org", "a@b", "a@.org", "a@org.", "a@b@c.org", "a b@c.org"] {
            assert!(Email::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn deserialization_validates() {
        let ok: Email = serde_json::from_str("\"USER@Example.com\"").unwrap();
        assert_eq!(ok.as_str(), "user@example.com");

        let bad: Result<Email, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
