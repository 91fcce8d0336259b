use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use taskhub_core::UserId;

/// What a token may be used for.
///
/// Session tokens authenticate API calls; verification tokens are embedded in
/// the link mailed on sign-up. One is never accepted in place of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    EmailVerification,
}

/// JWT claims model (transport-agnostic).
///
/// `iat`/`exp` are unix seconds, matching the registered JWT claim names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user the token was issued to.
    pub sub: UserId,

    /// Email at issue time (informational).
    pub email: String,

    pub purpose: TokenPurpose,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token purpose mismatch: expected {expected:?}, got {actual:?}")]
    WrongPurpose {
        expected: TokenPurpose,
        actual: TokenPurpose,
    },

    #[error("token rejected: {0}")]
    Invalid(String),

    #[error("token could not be encoded: {0}")]
    Encode(String),
}

/// Deterministically validate JWT claims against `now` and the expected purpose.
///
/// Signature verification / decoding happens in [`crate::jwt`]; this checks the
/// claims only.
pub fn validate_claims(
    claims: &JwtClaims,
    expected: TokenPurpose,
    now: DateTime<Utc>,
) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    if claims.purpose != expected {
        return Err(TokenError::WrongPurpose {
            expected,
            actual: claims.purpose,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_at(now: DateTime<Utc>, ttl: Duration, purpose: TokenPurpose) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            email: "volunteer@example.org".into(),
            purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    #[test]
    fn accepts_claims_inside_window() {
        let now = Utc::now();
        let claims = claims_at(now, Duration::minutes(5), TokenPurpose::Session);
        assert_eq!(validate_claims(&claims, TokenPurpose::Session, now), Ok(()));
    }

    #[test]
    fn rejects_expired() {
        let now = Utc::now();
        let claims = claims_at(now, Duration::minutes(5), TokenPurpose::Session);
        let later = now + Duration::minutes(6);
        assert_eq!(
            validate_claims(&claims, TokenPurpose::Session, later),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn rejects_future_issue_time() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::minutes(1), Duration::minutes(5), TokenPurpose::Session);
        assert_eq!(
            validate_claims(&claims, TokenPurpose::Session, now),
            Err(TokenError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let mut claims = claims_at(now, Duration::minutes(5), TokenPurpose::Session);
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, TokenPurpose::Session, now),
            Err(TokenError::InvalidTimeWindow)
        );
    }

    #[test]
    fn verification_token_is_not_a_session() {
        let now = Utc::now();
        let claims = claims_at(now, Duration::minutes(5), TokenPurpose::EmailVerification);
        assert!(matches!(
            validate_claims(&claims, TokenPurpose::Session, now),
            Err(TokenError::WrongPurpose { .. })
        ));
    }
}
