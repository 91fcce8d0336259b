//! HS256 token issue/verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use taskhub_core::UserId;

use crate::claims::{JwtClaims, TokenError, TokenPurpose, validate_claims};

/// Verifies a bearer token and yields its claims.
///
/// `now` is injected so expiry checks are deterministic in tests.
pub trait JwtValidator: Send + Sync {
    fn validate(
        &self,
        token: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<JwtClaims, TokenError>;
}

/// Shared-secret (HS256) token codec.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt").finish_non_exhaustive()
    }
}

impl Hs256Jwt {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a token for `user_id` valid for `ttl` starting at `now`.
    pub fn issue(
        &self,
        user_id: UserId,
        email: &str,
        purpose: TokenPurpose,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = JwtClaims {
            sub: user_id,
            email: email.to_string(),
            purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(
        &self,
        token: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<JwtClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run against the injected clock in `validate_claims`.
        validation.validate_exp = false;

        let data = decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        validate_claims(&data.claims, purpose, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test-secret-for-unit-tests-only";

    #[test]
    fn issue_then_validate() {
        let jwt = Hs256Jwt::new(TEST_SECRET);
        let user_id = UserId::new();
        let now = Utc::now();

        let token = jwt
            .issue(user_id, "a@b.org", TokenPurpose::Session, Duration::hours(1), now)
            .expect("should issue token");
        let claims = jwt
            .validate(&token, TokenPurpose::Session, now)
            .expect("should validate token");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.org");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_fails() {
        let now = Utc::now();
        let token = Hs256Jwt::new(TEST_SECRET)
            .issue(UserId::new(), "a@b.org", TokenPurpose::Session, Duration::hours(1), now)
            .unwrap();

        let result = Hs256Jwt::new(b"another-secret").validate(&token, TokenPurpose::Session, now);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn malformed_and_empty_tokens_fail() {
        let jwt = Hs256Jwt::new(TEST_SECRET);
        let now = Utc::now();
        assert!(jwt.validate("not.a.jwt", TokenPurpose::Session, now).is_err());
        assert!(jwt.validate("", TokenPurpose::Session, now).is_err());
    }

    #[test]
    fn expiry_uses_injected_clock() {
        let jwt = Hs256Jwt::new(TEST_SECRET);
        let now = Utc::now();
        let token = jwt
            .issue(
                UserId::new(),
                "a@b.org",
                TokenPurpose::EmailVerification,
                Duration::minutes(60),
                now,
            )
            .unwrap();

        let later = now + Duration::minutes(61);
        assert_eq!(
            jwt.validate(&token, TokenPurpose::EmailVerification, later),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn purpose_is_enforced() {
        let jwt = Hs256Jwt::new(TEST_SECRET);
        let now = Utc::now();
        let token = jwt
            .issue(
                UserId::new(),
                "a@b.org",
                TokenPurpose::EmailVerification,
                Duration::minutes(60),
                now,
            )
            .unwrap();

        assert!(matches!(
            jwt.validate(&token, TokenPurpose::Session, now),
            Err(TokenError::WrongPurpose { .. })
        ));
    }
}
