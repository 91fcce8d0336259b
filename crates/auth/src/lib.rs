//! `taskhub-auth`: authentication boundary: credentials, tokens, accounts.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod jwt;
pub mod password;
pub mod user;

pub use claims::{JwtClaims, TokenError, TokenPurpose, validate_claims};
pub use jwt::{Hs256Jwt, JwtValidator};
pub use password::{PasswordError, hash_password, validate_password_strength, verify_password};
pub use user::{User, UserProfile};
