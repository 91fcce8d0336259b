//! Cross-origin admission policy.
//!
//! The decision itself is the pure function [`admit`]; [`cors_layer`] plugs it
//! into `tower-http`. Denial is silent: the request is still served, the
//! response just carries no `Access-Control-Allow-Origin`, and the browser
//! blocks it.

use std::sync::Arc;

use axum::http::{HeaderValue, Method, header, request::Parts};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Local frontend dev servers, always admitted.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:5174"];

/// Methods a credentialed cross-origin caller may use.
pub const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Ordered, immutable set of admitted origins.
///
/// Built once at startup; empty or unset entries are dropped rather than
/// widening the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    /// The configured production origin (if any) followed by [`DEV_ORIGINS`].
    ///
    /// A configured origin with a trailing `/` is kept as-is but logged: a
    /// browser `Origin` never carries one, so it cannot match.
    pub fn new(frontend_url: Option<&str>) -> Self {
        if let Some(origin) = frontend_url.map(str::trim).filter(|o| has_trailing_slash(o)) {
            tracing::warn!(
                origin,
                "FRONTEND_URL ends with '/'; browser origins never do, so it will not match"
            );
        }
        Self::from_entries(
            std::iter::once(frontend_url)
                .chain(DEV_ORIGINS.iter().map(|o| Some(*o)))
                .flatten(),
        )
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        let mut origins: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry.trim();
            if entry.is_empty() || origins.iter().any(|o| o == entry) {
                continue;
            }
            origins.push(entry.to_string());
        }
        Self(origins)
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|o| o == origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `https://app.example.org/` style entries that can never equal an `Origin` header.
pub fn has_trailing_slash(origin: &str) -> bool {
    origin.len() > 1 && origin.ends_with('/')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Deny,
}

/// Decide whether `origin` may receive a credentialed cross-origin response.
///
/// Requests without an `Origin` (curl, server-to-server) are always allowed.
pub fn admit(allowed: &AllowedOrigins, origin: Option<&str>) -> Admission {
    match origin {
        None => Admission::Allow,
        Some(origin) if allowed.contains(origin) => Admission::Allow,
        Some(_) => Admission::Deny,
    }
}

/// Credentialed CORS layer driven by [`admit`].
pub fn cors_layer(allowed: Arc<AllowedOrigins>) -> CorsLayer {
    let predicate = move |origin: &HeaderValue, _parts: &Parts| {
        let Ok(origin) = origin.to_str() else {
            tracing::debug!("cors: non-ascii origin denied");
            return false;
        };
        match admit(&allowed, Some(origin)) {
            Admission::Allow => true,
            Admission::Deny => {
                tracing::debug!(origin, "cors: origin not allowed");
                false
            }
        }
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(predicate))
        .allow_credentials(true)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
