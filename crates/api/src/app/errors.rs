use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use taskhub_auth::{PasswordError, TokenError};
use taskhub_core::DomainError;
use taskhub_infra::StoreError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const NOT_FOUND_MESSAGE: &str = "Not found";

/// Every error body is `{"message": "..."}`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Handler error mapped to a status code and a client-safe message.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    /// Verification email could not be delivered.
    EmailDelivery,
    /// Unexpected failure; the detail is logged, never returned.
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized".to_string())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(detail: impl core::fmt::Display) -> Self {
        Self::Internal(detail.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, msg),
            ApiError::EmailDelivery => json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error sending verification email",
            ),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::bad_request("Email address already in use"),
            StoreError::NotFound => ApiError::not_found("User not found"),
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::BadRequest(msg),
            DomainError::InvalidId(msg) => ApiError::BadRequest(msg),
            DomainError::NotFound => ApiError::not_found(NOT_FOUND_MESSAGE),
            DomainError::Conflict(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => ApiError::BadRequest(err.to_string()),
            PasswordError::Hash(detail) => ApiError::Internal(detail),
        }
    }
}

/// Token *issuing* failures only; rejected client tokens are mapped at the call site.
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let (status, body) = body_of(ApiError::internal("connection refused at 10.0.0.3")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_bad_request() {
        let (status, body) = body_of(StoreError::DuplicateEmail.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email address already in use");
    }

    #[tokio::test]
    async fn short_password_is_a_client_error() {
        let (status, _) = body_of(PasswordError::TooShort.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
