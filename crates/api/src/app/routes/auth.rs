use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;

use taskhub_auth::{JwtValidator, TokenPurpose, User, validate_password_strength};
use taskhub_core::{DomainError, Email};

use crate::app::dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, VerifyEmailRequest};
use crate::app::errors::ApiError;
use crate::app::services::{self, AppServices};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(body) = payload?;

    let email = Email::parse(&body.email)?;
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    validate_password_strength(&body.password)?;
    if body.password != body.confirm_password {
        return Err(ApiError::bad_request("Passwords do not match"));
    }

    if services.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request("Email address already in use"));
    }

    let password_hash = services::hash_password(body.password).await?;
    let user = User::register(&body.name, email, password_hash, Utc::now())?;
    services.users.insert(user.clone()).await?;
    tracing::info!(user_id = %user.id, "user registered");

    let outcome = services.send_verification_email(&user).await?;
    if !outcome.is_success() {
        return Err(ApiError::EmailDelivery);
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Verification email sent to your email. Please check and verify your account.",
        )),
    ))
}

pub async fn verify_email(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(body) = payload?;

    let claims = services
        .jwt
        .validate(body.token.trim(), TokenPurpose::EmailVerification, Utc::now())
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected verification token");
            ApiError::forbidden("Unauthorized")
        })?;

    let Some(mut user) = services.users.find_by_id(claims.sub).await? else {
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    };

    let already_verified = || ApiError::bad_request("Email already verified");
    match user.verify_email(Utc::now()) {
        Ok(()) => {}
        Err(DomainError::Conflict(_)) => return Err(already_verified()),
        Err(e) => return Err(e.into()),
    }
    // Only one of several racing verifications wins.
    if !services.users.mark_email_verified(user.id, user.updated_at).await? {
        return Err(already_verified());
    }
    tracing::info!(user_id = %user.id, "email verified");

    Ok(Json(MessageResponse::new("Email verified successfully")))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = payload?;

    // Never reveal whether the address exists.
    let Ok(email) = Email::parse(&body.email) else {
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    };
    let Some(user) = services.users.find_by_email(&email).await? else {
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    };

    if !services::verify_password(body.password, user.password_hash.clone()).await? {
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    }

    if !user.is_email_verified {
        // Best effort: the caller is told to check their inbox either way.
        match services.send_verification_email(&user).await {
            Ok(outcome) if !outcome.is_success() => {
                tracing::warn!(user_id = %user.id, "verification email resend failed");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(user_id = %user.id, error = ?e, "verification email resend failed"),
        }
        return Err(ApiError::forbidden(
            "Email not verified. Please check your email for the verification link.",
        ));
    }

    let token = services.session_token(&user)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: user.profile(),
    }))
}
