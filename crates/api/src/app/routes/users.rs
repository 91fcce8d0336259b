use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
};
use chrono::Utc;

use taskhub_auth::{User, UserProfile, validate_password_strength};

use crate::app::dto::{ChangePasswordRequest, MessageResponse, UpdateProfileRequest};
use crate::app::errors::ApiError;
use crate::app::services::{self, AppServices};
use crate::context::AuthContext;

/// The caller's record; a token for a deleted account is treated as unauthenticated.
async fn current_user(services: &AppServices, ctx: &AuthContext) -> Result<User, ApiError> {
    services
        .users
        .find_by_id(ctx.user_id())
        .await?
        .ok_or_else(ApiError::unauthorized)
}

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = current_user(&services, &ctx).await?;
    Ok(Json(user.profile()))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    let Json(body) = payload?;

    let mut user = current_user(&services, &ctx).await?;
    user.rename(&body.name, Utc::now())?;
    let stored = services
        .users
        .update_name(user.id, &user.name, user.updated_at)
        .await?;

    Ok(Json(stored.profile()))
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(body) = payload?;

    if body.new_password != body.confirm_password {
        return Err(ApiError::bad_request("New password and confirm password do not match"));
    }
    validate_password_strength(&body.new_password)?;

    let mut user = current_user(&services, &ctx).await?;
    if !services::verify_password(body.old_password, user.password_hash.clone()).await? {
        return Err(ApiError::forbidden("Invalid old password"));
    }

    let hash = services::hash_password(body.new_password).await?;
    user.set_password_hash(hash, Utc::now());
    services
        .users
        .update_password_hash(user.id, &user.password_hash, user.updated_at)
        .await?;
    tracing::info!(user_id = %user.id, "password changed");

    Ok(Json(MessageResponse::new("Password updated successfully")))
}
