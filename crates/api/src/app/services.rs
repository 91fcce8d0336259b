use std::sync::Arc;

use chrono::Utc;

use taskhub_auth::{Hs256Jwt, TokenError, TokenPurpose, User};
use taskhub_infra::{UserStore, open_user_store};
use taskhub_notify::{DispatchOutcome, EmailDispatcher};

use crate::app::email;
use crate::app::errors::ApiError;
use crate::config::AppConfig;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub mailer: EmailDispatcher,
    pub jwt: Arc<Hs256Jwt>,
}

impl AppServices {
    pub fn new(config: AppConfig, users: Arc<dyn UserStore>, mailer: EmailDispatcher) -> Self {
        let jwt = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes()));
        Self {
            config: Arc::new(config),
            users,
            mailer,
            jwt,
        }
    }

    pub fn session_token(&self, user: &User) -> Result<String, TokenError> {
        self.jwt.issue(
            user.id,
            user.email.as_str(),
            TokenPurpose::Session,
            self.config.session_ttl,
            Utc::now(),
        )
    }

    pub fn verification_token(&self, user: &User) -> Result<String, TokenError> {
        self.jwt.issue(
            user.id,
            user.email.as_str(),
            TokenPurpose::EmailVerification,
            self.config.verification_ttl,
            Utc::now(),
        )
    }

    /// Issue a verification token and mail the link to `user`.
    pub async fn send_verification_email(&self, user: &User) -> Result<DispatchOutcome, ApiError> {
        let token = self.verification_token(user)?;
        let link = self.config.verification_link(&token);
        let html = email::verification_email(&user.name, &link);

        Ok(self
            .mailer
            .send_email(user.email.as_str(), email::VERIFICATION_SUBJECT, &html)
            .await)
    }
}

/// Wire the production services from configuration.
pub async fn build_services(config: AppConfig) -> anyhow::Result<AppServices> {
    let users = open_user_store(config.database_url.as_deref(), config.db_acquire_timeout).await;
    let mailer = EmailDispatcher::sendgrid(config.mailer.clone())?;
    if !mailer.is_enabled() {
        tracing::warn!("email sending disabled; verification emails will be skipped");
    }
    Ok(AppServices::new(config, users, mailer))
}

/// Argon2 is CPU-bound; keep it off the async workers.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || taskhub_auth::hash_password(&password))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::from)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || taskhub_auth::verify_password(&password, &hash))
        .await
        .map_err(ApiError::internal)
}
