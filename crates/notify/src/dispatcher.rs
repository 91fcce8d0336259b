//! Best-effort email dispatch.
//!
//! Callers get a [`DispatchOutcome`], never an error: a missing or malformed
//! provider credential skips delivery (and still counts as success so sign-up
//! works in environments without email), and provider failures are logged and
//! reported as `Failed`.

use std::sync::Arc;
use std::time::Duration;

use crate::message::{EmailMessage, Mailbox};
use crate::provider::{EmailProvider, ProviderError};
use crate::retry::RetryPolicy;
use crate::sendgrid::{API_KEY_PREFIX, SendGridProvider};

/// Mailer settings, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailerConfig {
    /// Provider API key; `None` when unset.
    pub api_key: Option<String>,
    /// Verified sender address.
    pub from_address: String,
    /// Upper bound for a single provider call.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_address: String::new(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

impl MailerConfig {
    /// The credential if it is present and well-formed, otherwise why not.
    pub fn credential(&self) -> Result<&str, SkipReason> {
        match self.api_key.as_deref() {
            None => Err(SkipReason::MissingCredential),
            Some(key) if key.trim().is_empty() => Err(SkipReason::MissingCredential),
            Some(key) if !key.starts_with(API_KEY_PREFIX) => Err(SkipReason::MalformedCredential),
            Some(key) => Ok(key),
        }
    }
}

/// Why delivery was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingCredential,
    MalformedCredential,
}

impl core::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SkipReason::MissingCredential => f.write_str("email provider key not configured"),
            SkipReason::MalformedCredential => f.write_str("email provider key has an invalid format"),
        }
    }
}

/// Result of a send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Skipped(SkipReason),
    Failed(String),
}

impl DispatchOutcome {
    /// `Sent` and `Skipped` both let the caller's flow continue.
    pub fn is_success(&self) -> bool {
        !matches!(self, DispatchOutcome::Failed(_))
    }
}

/// Sends transactional email through an [`EmailProvider`].
#[derive(Clone)]
pub struct EmailDispatcher {
    config: Arc<MailerConfig>,
    provider: Option<Arc<dyn EmailProvider>>,
}

impl core::fmt::Debug for EmailDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EmailDispatcher")
            .field("from_address", &self.config.from_address)
            .field("enabled", &self.provider.is_some())
            .finish()
    }
}

impl EmailDispatcher {
    /// Use an explicit provider (tests, alternative backends).
    ///
    /// The credential gate still applies: with no valid key the provider is
    /// never called.
    pub fn new(config: MailerConfig, provider: Arc<dyn EmailProvider>) -> Self {
        let provider = config.credential().is_ok().then_some(provider);
        Self {
            config: Arc::new(config),
            provider,
        }
    }

    /// Build the SendGrid-backed dispatcher from configuration.
    pub fn sendgrid(config: MailerConfig) -> Result<Self, ProviderError> {
        let provider: Option<Arc<dyn EmailProvider>> = match config.credential() {
            Ok(key) => Some(Arc::new(SendGridProvider::new(key, config.timeout)?)),
            Err(SkipReason::MalformedCredential) => {
                tracing::warn!("invalid SendGrid API key format; email sending disabled");
                None
            }
            Err(SkipReason::MissingCredential) => None,
        };

        Ok(Self {
            config: Arc::new(config),
            provider,
        })
    }

    /// A dispatcher that never delivers (every send is skipped).
    pub fn disabled() -> Self {
        Self {
            config: Arc::new(MailerConfig::default()),
            provider: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Attempt delivery of an HTML email to `to`.
    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> DispatchOutcome {
        let provider = match (&self.provider, self.config.credential()) {
            (Some(provider), Ok(_)) => provider,
            (_, Err(reason)) => {
                tracing::info!(to, subject, %reason, "email skipped");
                return DispatchOutcome::Skipped(reason);
            }
            (None, Ok(_)) => {
                tracing::info!(to, subject, "email skipped (no provider)");
                return DispatchOutcome::Skipped(SkipReason::MissingCredential);
            }
        };

        let message = EmailMessage {
            to: to.to_string(),
            from: Mailbox::product(self.config.from_address.clone()),
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let policy = &self.config.retry;
        let attempts = policy.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = match tokio::time::timeout(self.config.timeout, provider.send(&message)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(ProviderError::Timeout(self.config.timeout)),
            };

            match result {
                Ok(()) => {
                    tracing::info!(to, subject, attempt, "email sent");
                    return DispatchOutcome::Sent;
                }
                Err(err) if err.is_transient() && attempt < attempts => {
                    let delay = policy.delay_after(attempt);
                    tracing::warn!(to, attempt, ?delay, error = %err, "email send failed; retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::error!(to, subject, attempt, error = %err, "error sending email");
                    return DispatchOutcome::Failed(err.to_string());
                }
            }
        }
    }
}
