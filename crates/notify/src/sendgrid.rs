//! SendGrid v3 `mail/send` provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::message::EmailMessage;
use crate::provider::{EmailProvider, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";

/// Prefix every SendGrid API key carries.
pub const API_KEY_PREFIX: &str = "SG.";

pub struct SendGridProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl core::fmt::Debug for SendGridProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SendGridProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SendGridProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout)
    }

    /// Point the provider at another host (tests, regional endpoints).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn payload(message: &EmailMessage) -> serde_json::Value {
        json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": message.from.address, "name": message.from.name },
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.html }],
        })
    }
}

#[async_trait]
impl EmailProvider for SendGridProvider {
    async fn send(&self, message: &EmailMessage) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&Self::payload(message))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::from_status(status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Mailbox;
    use httpmock::prelude::*;

    fn message() -> EmailMessage {
        EmailMessage {
            to: "volunteer@example.org".into(),
            from: Mailbox::product("noreply@taskhub.org"),
            subject: "Verify your email".into(),
            html: "<p>hi</p>".into(),
        }
    }

    #[tokio::test]
    async fn posts_v3_payload_with_bearer_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v3/mail/send")
                    .header("authorization", "Bearer SG.test-key")
                    .json_body(json!({
                        "personalizations": [{ "to": [{ "email": "volunteer@example.org" }] }],
                        "from": { "email": "noreply@taskhub.org", "name": "TaskHub" },
                        "subject": "Verify your email",
                        "content": [{ "type": "text/html", "value": "<p>hi</p>" }],
                    }));
                then.status(202);
            })
            .await;

        let provider =
            SendGridProvider::with_base_url("SG.test-key", server.base_url(), Duration::from_secs(5)).unwrap();
        provider.send(&message()).await.expect("202 should be success");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bad_request_is_a_rejection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v3/mail/send");
                then.status(400).body("invalid recipient");
            })
            .await;

        let provider =
            SendGridProvider::with_base_url("SG.k", server.base_url(), Duration::from_secs(5)).unwrap();
        let err = provider.send(&message()).await.unwrap_err();

        assert_eq!(
            err,
            ProviderError::Rejected {
                status: 400,
                body: "invalid recipient".into()
            }
        );
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v3/mail/send");
                then.status(503);
            })
            .await;

        let provider =
            SendGridProvider::with_base_url("SG.k", server.base_url(), Duration::from_secs(5)).unwrap();
        let err = provider.send(&message()).await.unwrap_err();

        assert!(err.is_transient(), "got {err:?}");
    }
}
