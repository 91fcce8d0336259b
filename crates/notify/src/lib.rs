//! `taskhub-notify`: best-effort transactional email.
//!
//! - `message.rs`: the outbound message and sender mailbox
//! - `provider.rs`: the provider seam (`EmailProvider`) and its error model
//! - `sendgrid.rs`: SendGrid v3 HTTP provider
//! - `retry.rs`: bounded backoff policy for transient provider failures
//! - `dispatcher.rs`: credential gating, timeouts, retries, outcome normalization

pub mod dispatcher;
pub mod message;
pub mod provider;
pub mod retry;
pub mod sendgrid;

pub use dispatcher::{DispatchOutcome, EmailDispatcher, MailerConfig, SkipReason};
pub use message::{EmailMessage, Mailbox, PRODUCT_NAME};
pub use provider::{EmailProvider, ProviderError};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use sendgrid::SendGridProvider;
