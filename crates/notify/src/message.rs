use serde::Serialize;

/// Display name used on every outbound message.
pub const PRODUCT_NAME: &str = "TaskHub";

/// A named address, rendered as `Name <address>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mailbox {
    pub name: String,
    pub address: String,
}

impl Mailbox {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// The fixed product sender for a configured address.
    pub fn product(address: impl Into<String>) -> Self {
        Self::new(PRODUCT_NAME, address)
    }
}

impl core::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} <{}>", self.name, self.address)
    }
}

/// Transient outbound email. Built per send, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: Mailbox,
    pub subject: String,
    pub html: String,
}
