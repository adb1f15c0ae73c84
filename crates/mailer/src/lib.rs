use async_trait::async_trait;
use thiserror::Error;

mod message;
pub mod sendgrid;

pub use message::{Mailbox, OutboundEmail};
pub use sendgrid::SendGridClient;

pub const SENDGRID_KEY_PREFIX: &str = "SG.";

/// An API key that is present, non-blank and carries the provider prefix.
#[derive(Clone)]
pub struct ProviderCredential(String);

impl ProviderCredential {
    pub fn parse(raw: Option<&str>) -> Result<Self, CredentialError> {
        let key = raw.map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Err(CredentialError::Missing);
        }
        if !key.starts_with(SENDGRID_KEY_PREFIX) {
            return Err(CredentialError::BadPrefix {
                prefix: key.chars().take(SENDGRID_KEY_PREFIX.len()).collect(),
                len: key.len(),
            });
        }
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProviderCredential({}***)", SENDGRID_KEY_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("provider API key is missing or empty")]
    Missing,
    #[error("provider API key should start with \"SG.\" (got {prefix:?}, {len} chars)")]
    BadPrefix { prefix: String, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("provider responded with status {status}")]
    Status { status: u16, body: Option<String> },
    /// The request never produced a provider response.
    #[error("provider request failed: {0}")]
    Transport(String),
}

impl ProviderError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(
        &self,
        credential: &ProviderCredential,
        email: &OutboundEmail,
    ) -> Result<(), ProviderError>;
}

#[cfg(test)]
#[path = "tests/credential_tests.rs"]
mod tests;
