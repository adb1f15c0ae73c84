use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::{EmailProvider, Mailbox, OutboundEmail, ProviderCredential, ProviderError};

pub const DEFAULT_API_BASE: &str = "https://api.sendgrid.com";

#[derive(Serialize)]
struct Personalization<'a> {
    to: [&'a Mailbox; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: &'a Mailbox,
    reply_to: &'a Mailbox,
    subject: &'a str,
    content: [Content<'a>; 2],
}

impl<'a> From<&'a OutboundEmail> for MailSendRequest<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        Self {
            personalizations: [Personalization { to: [&email.to] }],
            from: &email.from,
            reply_to: &email.reply_to,
            subject: &email.subject,
            // text/plain has to precede text/html
            content: [
                Content {
                    kind: "text/plain",
                    value: &email.text,
                },
                Content {
                    kind: "text/html",
                    value: &email.html,
                },
            ],
        }
    }
}

/// SendGrid v3 mail-send client.
#[derive(Debug, Clone)]
pub struct SendGridClient {
    http: Client,
    api_base: String,
}

impl SendGridClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn mail_send_url(&self) -> String {
        format!("{}/v3/mail/send", self.api_base)
    }
}

impl Default for SendGridClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[async_trait]
impl EmailProvider for SendGridClient {
    async fn send(
        &self,
        credential: &ProviderCredential,
        email: &OutboundEmail,
    ) -> Result<(), ProviderError> {
        let response = self
            .http
            .post(self.mail_send_url())
            .bearer_auth(credential.expose())
            .json(&MailSendRequest::from(email))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "provider accepted message");
            return Ok(());
        }

        let body = response.text().await.ok().filter(|b| !b.is_empty());
        warn!(status = status.as_u16(), body = ?body, "provider rejected message");
        Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
#[path = "tests/sendgrid_tests.rs"]
mod tests;
