use std::sync::Arc;

use mailer::{CredentialError, EmailProvider, ProviderCredential, ProviderError};
use serde_json::{json, Value};
use shared::{
    domain::Submission,
    error::{ApiError, ErrorCode},
    protocol::{ContactRequest, ContactResponse},
    validation::{RequiredFields, ValidationError},
};
use thiserror::Error;
use tracing::{error, info, warn};

pub mod compose;

pub const DEFAULT_MAILBOX: &str = "sales@port24.tech";

/// Whether 5xx responses may carry diagnostic details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Posture {
    #[default]
    Production,
    Development,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub api_key: Option<String>,
    pub from_email: String,
    pub contact_email: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            from_email: DEFAULT_MAILBOX.into(),
            contact_email: DEFAULT_MAILBOX.into(),
        }
    }
}

#[derive(Clone)]
pub struct ContactContext {
    pub provider: Arc<dyn EmailProvider>,
    pub mail: MailSettings,
    pub posture: Posture,
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("request body is not valid JSON: {0}")]
    InvalidFormat(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ContactError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidFormat(_) => ErrorCode::InvalidRequestFormat,
            Self::Validation(ValidationError::MissingFields(_)) => ErrorCode::MissingFields,
            Self::Validation(ValidationError::InvalidEmail(_)) => ErrorCode::InvalidEmail,
            Self::Credential(CredentialError::Missing) => ErrorCode::ServiceNotConfigured,
            Self::Credential(CredentialError::BadPrefix { .. }) => ErrorCode::ConfigurationError,
            Self::Provider(err) => match err.status() {
                Some(401) => ErrorCode::ProviderAuthentication,
                Some(403) => ErrorCode::ProviderAuthorization,
                Some(400) => ErrorCode::ProviderRejected,
                _ => ErrorCode::DeliveryFailed,
            },
        }
    }

    pub fn status(&self) -> u16 {
        if self.code().is_caller_fault() {
            400
        } else {
            500
        }
    }

    pub fn public_message(&self) -> &'static str {
        public_message(self.code())
    }

    /// Details safe to show the caller regardless of posture.
    fn caller_details(&self) -> Option<Value> {
        match self {
            Self::Validation(ValidationError::MissingFields(fields)) => {
                Some(missing_fields_details(fields))
            }
            Self::Validation(ValidationError::InvalidEmail(email)) => {
                Some(json!({ "email": email, "isValid": false }))
            }
            Self::InvalidFormat(reason) => Some(json!({
                "issue": "Could not parse JSON from request body",
                "errorMessage": reason,
            })),
            _ => None,
        }
    }

    fn diagnostic_details(&self) -> Value {
        match self {
            Self::Credential(CredentialError::Missing) => json!({
                "issue": "SENDGRID_API_KEY environment variable is missing or empty",
                "hint": "Verify the environment variable is set in the hosting platform",
            }),
            Self::Credential(CredentialError::BadPrefix { prefix, len }) => json!({
                "issue": "SendGrid API key should start with \"SG.\"",
                "prefix": prefix,
                "keyLength": len,
            }),
            Self::Provider(ProviderError::Status { status, body }) => json!({
                "statusCode": status,
                "issue": provider_hint(*status),
                "responseBody": body,
            }),
            Self::Provider(ProviderError::Transport(reason)) => json!({
                "errorMessage": reason,
                "hint": "This might be a network issue reaching the email provider",
            }),
            other => json!({ "errorMessage": other.to_string() }),
        }
    }

    pub fn to_api_error(&self, posture: Posture) -> ApiError {
        let api_error = ApiError::new(self.code(), self.public_message());
        match (self.caller_details(), posture) {
            (Some(details), _) => api_error.with_details(details),
            (None, Posture::Development) => api_error.with_details(self.diagnostic_details()),
            (None, Posture::Production) => api_error,
        }
    }
}

pub fn public_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::InvalidRequestFormat => "Invalid request format",
        ErrorCode::MissingFields => "Missing required fields",
        ErrorCode::InvalidEmail => "Invalid email format",
        ErrorCode::ServiceNotConfigured => {
            "Email service is not configured. Please contact support."
        }
        ErrorCode::ConfigurationError => {
            "Email service configuration error. Please contact support."
        }
        ErrorCode::ProviderAuthentication => {
            "Email service authentication failed. Please contact support."
        }
        ErrorCode::ProviderAuthorization => {
            "Email service authorization failed. Please contact support."
        }
        ErrorCode::ProviderRejected => "Invalid email request. Please contact support.",
        ErrorCode::DeliveryFailed => "Failed to send message. Please try again later.",
        ErrorCode::Internal => "An unexpected error occurred. Please try again later.",
    }
}

fn missing_fields_details(fields: &RequiredFields) -> Value {
    json!({
        "name": fields.name,
        "email": fields.email,
        "message": fields.message,
    })
}

fn provider_hint(status: u16) -> &'static str {
    match status {
        401 => "SendGrid API key authentication failed",
        403 => "SendGrid API key lacks Mail Send permission",
        400 => "SendGrid rejected the email request; check from/to addresses",
        _ => "Unexpected status from SendGrid API",
    }
}

/// Only a JSON object is accepted; serde would otherwise read arrays positionally.
fn parse_request(body: &[u8]) -> Result<ContactRequest, ContactError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ContactError::InvalidFormat(e.to_string()))?;
    if !value.is_object() {
        return Err(ContactError::InvalidFormat(
            "request body must be a JSON object".into(),
        ));
    }
    serde_json::from_value(value).map_err(|e| ContactError::InvalidFormat(e.to_string()))
}

/// Runs one submission end to end: parse, validate, check configuration,
/// compose and hand the message to the provider exactly once.
pub async fn submit_contact(
    ctx: &ContactContext,
    body: &[u8],
) -> Result<ContactResponse, ContactError> {
    let request = parse_request(body)?;
    info!(
        has_name = request.name.is_some(),
        has_email = request.email.is_some(),
        has_phone = request.phone.as_deref().is_some_and(|p| !p.is_empty()),
        message_len = request.message.as_deref().map_or(0, str::len),
        "contact request parsed"
    );

    let submission = Submission::parse(request)?;
    let credential = ProviderCredential::parse(ctx.mail.api_key.as_deref())?;

    let email = compose::compose_email(
        &submission,
        &ctx.mail.from_email,
        &ctx.mail.contact_email,
    );
    info!(
        from = %email.from.email,
        to = %email.to.email,
        reply_to = %email.reply_to.email,
        "sending contact email"
    );
    ctx.provider.send(&credential, &email).await?;

    info!("contact email delivered");
    Ok(ContactResponse::confirmation())
}

/// Logs a failed submission at a level matching who is at fault.
pub fn log_failure(err: &ContactError) {
    let code = err.code();
    if code.is_caller_fault() {
        warn!(?code, error = %err, "contact request rejected");
    } else {
        error!(?code, error = %err, details = %err.diagnostic_details(), "contact request failed");
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
