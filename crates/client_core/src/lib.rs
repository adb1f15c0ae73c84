use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use shared::protocol::{ContactResponse, CONTACT_ROUTE};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use url::Url;

mod form;

pub use form::{validate_fields, FieldErrors, FormFields};

pub const STATUS_RESET_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    StatusChanged(SubmitStatus),
    SubmittingChanged(bool),
}

/// Reasons a submit call never reached the endpoint.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("form is invalid: {0}")]
    Invalid(FieldErrors),
    #[error("a submission is already in progress")]
    AlreadySubmitting,
}

#[derive(Debug, Error)]
enum SubmitFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response from server (status {status})")]
    InvalidResponse { status: u16 },
    #[error("server rejected submission (status {status}): {error}")]
    Rejected { status: u16, error: String },
}

#[derive(Default)]
struct FormState {
    fields: FormFields,
    status: SubmitStatus,
    status_generation: u64,
}

pub struct FormController {
    http: Client,
    endpoint: Url,
    reset_delay: Duration,
    state: Arc<Mutex<FormState>>,
    submitting: AtomicBool,
    events: broadcast::Sender<FormEvent>,
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    events: &'a broadcast::Sender<FormEvent>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        let _ = self.events.send(FormEvent::SubmittingChanged(false));
    }
}

/// Resolves the contact endpoint relative to a site base URL.
pub fn contact_endpoint(site_url: &str) -> Result<Url> {
    Url::parse(site_url)
        .and_then(|base| base.join(CONTACT_ROUTE))
        .with_context(|| format!("invalid site url '{site_url}'"))
}

impl FormController {
    pub fn new(endpoint: Url) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            http: Client::new(),
            endpoint,
            reset_delay: STATUS_RESET_DELAY,
            state: Arc::new(Mutex::new(FormState::default())),
            submitting: AtomicBool::new(false),
            events,
        }
    }

    pub fn with_reset_delay(mut self, reset_delay: Duration) -> Self {
        self.reset_delay = reset_delay;
        self
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> SubmitStatus {
        self.state.lock().await.status
    }

    pub async fn fields(&self) -> FormFields {
        self.state.lock().await.fields.clone()
    }

    pub async fn set_fields(&self, fields: FormFields) {
        self.state.lock().await.fields = fields;
    }

    pub async fn set_name(&self, name: impl Into<String>) {
        self.state.lock().await.fields.name = name.into();
    }

    pub async fn set_email(&self, email: impl Into<String>) {
        self.state.lock().await.fields.email = email.into();
    }

    pub async fn set_phone(&self, phone: impl Into<String>) {
        self.state.lock().await.fields.phone = phone.into();
    }

    pub async fn set_message(&self, message: impl Into<String>) {
        self.state.lock().await.fields.message = message.into();
    }

    /// Validates the current fields and, if they pass, posts them once.
    ///
    /// Returns the resulting status; `Err` means nothing was sent.
    pub async fn submit(&self) -> Result<SubmitStatus, FormError> {
        let fields = self.fields().await;
        let errors = validate_fields(&fields);
        if !errors.is_empty() {
            return Err(FormError::Invalid(errors));
        }

        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FormError::AlreadySubmitting);
        }
        let _guard = InFlightGuard {
            flag: &self.submitting,
            events: &self.events,
        };
        let _ = self.events.send(FormEvent::SubmittingChanged(true));
        self.publish_status(SubmitStatus::Idle).await;

        let status = match self.post(&fields).await {
            Ok(response) => {
                info!(confirmation = %response.message, "contact submission accepted");
                self.state.lock().await.fields = FormFields::default();
                SubmitStatus::Success
            }
            Err(error) => {
                warn!(%error, endpoint = %self.endpoint, "contact submission failed");
                SubmitStatus::Error
            }
        };

        let generation = self.publish_status(status).await;
        self.schedule_reset(generation);
        Ok(status)
    }

    async fn post(&self, fields: &FormFields) -> Result<ContactResponse, SubmitFailure> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&fields.to_request())
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        let body: Value =
            serde_json::from_str(&text).map_err(|_| SubmitFailure::InvalidResponse {
                status: status.as_u16(),
            })?;
        if !status.is_success() {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Failed to send message")
                .to_string();
            return Err(SubmitFailure::Rejected {
                status: status.as_u16(),
                error,
            });
        }

        // a 2xx without the confirmation body is not treated as delivered
        serde_json::from_value(body).map_err(|_| SubmitFailure::InvalidResponse {
            status: status.as_u16(),
        })
    }

    async fn publish_status(&self, status: SubmitStatus) -> u64 {
        let generation = {
            let mut state = self.state.lock().await;
            state.status = status;
            state.status_generation += 1;
            state.status_generation
        };
        let _ = self.events.send(FormEvent::StatusChanged(status));
        generation
    }

    /// Reverts to idle after the delay unless a newer status was published.
    fn schedule_reset(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = state.lock().await;
            if state.status_generation != generation {
                return;
            }
            state.status = SubmitStatus::Idle;
            state.status_generation += 1;
            drop(state);
            let _ = events.send(FormEvent::StatusChanged(SubmitStatus::Idle));
        });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
