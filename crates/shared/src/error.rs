use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequestFormat,
    MissingFields,
    InvalidEmail,
    ServiceNotConfigured,
    ConfigurationError,
    ProviderAuthentication,
    ProviderAuthorization,
    ProviderRejected,
    DeliveryFailed,
    Internal,
}

impl ErrorCode {
    /// Caller faults map to 4xx, everything else is a server fault.
    pub fn is_caller_fault(self) -> bool {
        matches!(
            self,
            Self::InvalidRequestFormat | Self::MissingFields | Self::InvalidEmail
        )
    }
}

/// Error body returned by the contact endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}
