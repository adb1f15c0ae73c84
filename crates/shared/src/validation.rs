use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::protocol::ContactRequest;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

/// Per-field presence flags, `true` when the field passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequiredFields {
    pub name: bool,
    pub email: bool,
    pub message: bool,
}

impl RequiredFields {
    pub fn all_present(&self) -> bool {
        self.name && self.email && self.message
    }

    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("name", self.name),
            ("email", self.email),
            ("message", self.message),
        ]
        .into_iter()
        .filter_map(|(field, present)| (!present).then_some(field))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.missing().join(", "))]
    MissingFields(RequiredFields),
    #[error("invalid email format: {0}")]
    InvalidEmail(String),
}

pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn check_required(request: &ContactRequest) -> RequiredFields {
    RequiredFields {
        name: is_present(request.name.as_deref()),
        email: is_present(request.email.as_deref()),
        message: is_present(request.message.as_deref()),
    }
}

pub fn validate_required(request: &ContactRequest) -> Result<(), ValidationError> {
    let fields = check_required(request);
    if fields.all_present() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(fields))
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
