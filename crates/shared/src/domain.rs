use crate::{
    protocol::ContactRequest,
    validation::{validate_email, validate_required, ValidationError},
};

/// A contact request that passed both the required-field and the email checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl Submission {
    pub fn parse(request: ContactRequest) -> Result<Self, ValidationError> {
        validate_required(&request)?;
        let ContactRequest {
            name,
            email,
            phone,
            message,
        } = request;
        let email = email.unwrap_or_default();
        validate_email(&email)?;

        Ok(Self {
            name: name.unwrap_or_default(),
            email,
            phone: phone.filter(|phone| !phone.trim().is_empty()),
            message: message.unwrap_or_default(),
        })
    }

    pub fn phone_or_placeholder(&self) -> &str {
        self.phone.as_deref().unwrap_or("Not provided")
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
