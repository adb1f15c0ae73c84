use shared::{
    protocol::ContactRequest,
    validation::{is_present, is_valid_email},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl FormFields {
    pub fn to_request(&self) -> ContactRequest {
        ContactRequest {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            message: Some(self.message.clone()),
        }
    }
}

/// Field-level messages shown next to the inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub message: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.message.is_none()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = [self.name, self.email, self.message]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join("; "))
    }
}

pub fn validate_fields(fields: &FormFields) -> FieldErrors {
    let email = if !is_present(Some(fields.email.as_str())) {
        Some("Email is required")
    } else if !is_valid_email(&fields.email) {
        Some("Invalid email address")
    } else {
        None
    };

    FieldErrors {
        name: (!is_present(Some(fields.name.as_str()))).then_some("Name is required"),
        email,
        message: (!is_present(Some(fields.message.as_str()))).then_some("Message is required"),
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
