use serde::{Deserialize, Serialize};

pub const CONTACT_ROUTE: &str = "/api/contact";

pub const CONFIRMATION_MESSAGE: &str = "Thank you! Your message has been sent successfully.";

/// Body posted by the contact form. Every field is optional on the wire so
/// the endpoint can report exactly which ones are missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub message: String,
}

impl ContactResponse {
    pub fn confirmation() -> Self {
        Self {
            message: CONFIRMATION_MESSAGE.to_string(),
        }
    }
}
