use std::{collections::HashMap, fs, net::SocketAddr};

use anyhow::Context;
use mailer::sendgrid::DEFAULT_API_BASE;
use serde::Deserialize;
use server_api::{MailSettings, Posture, DEFAULT_MAILBOX};

pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_api_url: String,
    pub from_email: String,
    pub contact_email: String,
    pub development: bool,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:3000".into(),
            sendgrid_api_key: None,
            sendgrid_api_url: DEFAULT_API_BASE.into(),
            from_email: DEFAULT_MAILBOX.into(),
            contact_email: DEFAULT_MAILBOX.into(),
            development: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Settings {
    pub fn posture(&self) -> Posture {
        if self.development {
            Posture::Development
        } else {
            Posture::Production
        }
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server_bind
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.server_bind))
    }

    pub fn mail_settings(&self) -> MailSettings {
        MailSettings {
            api_key: self.sendgrid_api_key.clone(),
            from_email: self.from_email.clone(),
            contact_email: self.contact_email.clone(),
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let file = fs::read_to_string("server.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Layers `server.toml` contents and then environment lookups over the defaults.
pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)
            .context("server.toml must be a flat table of string values")?;
        if let Some(v) = file_cfg.get("bind_addr") {
            settings.server_bind = v.clone();
        }
        if let Some(v) = file_cfg.get("sendgrid_api_key") {
            settings.sendgrid_api_key = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("sendgrid_api_url") {
            settings.sendgrid_api_url = v.clone();
        }
        if let Some(v) = non_blank(file_cfg.get("from_email").cloned()) {
            settings.from_email = v;
        }
        if let Some(v) = non_blank(file_cfg.get("contact_email").cloned()) {
            settings.contact_email = v;
        }
        if let Some(v) = file_cfg.get("environment") {
            settings.development = is_development(v);
        }
        if let Some(v) = file_cfg.get("max_body_bytes") {
            settings.max_body_bytes = parse_body_limit(v)?;
        }
    }

    let host = env("APP__HOST");
    let port = env("PORT");
    if host.is_some() || port.is_some() {
        let (default_host, default_port) = settings
            .server_bind
            .rsplit_once(':')
            .map(|(h, p)| (h.to_string(), p.to_string()))
            .unwrap_or_else(|| ("0.0.0.0".into(), "3000".into()));
        settings.server_bind = format!(
            "{}:{}",
            host.unwrap_or(default_host),
            port.unwrap_or(default_port)
        );
    }
    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("SENDGRID_API_KEY") {
        settings.sendgrid_api_key = Some(v);
    }
    if let Some(v) = env("SENDGRID_API_URL") {
        settings.sendgrid_api_url = v;
    }
    if let Some(v) = non_blank(env("SENDGRID_FROM_EMAIL")) {
        settings.from_email = v;
    }
    if let Some(v) = non_blank(env("CONTACT_EMAIL")) {
        settings.contact_email = v;
    }

    if let Some(v) = env("NODE_ENV") {
        settings.development = is_development(&v);
    }
    if let Some(v) = env("APP_ENV") {
        settings.development = is_development(&v);
    }

    if let Some(v) = env("APP__MAX_BODY_BYTES") {
        settings.max_body_bytes = parse_body_limit(&v)?;
    }

    Ok(settings)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn is_development(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("development")
}

fn parse_body_limit(raw: &str) -> anyhow::Result<usize> {
    raw.trim()
        .parse::<usize>()
        .with_context(|| format!("invalid max body size '{raw}'"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
