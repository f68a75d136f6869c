//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `LIFELINK_*` environment variables, configuration files,
//! or command-line flags. Every collaborator is optional; a missing value
//! selects the degraded adapter (in-memory stores, no push, no CAPTCHA, no
//! Google sign-in).

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Google OAuth client registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleClientSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
}

/// Runtime configuration for the LifeLink server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LIFELINK")]
pub struct LifelinkSettings {
    /// Socket address to listen on.
    #[ortho_config(default = DEFAULT_BIND_ADDR.to_owned())]
    pub bind_addr: String,
    /// PostgreSQL connection string. In-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Front-end origin used to build sign-in redirects.
    #[ortho_config(default = DEFAULT_BASE_URL.to_owned())]
    pub base_url: String,
    /// FCM legacy server key.
    pub fcm_server_key: Option<String>,
    /// Override for the FCM send endpoint.
    pub fcm_endpoint: Option<String>,
    /// reCAPTCHA secret; login skips CAPTCHA when absent.
    pub recaptcha_secret: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    /// Callback registered with Google, normally `<host>/api/auth/google`.
    pub google_redirect_uri: Option<String>,
    /// Origins allowed to open `/ws`, either a list or one comma-separated
    /// string.
    #[serde(default, deserialize_with = "origin_list")]
    pub ws_allowed_origins: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OriginList {
    Joined(String),
    Items(Vec<String>),
}

fn origin_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<OriginList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OriginList::Joined(raw)) => raw.split(',').map(str::to_owned).collect(),
        Some(OriginList::Items(items)) => items,
    };
    Ok(entries
        .into_iter()
        .map(|origin| origin.trim().to_owned())
        .filter(|origin| !origin.is_empty())
        .collect())
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

impl LifelinkSettings {
    /// Parsed listen address; a blank value falls back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = present(Some(&self.bind_addr)).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        present(self.database_url.as_ref())
    }

    /// Front-end origin; a blank value falls back to `http://localhost:3000`.
    pub fn base_url(&self) -> &str {
        present(Some(&self.base_url)).unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn fcm_server_key(&self) -> Option<&str> {
        present(self.fcm_server_key.as_ref())
    }

    pub fn fcm_endpoint(&self) -> Option<&str> {
        present(self.fcm_endpoint.as_ref())
    }

    pub fn recaptcha_secret(&self) -> Option<&str> {
        present(self.recaptcha_secret.as_ref())
    }

    /// Google client registration, present only when all three values are
    /// configured.
    pub fn google_client(&self) -> Option<GoogleClientSettings> {
        Some(GoogleClientSettings {
            client_id: present(self.google_client_id.as_ref())?.to_owned(),
            client_secret: present(self.google_client_secret.as_ref())?.to_owned(),
            redirect_uri: present(self.google_redirect_uri.as_ref())?.to_owned(),
        })
    }

    pub fn ws_allowed_origins(&self) -> &[String] {
        &self.ws_allowed_origins
    }
}
