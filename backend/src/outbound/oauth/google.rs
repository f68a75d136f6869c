//! Google OAuth 2.0 authorisation-code adapter.
//!
//! The identity token is taken straight from the TLS token endpoint response
//! and decoded without signature verification.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Validation};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::ports::{ExternalIdentity, IdentityProvider, IdentityProviderError};

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "openid email profile";

/// Client registration used for the consent and token exchange calls.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    email: Option<String>,
    name: Option<String>,
}

pub struct GoogleIdentityProvider {
    client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleIdentityProvider {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: GoogleOAuthConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String, IdentityProviderError> {
        let url = Url::parse_with_params(
            AUTHORIZATION_ENDPOINT,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPE),
                ("prompt", "select_account"),
                ("state", state),
            ],
        )
        .map_err(|err| IdentityProviderError::exchange(err.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, IdentityProviderError> {
        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|err| IdentityProviderError::exchange(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityProviderError::exchange(format!(
                "token endpoint answered {}",
                status.as_u16()
            )));
        }
        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|err| IdentityProviderError::exchange(err.to_string()))?;
        let id_token = tokens
            .id_token
            .ok_or_else(|| IdentityProviderError::invalid_token("missing id_token"))?;
        decode_identity(&id_token)
    }
}

fn decode_identity(id_token: &str) -> Result<ExternalIdentity, IdentityProviderError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<IdTokenClaims>(
        id_token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .map_err(|err| IdentityProviderError::invalid_token(err.to_string()))?;
    Ok(ExternalIdentity {
        email: data.claims.email,
        name: data.claims.name,
    })
}
