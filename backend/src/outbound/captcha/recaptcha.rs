//! Reqwest-backed reCAPTCHA `siteverify` adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::ports::{CaptchaError, CaptchaVerifier};

pub const RECAPTCHA_VERIFY_ENDPOINT: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
}

pub struct RecaptchaVerifier {
    client: Client,
    endpoint: Url,
    secret: String,
}

impl RecaptchaVerifier {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            secret: secret.into(),
        })
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|err| CaptchaError::transport(err.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| CaptchaError::transport(err.to_string()))?;
        parse_verdict(&body)
    }
}

fn parse_verdict(body: &[u8]) -> Result<bool, CaptchaError> {
    serde_json::from_slice::<SiteVerifyResponse>(body)
        .map(|decoded| decoded.success)
        .map_err(|err| CaptchaError::response(err.to_string()))
}
