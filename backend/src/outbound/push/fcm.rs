//! Reqwest-backed FCM push adapter.
//!
//! One batch maps to one POST carrying every registration token. Responses
//! are inspected for the HTTP status only; per-token failures are ignored.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::ports::{PushBatch, PushError, PushNotifier};

pub const FCM_LEGACY_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    registration_ids: &'a [String],
    notification: FcmNotification<'a>,
}

impl<'a> FcmMessage<'a> {
    fn from_batch(batch: &'a PushBatch) -> Self {
        Self {
            registration_ids: &batch.device_tokens,
            notification: FcmNotification {
                title: &batch.title,
                body: &batch.body,
            },
        }
    }
}

/// Push adapter authenticating with a legacy server key.
pub struct FcmPushNotifier {
    client: Client,
    endpoint: Url,
    server_key: String,
}

impl FcmPushNotifier {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        server_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            server_key: server_key.into(),
        })
    }
}

#[async_trait]
impl PushNotifier for FcmPushNotifier {
    async fn send(&self, batch: &PushBatch) -> Result<(), PushError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                format!("key={}", self.server_key),
            )
            .json(&FcmMessage::from_batch(batch))
            .send()
            .await
            .map_err(|err| PushError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> PushError {
    const PREVIEW_CHAR_LIMIT: usize = 160;
    let preview: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let preview: String = preview.chars().take(PREVIEW_CHAR_LIMIT).collect();
    PushError::rejected(status.as_u16(), preview)
}
