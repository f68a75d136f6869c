//! Port for the fire-and-forget push notification sink.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by push notification adapters.
    pub enum PushError {
        /// The provider could not be reached or timed out.
        Transport { message: String } => "push transport failed: {message}",
        /// The provider answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "push provider rejected the batch with status {status}: {message}",
    }
}

/// One batched notification addressed to many devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushBatch {
    pub device_tokens: Vec<String>,
    pub title: String,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushNotifier: Send + Sync {
    /// Submit `batch` in a single provider call. Never retried.
    async fn send(&self, batch: &PushBatch) -> Result<(), PushError>;
}

/// Push sink used when no provider key is configured; drops every batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpPushNotifier;

#[async_trait]
impl PushNotifier for NoOpPushNotifier {
    async fn send(&self, batch: &PushBatch) -> Result<(), PushError> {
        tracing::debug!(
            recipients = batch.device_tokens.len(),
            "push provider not configured; dropping batch"
        );
        Ok(())
    }
}
