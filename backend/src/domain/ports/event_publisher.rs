//! Port for the publish/subscribe real-time channel.

use async_trait::async_trait;

use crate::domain::RequestEvent;

use super::define_port_error;

define_port_error! {
    /// Errors raised by event publisher adapters.
    pub enum PublishError {
        /// The event could not be handed to the channel.
        Channel { message: String } => "event channel publish failed: {message}",
    }
}

/// Publishes request events to every subscribed dashboard.
///
/// Publishing with zero subscribers succeeds.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &RequestEvent) -> Result<(), PublishError>;
}
