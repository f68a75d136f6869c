//! In-process publish/subscribe hub for request events.
//!
//! A Tokio broadcast channel fans each published event out to every live
//! WebSocket session. Slow subscribers lose the oldest events rather than
//! blocking publishers.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::RequestEvent;
use crate::domain::ports::{EventPublisher, PublishError};

/// Events buffered per subscriber before it starts lagging.
pub const DEFAULT_HUB_CAPACITY: usize = 256;

/// Cloneable handle onto the shared broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    sender: broadcast::Sender<RequestEvent>,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new subscriber that sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for BroadcastHub {
    async fn publish(&self, event: &RequestEvent) -> Result<(), PublishError> {
        match self.sender.send(event.clone()) {
            Ok(receivers) => debug!(event = event.name(), receivers, "request event broadcast"),
            // No subscribers is not a failure.
            Err(_) => debug!(event = event.name(), "request event broadcast without subscribers"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequestId;
    use rstest::rstest;

    fn deleted() -> RequestEvent {
        RequestEvent::Deleted {
            request_id: RequestId::random(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn publishing_without_subscribers_succeeds() {
        let hub = BroadcastHub::default();
        hub.publish(&deleted()).await.expect("publish succeeds");
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn every_subscriber_receives_the_event() {
        let hub = BroadcastHub::default();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        let event = deleted();

        hub.publish(&event).await.expect("publish succeeds");

        assert_eq!(first.recv().await.expect("first receives"), event);
        assert_eq!(second.recv().await.expect("second receives"), event);
    }

    #[rstest]
    #[tokio::test]
    async fn slow_subscribers_lag_instead_of_blocking() {
        let hub = BroadcastHub::new(1);
        let mut receiver = hub.subscribe();

        hub.publish(&deleted()).await.expect("publish");
        let latest = deleted();
        hub.publish(&latest).await.expect("publish");

        assert!(matches!(
            receiver.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(receiver.recv().await.expect("latest kept"), latest);
    }
}
