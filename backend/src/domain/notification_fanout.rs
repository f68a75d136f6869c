//! Fan-out of request events to dashboards and donor devices.
//!
//! Delivery is best-effort and at-most-once. Every failure is logged and
//! swallowed so the operation that produced the event still succeeds.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::ports::{EventPublisher, PushBatch, PushNotifier};
use super::{BloodGroup, City, DonorMatcher, RequestEvent, Urgency};

const PUSH_TITLE: &str = "Urgent Blood Request";

/// Consumes [`RequestEvent`]s produced by the request service.
#[derive(Clone)]
pub struct NotificationFanout {
    publisher: Arc<dyn EventPublisher>,
    push: Arc<dyn PushNotifier>,
    matcher: DonorMatcher,
}

impl NotificationFanout {
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        push: Arc<dyn PushNotifier>,
        matcher: DonorMatcher,
    ) -> Self {
        Self {
            publisher,
            push,
            matcher,
        }
    }

    /// Broadcast `event` and, for new requests, push to matched donors.
    pub async fn dispatch(&self, event: &RequestEvent) {
        if let Err(err) = self.publisher.publish(event).await {
            warn!(
                event = event.name(),
                request_id = %event.request_id(),
                error = %err,
                "request event broadcast failed"
            );
        }

        if let RequestEvent::NewRequest {
            city,
            blood_group,
            urgency,
            ..
        } = event
        {
            self.push_to_candidates(city, *blood_group, *urgency).await;
        }
    }

    async fn push_to_candidates(&self, city: &City, blood_group: BloodGroup, urgency: Urgency) {
        let candidates = match self.matcher.find_candidates(city, blood_group).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(%city, %blood_group, error = %err, "donor candidate lookup failed");
                return;
            }
        };

        let device_tokens: Vec<String> = candidates
            .into_iter()
            .filter_map(|donor| donor.device_token)
            .collect();
        if device_tokens.is_empty() {
            debug!(%city, %blood_group, "no donors to notify");
            return;
        }

        let recipients = device_tokens.len();
        let batch = PushBatch {
            device_tokens,
            title: PUSH_TITLE.to_owned(),
            body: format!("{blood_group} needed in {city} ({urgency})"),
        };
        match self.push.send(&batch).await {
            Ok(()) => info!(recipients, "push notification sent to donors"),
            Err(err) => warn!(recipients, error = %err, "push notification failed"),
        }
    }
}
