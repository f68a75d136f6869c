//! Domain events emitted by the request lifecycle.
//!
//! Events stay transport agnostic; the WebSocket adapter wraps them in a
//! channel envelope and the push fan-out reacts to [`RequestEvent::NewRequest`].

use serde::Serialize;

use super::blood_request::{RequestId, RequestStatus, Urgency};
use super::user::{BloodGroup, City, DonorSummary};

/// Broadcast channel every request event is published on.
pub const REQUEST_CHANNEL: &str = "blood-requests";

/// State change on a blood request.
///
/// Serialises as `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum RequestEvent {
    #[serde(rename = "new-request")]
    NewRequest {
        request_id: RequestId,
        city: City,
        blood_group: BloodGroup,
        urgency: Urgency,
        hospital_name: Option<String>,
    },
    #[serde(rename = "donor-responded")]
    DonorResponded {
        request_id: RequestId,
        donor: DonorSummary,
    },
    #[serde(rename = "status-change")]
    StatusChanged {
        request_id: RequestId,
        status: RequestStatus,
    },
    #[serde(rename = "delete-request")]
    Deleted { request_id: RequestId },
}

impl RequestEvent {
    /// Event discriminator as seen by subscribers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewRequest { .. } => "new-request",
            Self::DonorResponded { .. } => "donor-responded",
            Self::StatusChanged { .. } => "status-change",
            Self::Deleted { .. } => "delete-request",
        }
    }

    /// Request the event refers to.
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::NewRequest { request_id, .. }
            | Self::DonorResponded { request_id, .. }
            | Self::StatusChanged { request_id, .. }
            | Self::Deleted { request_id } => *request_id,
        }
    }
}
