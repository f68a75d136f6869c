//! Driving port for blood request reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BloodRequest, DonorSummary, Error, HospitalSummary, RequestId, UserId};

/// Which requests a listing should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Active requests matching a donor's city and blood group. Missing
    /// values fall back to the caller's stored profile.
    Donor {
        city: Option<String>,
        blood_group: Option<String>,
    },
    /// The calling hospital's own requests.
    Hospital,
    /// Every request.
    All,
}

impl ListScope {
    /// Interpret the `role` query parameter.
    pub fn from_role(
        role: Option<&str>,
        city: Option<String>,
        blood_group: Option<String>,
    ) -> Self {
        match role {
            Some("donor") => Self::Donor { city, blood_group },
            Some("hospital") => Self::Hospital,
            _ => Self::All,
        }
    }
}

/// A request with its owning hospital resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestListing {
    pub request: BloodRequest,
    pub hospital: Option<HospitalSummary>,
    /// Whether the caller appears among the responders.
    pub responded: bool,
}

/// A responder with the donor's profile resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderView {
    pub donor: Option<DonorSummary>,
    pub responded_at: DateTime<Utc>,
}

/// A hospital's request with every responder resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HospitalHistoryEntry {
    pub request: BloodRequest,
    pub responders: Vec<ResponderView>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BloodRequestQuery: Send + Sync {
    /// List requests for the dashboard, newest first.
    async fn list(&self, caller: &UserId, scope: ListScope) -> Result<Vec<RequestListing>, Error>;

    /// Responders of a request, for hospitals only.
    async fn responders(
        &self,
        caller: &UserId,
        request_id: &RequestId,
    ) -> Result<Vec<ResponderView>, Error>;

    /// Requests the calling donor responded to, newest first.
    async fn donor_history(&self, caller: &UserId) -> Result<Vec<RequestListing>, Error>;

    /// The calling hospital's requests with responders, newest first.
    async fn hospital_history(&self, caller: &UserId) -> Result<Vec<HospitalHistoryEntry>, Error>;
}
