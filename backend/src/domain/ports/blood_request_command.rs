//! Driving port for blood request mutations.
//!
//! Every operation takes the caller's user id; role checks use the role
//! stored on the caller's record rather than any token claim.

use async_trait::async_trait;

use crate::domain::{Error, RequestDraft, RequestId, RequestStatus, UserId};

/// Outcome of a donor response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespondOutcome {
    pub already_responded: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BloodRequestCommand: Send + Sync {
    /// Open a request on behalf of a hospital.
    async fn create(&self, caller: &UserId, draft: RequestDraft) -> Result<RequestId, Error>;

    /// Record a donor response. Idempotent per donor.
    async fn respond(&self, caller: &UserId, request_id: &RequestId)
    -> Result<RespondOutcome, Error>;

    /// Change the status of a request the caller owns.
    async fn set_status(
        &self,
        caller: &UserId,
        request_id: &RequestId,
        status: RequestStatus,
    ) -> Result<(), Error>;

    /// Hard-delete a request the caller owns.
    async fn delete(&self, caller: &UserId, request_id: &RequestId) -> Result<(), Error>;
}
