//! Port for blood request persistence.
//!
//! The responder append is the only mutation that must be atomic across
//! concurrent callers: two concurrent responses from the same donor must
//! yield exactly one stored responder. Adapters enforce this with a unique
//! key or a single critical section, never with a read followed by a write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BloodGroup, BloodRequest, City, RequestId, RequestStatus, Responder, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blood request repository adapters.
    pub enum BloodRequestPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "blood request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "blood request repository query failed: {message}",
    }
}

/// Selection applied when listing requests. Results are always newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFilter {
    /// Active requests whose city and blood group match exactly.
    ActiveMatching {
        city: City,
        blood_group: BloodGroup,
    },
    /// Requests owned by a hospital, any status.
    OwnedBy(UserId),
    /// Requests a donor has responded to, any status.
    RespondedBy(UserId),
    /// Every request.
    All,
}

/// Result of an atomic responder append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The donor was added to the responder list.
    Appended,
    /// The donor was already present; nothing changed.
    AlreadyPresent,
    /// No request exists with the given identifier.
    RequestMissing,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BloodRequestRepository: Send + Sync {
    /// Persist a freshly opened request.
    async fn insert(&self, request: &BloodRequest) -> Result<(), BloodRequestPersistenceError>;

    /// Fetch a request together with its responders.
    async fn find_by_id(
        &self,
        id: &RequestId,
    ) -> Result<Option<BloodRequest>, BloodRequestPersistenceError>;

    /// List requests matching `filter`, newest first.
    async fn list(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<BloodRequest>, BloodRequestPersistenceError>;

    /// Append `responder` unless that donor already responded.
    async fn append_responder(
        &self,
        id: &RequestId,
        responder: &Responder,
    ) -> Result<AppendOutcome, BloodRequestPersistenceError>;

    /// Overwrite the status. Returns `false` when the request is missing.
    async fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, BloodRequestPersistenceError>;

    /// Hard-delete a request and its responders. Returns `false` when the
    /// request is missing.
    async fn delete(&self, id: &RequestId) -> Result<bool, BloodRequestPersistenceError>;
}
