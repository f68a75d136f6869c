//! Mutex-guarded in-memory `BloodRequestRepository`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AppendOutcome, BloodRequestPersistenceError, BloodRequestRepository, RequestFilter,
};
use crate::domain::{BloodRequest, RequestId, RequestStatus, Responder};

/// Requests kept in insertion order; listings reverse it.
#[derive(Debug, Default)]
pub struct InMemoryBloodRequestRepository {
    requests: Mutex<Vec<BloodRequest>>,
}

impl InMemoryBloodRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<BloodRequest>>, BloodRequestPersistenceError> {
        self.requests
            .lock()
            .map_err(|_| BloodRequestPersistenceError::query("request store lock poisoned"))
    }
}

fn matches(filter: &RequestFilter, request: &BloodRequest) -> bool {
    match filter {
        RequestFilter::ActiveMatching { city, blood_group } => {
            request.status == RequestStatus::Active
                && request.city == *city
                && request.blood_group == *blood_group
        }
        RequestFilter::OwnedBy(hospital_id) => request.hospital_id == *hospital_id,
        RequestFilter::RespondedBy(donor_id) => request.has_responder(donor_id),
        RequestFilter::All => true,
    }
}

#[async_trait]
impl BloodRequestRepository for InMemoryBloodRequestRepository {
    async fn insert(&self, request: &BloodRequest) -> Result<(), BloodRequestPersistenceError> {
        self.lock()?.push(request.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &RequestId,
    ) -> Result<Option<BloodRequest>, BloodRequestPersistenceError> {
        Ok(self.lock()?.iter().find(|r| r.id == *id).cloned())
    }

    async fn list(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<BloodRequest>, BloodRequestPersistenceError> {
        let mut found: Vec<BloodRequest> = self
            .lock()?
            .iter()
            .rev()
            .filter(|request| matches(filter, request))
            .cloned()
            .collect();
        // Stable sort keeps later insertions first among equal timestamps.
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn append_responder(
        &self,
        id: &RequestId,
        responder: &Responder,
    ) -> Result<AppendOutcome, BloodRequestPersistenceError> {
        let mut requests = self.lock()?;
        let Some(request) = requests.iter_mut().find(|r| r.id == *id) else {
            return Ok(AppendOutcome::RequestMissing);
        };
        if request.has_responder(&responder.donor_id) {
            return Ok(AppendOutcome::AlreadyPresent);
        }
        request.responders.push(responder.clone());
        request.updated_at = responder.responded_at;
        Ok(AppendOutcome::Appended)
    }

    async fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, BloodRequestPersistenceError> {
        let mut requests = self.lock()?;
        match requests.iter_mut().find(|r| r.id == *id) {
            Some(request) => {
                request.status = status;
                request.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &RequestId) -> Result<bool, BloodRequestPersistenceError> {
        let mut requests = self.lock()?;
        let before = requests.len();
        requests.retain(|r| r.id != *id);
        Ok(requests.len() < before)
    }
}
