//! Blood request domain service.
//!
//! Implements the request driving ports: hospitals open and manage requests,
//! donors respond, and dashboards list them. Role checks read the role stored
//! on the caller's record. Each successful mutation hands a [`RequestEvent`]
//! to the [`NotificationFanout`]; fan-out never fails the mutation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::donor_matcher::map_user_error;
use super::ports::{
    AppendOutcome, BloodRequestCommand, BloodRequestPersistenceError, BloodRequestQuery,
    BloodRequestRepository, HospitalHistoryEntry, ListScope, RequestFilter, RequestListing,
    RespondOutcome, ResponderView, UserRepository,
};
use super::{
    BloodGroup, BloodRequest, City, Error, NotificationFanout, RequestDraft, RequestEvent,
    RequestId, RequestStatus, Responder, Role, User, UserId,
};

/// Blood request service implementing the driving ports.
#[derive(Clone)]
pub struct BloodRequestService {
    users: Arc<dyn UserRepository>,
    requests: Arc<dyn BloodRequestRepository>,
    fanout: NotificationFanout,
    clock: Arc<dyn Clock>,
}

impl BloodRequestService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        requests: Arc<dyn BloodRequestRepository>,
        fanout: NotificationFanout,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            requests,
            fanout,
            clock,
        }
    }

    async fn load_caller(&self, caller: &UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(caller).await.map_err(map_user_error)
    }

    /// Load the caller and require `role`, reporting `denied` otherwise.
    async fn require_role(
        &self,
        caller: &UserId,
        role: Role,
        denied: &'static str,
    ) -> Result<User, Error> {
        match self.load_caller(caller).await? {
            Some(user) if user.has_role(role) => Ok(user),
            _ => Err(Error::forbidden(denied)),
        }
    }

    async fn load_owned(
        &self,
        hospital: &User,
        request_id: &RequestId,
        denied: &'static str,
    ) -> Result<BloodRequest, Error> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await
            .map_err(map_request_error)?
            .ok_or_else(request_not_found)?;
        if !request.is_owned_by(&hospital.id) {
            return Err(Error::forbidden(denied));
        }
        Ok(request)
    }

    async fn hospitals_for(
        &self,
        requests: &[BloodRequest],
    ) -> Result<HashMap<UserId, User>, Error> {
        let mut ids: Vec<UserId> = requests.iter().map(|r| r.hospital_id).collect();
        ids.sort_unstable_by_key(|id| *id.as_uuid());
        ids.dedup();
        self.users_by_id(&ids).await
    }

    async fn users_by_id(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self
            .users
            .find_by_ids(ids)
            .await
            .map_err(map_user_error)?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }

    async fn listings(
        &self,
        requests: Vec<BloodRequest>,
        caller: &UserId,
    ) -> Result<Vec<RequestListing>, Error> {
        let hospitals = self.hospitals_for(&requests).await?;
        Ok(requests
            .into_iter()
            .map(|request| RequestListing {
                hospital: hospitals
                    .get(&request.hospital_id)
                    .map(User::hospital_summary),
                responded: request.has_responder(caller),
                request,
            })
            .collect())
    }

    async fn resolve_responders(
        &self,
        responders: &[Responder],
    ) -> Result<Vec<ResponderView>, Error> {
        let ids: Vec<UserId> = responders.iter().map(|r| r.donor_id).collect();
        let donors = self.users_by_id(&ids).await?;
        Ok(responder_views(responders, &donors))
    }

    fn donor_filter(
        caller: Option<&User>,
        city: Option<String>,
        blood_group: Option<String>,
    ) -> Option<RequestFilter> {
        let city = match city.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => City::new(raw).ok()?,
            None => caller.and_then(|user| user.city.clone())?,
        };
        let blood_group = match blood_group.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => BloodGroup::parse(&raw).ok()?,
            None => caller.and_then(|user| user.blood_group)?,
        };
        Some(RequestFilter::ActiveMatching { city, blood_group })
    }
}

fn responder_views(
    responders: &[Responder],
    donors: &HashMap<UserId, User>,
) -> Vec<ResponderView> {
    responders
        .iter()
        .map(|responder| ResponderView {
            donor: donors.get(&responder.donor_id).map(User::donor_summary),
            responded_at: responder.responded_at,
        })
        .collect()
}

fn request_not_found() -> Error {
    Error::not_found("Request not found")
}

fn map_request_error(error: BloodRequestPersistenceError) -> Error {
    match error {
        BloodRequestPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("request repository unavailable: {message}"))
        }
        BloodRequestPersistenceError::Query { message } => {
            Error::internal(format!("request repository error: {message}"))
        }
    }
}

#[async_trait]
impl BloodRequestCommand for BloodRequestService {
    async fn create(&self, caller: &UserId, draft: RequestDraft) -> Result<RequestId, Error> {
        let hospital = self
            .require_role(caller, Role::Hospital, "Only hospitals can create requests")
            .await?;
        let city = hospital
            .city
            .clone()
            .or_else(|| draft.city.clone())
            .ok_or_else(|| Error::invalid_request("City is required"))?;

        let request = BloodRequest::open(hospital.id, city, draft, self.clock.utc());
        self.requests
            .insert(&request)
            .await
            .map_err(map_request_error)?;
        info!(
            request_id = %request.id,
            city = %request.city,
            blood_group = %request.blood_group,
            "blood request created"
        );

        self.fanout
            .dispatch(&RequestEvent::NewRequest {
                request_id: request.id,
                city: request.city.clone(),
                blood_group: request.blood_group,
                urgency: request.urgency,
                hospital_name: hospital.hospital_name.clone(),
            })
            .await;
        Ok(request.id)
    }

    async fn respond(
        &self,
        caller: &UserId,
        request_id: &RequestId,
    ) -> Result<RespondOutcome, Error> {
        let donor = self
            .require_role(caller, Role::Donor, "Only donors can respond")
            .await?;
        let responder = Responder {
            donor_id: donor.id,
            responded_at: self.clock.utc(),
        };
        let outcome = self
            .requests
            .append_responder(request_id, &responder)
            .await
            .map_err(map_request_error)?;

        match outcome {
            AppendOutcome::RequestMissing => Err(request_not_found()),
            AppendOutcome::AlreadyPresent => Ok(RespondOutcome {
                already_responded: true,
            }),
            AppendOutcome::Appended => {
                self.fanout
                    .dispatch(&RequestEvent::DonorResponded {
                        request_id: *request_id,
                        donor: donor.donor_summary(),
                    })
                    .await;
                Ok(RespondOutcome {
                    already_responded: false,
                })
            }
        }
    }

    async fn set_status(
        &self,
        caller: &UserId,
        request_id: &RequestId,
        status: RequestStatus,
    ) -> Result<(), Error> {
        let hospital = self
            .require_role(caller, Role::Hospital, "Only hospitals can modify status")
            .await?;
        self.load_owned(&hospital, request_id, "Not allowed: not your request")
            .await?;
        let updated = self
            .requests
            .update_status(request_id, status, self.clock.utc())
            .await
            .map_err(map_request_error)?;
        if !updated {
            return Err(request_not_found());
        }

        self.fanout
            .dispatch(&RequestEvent::StatusChanged {
                request_id: *request_id,
                status,
            })
            .await;
        Ok(())
    }

    async fn delete(&self, caller: &UserId, request_id: &RequestId) -> Result<(), Error> {
        let hospital = self
            .require_role(caller, Role::Hospital, "Only hospitals can delete requests")
            .await?;
        self.load_owned(
            &hospital,
            request_id,
            "Not allowed: this request does not belong to your hospital",
        )
        .await?;
        let deleted = self
            .requests
            .delete(request_id)
            .await
            .map_err(map_request_error)?;
        if !deleted {
            return Err(request_not_found());
        }

        self.fanout
            .dispatch(&RequestEvent::Deleted {
                request_id: *request_id,
            })
            .await;
        Ok(())
    }
}

#[async_trait]
impl BloodRequestQuery for BloodRequestService {
    async fn list(&self, caller: &UserId, scope: ListScope) -> Result<Vec<RequestListing>, Error> {
        let filter = match scope {
            ListScope::Donor { city, blood_group } => {
                let profile = self.load_caller(caller).await?;
                match Self::donor_filter(profile.as_ref(), city, blood_group) {
                    Some(filter) => filter,
                    None => return Ok(Vec::new()),
                }
            }
            ListScope::Hospital => RequestFilter::OwnedBy(*caller),
            ListScope::All => RequestFilter::All,
        };
        let requests = self
            .requests
            .list(&filter)
            .await
            .map_err(map_request_error)?;
        self.listings(requests, caller).await
    }

    async fn responders(
        &self,
        caller: &UserId,
        request_id: &RequestId,
    ) -> Result<Vec<ResponderView>, Error> {
        self.require_role(caller, Role::Hospital, "Only hospitals can view responders")
            .await?;
        let request = self
            .requests
            .find_by_id(request_id)
            .await
            .map_err(map_request_error)?
            .ok_or_else(request_not_found)?;
        self.resolve_responders(&request.responders).await
    }

    async fn donor_history(&self, caller: &UserId) -> Result<Vec<RequestListing>, Error> {
        self.require_role(caller, Role::Donor, "Only donors can view this")
            .await?;
        let requests = self
            .requests
            .list(&RequestFilter::RespondedBy(*caller))
            .await
            .map_err(map_request_error)?;
        self.listings(requests, caller).await
    }

    async fn hospital_history(&self, caller: &UserId) -> Result<Vec<HospitalHistoryEntry>, Error> {
        self.require_role(caller, Role::Hospital, "Only hospitals can view this")
            .await?;
        let requests = self
            .requests
            .list(&RequestFilter::OwnedBy(*caller))
            .await
            .map_err(map_request_error)?;

        let mut donor_ids: Vec<UserId> = requests
            .iter()
            .flat_map(|request| request.responders.iter().map(|r| r.donor_id))
            .collect();
        donor_ids.sort_unstable_by_key(|id| *id.as_uuid());
        donor_ids.dedup();
        let donors = self.users_by_id(&donor_ids).await?;

        Ok(requests
            .into_iter()
            .map(|request| HospitalHistoryEntry {
                responders: responder_views(&request.responders, &donors),
                request,
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "request_service_tests.rs"]
mod tests;
