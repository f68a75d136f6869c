//! Candidate donor selection for a newly opened request.

use std::sync::Arc;

use super::ports::{UserPersistenceError, UserRepository};
use super::{BloodGroup, City, Error, Role, User};

/// Finds donors who should be notified about a request.
///
/// A candidate is a donor whose normalised city and blood group equal the
/// request's and who has a non-empty device token. Matching is exact.
#[derive(Clone)]
pub struct DonorMatcher {
    users: Arc<dyn UserRepository>,
}

impl DonorMatcher {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Query candidate donors for `city` and `blood_group`.
    pub async fn find_candidates(
        &self,
        city: &City,
        blood_group: BloodGroup,
    ) -> Result<Vec<User>, Error> {
        let users = self
            .users
            .find_donor_candidates(city, blood_group)
            .await
            .map_err(map_user_error)?;
        // The recipient set never exceeds the exact-match predicate.
        Ok(users
            .into_iter()
            .filter(|user| {
                user.has_role(Role::Donor)
                    && user.city.as_ref() == Some(city)
                    && user.blood_group == Some(blood_group)
                    && user
                        .device_token
                        .as_deref()
                        .is_some_and(|token| !token.trim().is_empty())
            })
            .collect())
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::invalid_request("Email already registered")
        }
    }
}
