//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BloodGroup, City, ProfileUpdate, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this email.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Storage for user accounts.
///
/// Emails are unique; adapters report collisions as
/// [`UserPersistenceError::DuplicateEmail`] rather than a generic query error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Write the profile columns of an existing user, mark the profile
    /// complete, and return the stored record.
    ///
    /// Columns outside the profile (credentials, device token) are left as
    /// stored. Returns `None` when no row matched the identifier.
    async fn update_profile(
        &self,
        id: &UserId,
        profile: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user whose id appears in `ids`, in no particular order.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Donors in `city` with `blood_group` and a registered device token.
    async fn find_donor_candidates(
        &self,
        city: &City,
        blood_group: BloodGroup,
    ) -> Result<Vec<User>, UserPersistenceError>;

    /// Store the push address for a user.
    ///
    /// Returns `false` when no row matched the identifier.
    async fn set_device_token(
        &self,
        id: &UserId,
        device_token: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError>;
}
