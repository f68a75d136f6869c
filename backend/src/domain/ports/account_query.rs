//! Driving port for account reads.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Load the authenticated user's record; `NotFound` when it is gone.
    async fn current_user(&self, user_id: &UserId) -> Result<User, Error>;
}
