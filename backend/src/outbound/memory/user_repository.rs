//! Mutex-guarded in-memory `UserRepository`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{BloodGroup, City, ProfileUpdate, Role, User, UserId};

/// Users kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<User>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        profile: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut users = self.lock()?;
        Ok(users.iter_mut().find(|user| user.id == *id).map(|user| {
            user.complete_profile(profile.clone(), at);
            user.clone()
        }))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.iter().find(|user| user.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .find(|user| user.email.as_ref() == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn find_donor_candidates(
        &self,
        city: &City,
        blood_group: BloodGroup,
    ) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|user| {
                user.has_role(Role::Donor)
                    && user.city.as_ref() == Some(city)
                    && user.blood_group == Some(blood_group)
                    && user.device_token.is_some()
            })
            .cloned()
            .collect())
    }

    async fn set_device_token(
        &self,
        id: &UserId,
        device_token: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError> {
        let mut users = self.lock()?;
        match users.iter_mut().find(|user| user.id == *id) {
            Some(user) => {
                user.device_token = Some(device_token.to_owned());
                user.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmailAddress;
    use rstest::{fixture, rstest};

    fn user(email: &str) -> User {
        User::new(
            "Test",
            EmailAddress::new(email).expect("email"),
            Utc::now(),
        )
    }

    #[fixture]
    fn repo() -> InMemoryUserRepository {
        InMemoryUserRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_emails_are_rejected(repo: InMemoryUserRepository) {
        repo.insert(&user("asha@example.com")).await.expect("first insert");
        let err = repo
            .insert(&user("asha@example.com"))
            .await
            .expect_err("duplicate rejected");
        assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn email_lookup_is_case_sensitive(repo: InMemoryUserRepository) {
        repo.insert(&user("Asha@example.com")).await.expect("insert");
        assert!(repo
            .find_by_email("asha@example.com")
            .await
            .expect("lookup")
            .is_none());
        assert!(repo
            .find_by_email("Asha@example.com")
            .await
            .expect("lookup")
            .is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn device_token_updates_report_missing_users(repo: InMemoryUserRepository) {
        let stored = user("asha@example.com");
        repo.insert(&stored).await.expect("insert");

        let at = Utc::now();
        assert!(repo
            .set_device_token(&stored.id, "tok", at)
            .await
            .expect("update"));
        assert!(!repo
            .set_device_token(&UserId::random(), "tok", at)
            .await
            .expect("update"));
        let reloaded = repo.find_by_id(&stored.id).await.expect("lookup");
        let reloaded = reloaded.expect("user stored");
        assert_eq!(reloaded.device_token.as_deref(), Some("tok"));
        assert_eq!(reloaded.updated_at, at);
    }

    #[rstest]
    #[tokio::test]
    async fn profile_update_keeps_device_token(repo: InMemoryUserRepository) {
        let stored = user("ravi@example.com");
        repo.insert(&stored).await.expect("insert");
        repo.set_device_token(&stored.id, "tok", Utc::now())
            .await
            .expect("token stored");

        let profile = ProfileUpdate {
            role: Role::Donor,
            city: Some(City::new("Pune").expect("city")),
            state: None,
            pincode: None,
            address: None,
            blood_group: Some(BloodGroup::BPositive),
            hospital_name: Some("ignored".to_owned()),
            contact_number: None,
        };
        let updated = repo
            .update_profile(&stored.id, &profile, Utc::now())
            .await
            .expect("update")
            .expect("user found");

        assert!(updated.profile_completed);
        assert_eq!(updated.device_token.as_deref(), Some("tok"));
        assert!(updated.hospital_name.is_none());
        assert!(repo
            .update_profile(&UserId::random(), &profile, Utc::now())
            .await
            .expect("update")
            .is_none());
    }
}
