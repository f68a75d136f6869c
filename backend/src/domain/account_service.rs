//! Account domain service.
//!
//! Implements the account driving ports on top of the user repository,
//! password hasher, token signer, CAPTCHA verifier, and identity provider.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::donor_matcher::map_user_error;
use super::ports::{
    AccountCommand, AccountQuery, AuthSession, CaptchaVerifier, IdentityProvider,
    IdentityProviderError, PasswordHasher, SocialSignInOutcome, SocialSignInRejection,
    TokenService, UserRepository,
};
use super::{
    EmailAddress, Error, LoginCredentials, ProfileUpdate, Registration, SignInMode, TokenClaims,
    User, UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const CAPTCHA_FAILED: &str = "Captcha verification failed";

/// Collaborators wired into [`AccountService`].
#[derive(Clone)]
pub struct AccountServiceDeps {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    /// `None` disables the login CAPTCHA check.
    pub captcha: Option<Arc<dyn CaptchaVerifier>>,
    pub identity: Arc<dyn IdentityProvider>,
    pub clock: Arc<dyn Clock>,
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService {
    deps: AccountServiceDeps,
}

impl AccountService {
    pub fn new(deps: AccountServiceDeps) -> Self {
        Self { deps }
    }

    fn issue_session(&self, user: User) -> Result<AuthSession, Error> {
        let token = self
            .deps
            .tokens
            .issue(&TokenClaims::for_user(&user))
            .map_err(|err| Error::internal(format!("token issue failed: {err}")))?;
        Ok(AuthSession { token, user })
    }

    async fn check_captcha(&self, captcha_token: Option<String>) -> Result<(), Error> {
        let Some(verifier) = &self.deps.captcha else {
            return Ok(());
        };
        let token = captcha_token
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| Error::invalid_request(CAPTCHA_FAILED))?;
        match verifier.verify(&token).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::invalid_request(CAPTCHA_FAILED)),
            Err(err) => {
                warn!(error = %err, "captcha verification unavailable");
                Err(Error::invalid_request(CAPTCHA_FAILED))
            }
        }
    }

    async fn load_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.deps
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)
    }

    async fn resolve_social(
        &self,
        code: &str,
        mode: SignInMode,
    ) -> Result<User, SocialSignInRejection> {
        let identity = self
            .deps
            .identity
            .exchange_code(code)
            .await
            .map_err(|err| {
                match err {
                    IdentityProviderError::NotConfigured => {
                        warn!("identity provider sign-in attempted without configuration");
                    }
                    other => warn!(error = %other, "identity provider exchange failed"),
                }
                SocialSignInRejection::ProviderFailed
            })?;

        let email = identity
            .email
            .as_deref()
            .and_then(|raw| EmailAddress::new(raw).ok())
            .ok_or(SocialSignInRejection::MissingEmail)?;
        let existing = self
            .deps
            .users
            .find_by_email(email.as_ref())
            .await
            .map_err(|err| {
                warn!(error = %err, "user lookup failed during social sign-in");
                SocialSignInRejection::ProviderFailed
            })?;

        match (mode, existing) {
            (SignInMode::Login, Some(user)) => Ok(user),
            (SignInMode::Login, None) => Err(SocialSignInRejection::NoAccount),
            (SignInMode::Signup, Some(_)) => Err(SocialSignInRejection::AlreadyExists),
            (SignInMode::Signup, None) => {
                let name = identity
                    .name
                    .map(|raw| raw.trim().to_owned())
                    .filter(|trimmed| !trimmed.is_empty())
                    .unwrap_or_else(|| email.local_part().to_owned());
                let user = User::new(name, email, self.deps.clock.utc());
                self.deps.users.insert(&user).await.map_err(|err| {
                    warn!(error = %err, "social sign-up insert failed");
                    SocialSignInRejection::ProviderFailed
                })?;
                info!(user_id = %user.id, "account created through identity provider");
                Ok(user)
            }
        }
    }
}

fn user_not_found() -> Error {
    Error::not_found("User not found")
}

#[async_trait]
impl AccountCommand for AccountService {
    async fn register(&self, registration: Registration) -> Result<UserId, Error> {
        let existing = self
            .deps
            .users
            .find_by_email(registration.email.as_ref())
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::invalid_request("Email already registered"));
        }

        let password_hash = self
            .deps
            .hasher
            .hash(registration.password())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;

        let Registration {
            name,
            email,
            role,
            blood_group,
            city,
            hospital_name,
            contact_number,
            ..
        } = registration;
        let mut user = User::new(name, email, self.deps.clock.utc());
        user.password_hash = Some(password_hash);
        user.role = Some(role);
        user.blood_group = blood_group;
        user.city = city;
        user.hospital_name = hospital_name;
        user.contact_number = contact_number;

        self.deps
            .users
            .insert(&user)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, role = %role, "account registered");
        Ok(user.id)
    }

    async fn login(
        &self,
        credentials: LoginCredentials,
        captcha_token: Option<String>,
    ) -> Result<AuthSession, Error> {
        self.check_captcha(captcha_token).await?;

        let user = self
            .deps
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        let Some(stored_hash) = user.password_hash.as_deref() else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .deps
            .hasher
            .verify(credentials.password(), stored_hash)
            .map_err(|err| Error::internal(format!("password verification failed: {err}")))?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        self.issue_session(user)
    }

    async fn complete_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<AuthSession, Error> {
        let profile = update.scoped_to_role();
        let user = self
            .deps
            .users
            .update_profile(user_id, &profile, self.deps.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)?;
        info!(user_id = %user.id, "profile completed");
        self.issue_session(user)
    }

    async fn register_device_token(
        &self,
        user_id: &UserId,
        device_token: String,
    ) -> Result<(), Error> {
        let token = device_token.trim();
        if token.is_empty() {
            return Err(Error::invalid_request("Missing device token"));
        }
        let stored = self
            .deps
            .users
            .set_device_token(user_id, token, self.deps.clock.utc())
            .await
            .map_err(map_user_error)?;
        if !stored {
            return Err(user_not_found());
        }
        Ok(())
    }

    fn social_sign_in_url(&self, mode: SignInMode) -> Result<String, Error> {
        self.deps
            .identity
            .authorization_url(mode.as_str())
            .map_err(|err| match err {
                IdentityProviderError::NotConfigured => {
                    Error::service_unavailable("Google sign-in is not configured")
                }
                other => Error::internal(other.to_string()),
            })
    }

    async fn social_sign_in(&self, code: &str, mode: SignInMode) -> SocialSignInOutcome {
        let user = match self.resolve_social(code, mode).await {
            Ok(user) => user,
            Err(rejection) => return SocialSignInOutcome::Rejected(rejection),
        };
        match self.issue_session(user) {
            Ok(session) => SocialSignInOutcome::SignedIn {
                token: session.token,
                mode,
            },
            Err(err) => {
                warn!(error = %err, "token issue failed during social sign-in");
                SocialSignInOutcome::Rejected(SocialSignInRejection::ProviderFailed)
            }
        }
    }
}

#[async_trait]
impl AccountQuery for AccountService {
    async fn current_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.load_user(user_id).await
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
