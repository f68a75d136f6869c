//! Driving port for account mutations: registration, login, profile
//! completion, device tokens, and identity-provider sign-in.

use async_trait::async_trait;

use crate::domain::{
    Error, LoginCredentials, ProfileUpdate, Registration, SignInMode, User, UserId,
};

/// Bearer token plus the account it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Why an identity-provider sign-in did not produce a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialSignInRejection {
    /// The code exchange failed or the provider is not configured.
    ProviderFailed,
    /// The provider asserted no email address.
    MissingEmail,
    /// Login was requested for an email with no account.
    NoAccount,
    /// Signup was requested for an email that already has an account.
    AlreadyExists,
}

impl SocialSignInRejection {
    /// Query value appended to the front-end redirect.
    pub fn code(self) -> &'static str {
        match self {
            Self::ProviderFailed => "google_failed",
            Self::MissingEmail => "invalid_google_email",
            Self::NoAccount => "no_account",
            Self::AlreadyExists => "already_exists",
        }
    }
}

/// Result of an identity-provider callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocialSignInOutcome {
    SignedIn { token: String, mode: SignInMode },
    Rejected(SocialSignInRejection),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create a password account. Duplicate emails are rejected.
    async fn register(&self, registration: Registration) -> Result<UserId, Error>;

    /// Check credentials and issue a bearer token.
    ///
    /// When CAPTCHA is enabled `captcha_token` must be present and valid.
    async fn login(
        &self,
        credentials: LoginCredentials,
        captcha_token: Option<String>,
    ) -> Result<AuthSession, Error>;

    /// Set role and locale fields and mark the profile complete.
    async fn complete_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<AuthSession, Error>;

    /// Store the push notification address for `user_id`.
    async fn register_device_token(&self, user_id: &UserId, device_token: String)
    -> Result<(), Error>;

    /// Provider consent URL for the given sign-in mode.
    fn social_sign_in_url(&self, mode: SignInMode) -> Result<String, Error>;

    /// Complete an identity-provider callback.
    async fn social_sign_in(&self, code: &str, mode: SignInMode) -> SocialSignInOutcome;
}
