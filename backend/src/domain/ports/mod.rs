//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_query;
mod blood_request_command;
mod blood_request_query;
mod blood_request_repository;
mod captcha_verifier;
mod event_publisher;
mod identity_provider;
mod password_hasher;
mod push_notifier;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{
    AccountCommand, AuthSession, SocialSignInOutcome, SocialSignInRejection,
};
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use blood_request_command::MockBloodRequestCommand;
pub use blood_request_command::{BloodRequestCommand, RespondOutcome};
#[cfg(test)]
pub use blood_request_query::MockBloodRequestQuery;
pub use blood_request_query::{
    BloodRequestQuery, HospitalHistoryEntry, ListScope, RequestListing, ResponderView,
};
#[cfg(test)]
pub use blood_request_repository::MockBloodRequestRepository;
pub use blood_request_repository::{
    AppendOutcome, BloodRequestPersistenceError, BloodRequestRepository, RequestFilter,
};
#[cfg(test)]
pub use captcha_verifier::MockCaptchaVerifier;
pub use captcha_verifier::{CaptchaError, CaptchaVerifier};
#[cfg(test)]
pub use event_publisher::MockEventPublisher;
pub use event_publisher::{EventPublisher, PublishError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{
    ExternalIdentity, IdentityProvider, IdentityProviderError, UnconfiguredIdentityProvider,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use push_notifier::MockPushNotifier;
pub use push_notifier::{NoOpPushNotifier, PushBatch, PushError, PushNotifier};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
