//! Port for the OAuth identity provider used by social sign-in.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// Client credentials are not configured.
        NotConfigured => "identity provider is not configured",
        /// The authorisation code exchange failed.
        Exchange { message: String } => "identity provider code exchange failed: {message}",
        /// The returned identity token could not be decoded.
        InvalidToken { message: String } => "identity token is invalid: {message}",
    }
}

/// Identity asserted by the provider after a successful exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider consent URL carrying `state` through the round trip.
    fn authorization_url(&self, state: &str) -> Result<String, IdentityProviderError>;

    /// Exchange an authorisation `code` for the caller's identity.
    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, IdentityProviderError>;
}

/// Provider used when no client credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredIdentityProvider;

#[async_trait]
impl IdentityProvider for UnconfiguredIdentityProvider {
    fn authorization_url(&self, _state: &str) -> Result<String, IdentityProviderError> {
        Err(IdentityProviderError::NotConfigured)
    }

    async fn exchange_code(&self, _code: &str) -> Result<ExternalIdentity, IdentityProviderError> {
        Err(IdentityProviderError::NotConfigured)
    }
}
