//! Port for issuing and verifying bearer tokens.

use crate::domain::TokenClaims;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The token is malformed, expired, or its signature does not match.
        Invalid => "token is invalid or expired",
        /// The adapter could not produce a token.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Opaque bearer token signer and verifier.
///
/// Verification fails closed: every rejection maps to
/// [`TokenError::Invalid`] and carries no detail about the cause.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign `claims` into a bearer token string.
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError>;

    /// Verify `token` and decode its claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
