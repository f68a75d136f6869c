//! Port for CAPTCHA token verification.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by CAPTCHA adapters.
    pub enum CaptchaError {
        /// The verification service could not be reached.
        Transport { message: String } => "captcha verification request failed: {message}",
        /// The verification service returned an unreadable answer.
        Response { message: String } => "captcha verification response invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Ask the provider whether `token` is a valid solved challenge.
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError>;
}
