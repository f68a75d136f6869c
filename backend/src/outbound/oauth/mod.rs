//! OAuth identity provider adapters.

mod google;

pub use google::{GoogleIdentityProvider, GoogleOAuthConfig};
