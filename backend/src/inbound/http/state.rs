//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, BloodRequestCommand, BloodRequestQuery, TokenService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub requests: Arc<dyn BloodRequestCommand>,
    pub requests_query: Arc<dyn BloodRequestQuery>,
    pub tokens: Arc<dyn TokenService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub requests: Arc<dyn BloodRequestCommand>,
    pub requests_query: Arc<dyn BloodRequestQuery>,
    pub tokens: Arc<dyn TokenService>,
    /// Dashboard origin used to build OAuth redirect targets, without a
    /// trailing slash.
    pub base_url: String,
}

impl HttpState {
    /// Construct state from the ports bundle and the dashboard base URL.
    pub fn new(ports: HttpStatePorts, base_url: impl Into<String>) -> Self {
        let HttpStatePorts {
            accounts,
            accounts_query,
            requests,
            requests_query,
            tokens,
        } = ports;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            accounts,
            accounts_query,
            requests,
            requests_query,
            tokens,
            base_url,
        }
    }

    /// Absolute dashboard URL for `path` (which must start with `/`).
    pub fn frontend_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
