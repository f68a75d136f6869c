//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use lifelink::outbound::persistence::DbPool;
use lifelink::outbound::security::TokenKey;
use lifelink::settings::LifelinkSettings;

/// Timeout applied to every outbound HTTP client (FCM, reCAPTCHA, Google).
pub const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_key: TokenKey,
    pub(crate) settings: LifelinkSettings,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) outbound_timeout: Duration,
}

impl ServerConfig {
    /// Construct a server configuration from loaded settings.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, token_key: TokenKey, settings: LifelinkSettings) -> Self {
        Self {
            bind_addr,
            token_key,
            settings,
            db_pool: None,
            outbound_timeout: OUTBOUND_TIMEOUT,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server stores users and requests in PostgreSQL;
    /// otherwise in-memory repositories are used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
