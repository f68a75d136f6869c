//! Builders turning settings into the adapter graph behind HTTP and WebSocket
//! state.
//!
//! Every optional collaborator degrades instead of failing startup: no
//! database selects in-memory stores, no FCM key selects the no-op notifier,
//! no reCAPTCHA secret disables the login check, and an incomplete Google
//! registration leaves social sign-in unconfigured.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use url::Url;

use lifelink::domain::ports::{
    BloodRequestRepository, CaptchaVerifier, EventPublisher, IdentityProvider, NoOpPushNotifier,
    PushNotifier, UnconfiguredIdentityProvider, UserRepository,
};
use lifelink::domain::{
    AccountService, AccountServiceDeps, BloodRequestService, DonorMatcher, NotificationFanout,
};
use lifelink::inbound::http::state::{HttpState, HttpStatePorts};
use lifelink::inbound::ws::state::{OriginAllowList, WsState};
use lifelink::outbound::captcha::{RECAPTCHA_VERIFY_ENDPOINT, RecaptchaVerifier};
use lifelink::outbound::memory::{InMemoryBloodRequestRepository, InMemoryUserRepository};
use lifelink::outbound::oauth::{GoogleIdentityProvider, GoogleOAuthConfig};
use lifelink::outbound::persistence::{
    DbPool, DieselBloodRequestRepository, DieselUserRepository,
};
use lifelink::outbound::push::{FCM_LEGACY_ENDPOINT, FcmPushNotifier};
use lifelink::outbound::realtime::BroadcastHub;
use lifelink::outbound::security::{Argon2PasswordHasher, JwtTokenService};
use lifelink::settings::LifelinkSettings;

use super::ServerConfig;

/// Shared application state handed to every worker.
#[derive(Clone)]
pub(super) struct AppStates {
    pub(super) http: web::Data<HttpState>,
    pub(super) ws: web::Data<WsState>,
}

type Repositories = (Arc<dyn UserRepository>, Arc<dyn BloodRequestRepository>);

fn build_repositories(pool: Option<&DbPool>) -> Repositories {
    match pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            (
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselBloodRequestRepository::new(pool.clone())),
            )
        }
        None => {
            warn!("no database configured; using in-memory repositories");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryBloodRequestRepository::new()),
            )
        }
    }
}

fn parse_endpoint(raw: &str) -> std::io::Result<Url> {
    Url::parse(raw)
        .map_err(|err| std::io::Error::other(format!("invalid endpoint '{raw}': {err}")))
}

fn client_error(adapter: &str) -> impl FnOnce(reqwest::Error) -> std::io::Error + '_ {
    move |err| std::io::Error::other(format!("failed to build {adapter} client: {err}"))
}

fn build_push(
    settings: &LifelinkSettings,
    timeout: Duration,
) -> std::io::Result<Arc<dyn PushNotifier>> {
    let Some(server_key) = settings.fcm_server_key() else {
        warn!("FCM server key not configured; push notifications disabled");
        return Ok(Arc::new(NoOpPushNotifier));
    };
    let endpoint = parse_endpoint(settings.fcm_endpoint().unwrap_or(FCM_LEGACY_ENDPOINT))?;
    let notifier =
        FcmPushNotifier::new(endpoint, server_key, timeout).map_err(client_error("FCM"))?;
    Ok(Arc::new(notifier))
}

fn build_captcha(
    settings: &LifelinkSettings,
    timeout: Duration,
) -> std::io::Result<Option<Arc<dyn CaptchaVerifier>>> {
    let Some(secret) = settings.recaptcha_secret() else {
        warn!("reCAPTCHA secret not configured; login CAPTCHA check disabled");
        return Ok(None);
    };
    let endpoint = parse_endpoint(RECAPTCHA_VERIFY_ENDPOINT)?;
    let verifier =
        RecaptchaVerifier::new(endpoint, secret, timeout).map_err(client_error("reCAPTCHA"))?;
    Ok(Some(Arc::new(verifier)))
}

fn build_identity(
    settings: &LifelinkSettings,
    timeout: Duration,
) -> std::io::Result<Arc<dyn IdentityProvider>> {
    let Some(google) = settings.google_client() else {
        warn!("Google OAuth not configured; social sign-in disabled");
        return Ok(Arc::new(UnconfiguredIdentityProvider));
    };
    let provider = GoogleIdentityProvider::new(
        GoogleOAuthConfig {
            client_id: google.client_id,
            client_secret: google.client_secret,
            redirect_uri: google.redirect_uri,
        },
        timeout,
    )
    .map_err(client_error("Google OAuth"))?;
    Ok(Arc::new(provider))
}

fn build_origin_allow_list(settings: &LifelinkSettings) -> OriginAllowList {
    let (origins, rejected) = OriginAllowList::parse(settings.ws_allowed_origins());
    for entry in rejected {
        warn!(origin = %entry, "ignoring unparsable WebSocket origin");
    }
    origins
}

/// Wire services over the configured adapters.
///
/// # Errors
///
/// Returns [`std::io::Error`] when an endpoint URL is malformed or an
/// outbound HTTP client cannot be constructed.
pub(super) fn build_states(config: &ServerConfig) -> std::io::Result<AppStates> {
    let settings = &config.settings;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let (users, requests) = build_repositories(config.db_pool.as_ref());
    let hub = BroadcastHub::default();
    let tokens = Arc::new(JwtTokenService::new(&config.token_key, clock.clone()));

    let accounts = Arc::new(AccountService::new(AccountServiceDeps {
        users: users.clone(),
        hasher: Arc::new(Argon2PasswordHasher),
        tokens: tokens.clone(),
        captcha: build_captcha(settings, config.outbound_timeout)?,
        identity: build_identity(settings, config.outbound_timeout)?,
        clock: clock.clone(),
    }));
    let publisher: Arc<dyn EventPublisher> = Arc::new(hub.clone());
    let fanout = NotificationFanout::new(
        publisher,
        build_push(settings, config.outbound_timeout)?,
        DonorMatcher::new(users.clone()),
    );
    let request_service = Arc::new(BloodRequestService::new(users, requests, fanout, clock));

    let http = HttpState::new(
        HttpStatePorts {
            accounts: accounts.clone(),
            accounts_query: accounts,
            requests: request_service.clone(),
            requests_query: request_service,
            tokens,
        },
        settings.base_url(),
    );
    let ws = WsState::new(hub, build_origin_allow_list(settings));

    Ok(AppStates {
        http: web::Data::new(http),
        ws: web::Data::new(ws),
    })
}
