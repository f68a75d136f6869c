//! HTTP harness wiring the production services over in-memory adapters.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use mockable::{Clock, DefaultClock};
use serde_json::Value;

use lifelink::Trace;
use lifelink::domain::ports::{NoOpPushNotifier, UnconfiguredIdentityProvider};
use lifelink::domain::{
    AccountService, AccountServiceDeps, BloodRequestService, DonorMatcher, NotificationFanout,
};
use lifelink::inbound::http::health::{HealthState, live, ready};
use lifelink::inbound::http::state::{HttpState, HttpStatePorts};
use lifelink::inbound::http::{api_routes, json_config};
use lifelink::outbound::memory::{InMemoryBloodRequestRepository, InMemoryUserRepository};
use lifelink::outbound::realtime::BroadcastHub;
use lifelink::outbound::security::{Argon2PasswordHasher, JwtTokenService, TokenKey};

/// Application state matching the server wiring without external services.
pub struct Harness {
    pub http: web::Data<HttpState>,
    pub hub: BroadcastHub,
}

impl Harness {
    pub fn new() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let users = Arc::new(InMemoryUserRepository::new());
        let requests = Arc::new(InMemoryBloodRequestRepository::new());
        let hub = BroadcastHub::default();
        let tokens = Arc::new(JwtTokenService::new(
            &TokenKey::from_bytes(vec![11_u8; 32]),
            clock.clone(),
        ));

        let accounts = Arc::new(AccountService::new(AccountServiceDeps {
            users: users.clone(),
            hasher: Arc::new(Argon2PasswordHasher),
            tokens: tokens.clone(),
            captcha: None,
            identity: Arc::new(UnconfiguredIdentityProvider),
            clock: clock.clone(),
        }));
        let fanout = NotificationFanout::new(
            Arc::new(hub.clone()),
            Arc::new(NoOpPushNotifier),
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
            "http://localhost:3000",
        );
        Self {
            http: web::Data::new(http),
            hub,
        }
    }
}

/// Initialise the full service: `/api` routes, tracing and health probes.
pub async fn init_app(
    harness: &Harness,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    test::init_service(
        App::new()
            .app_data(harness.http.clone())
            .app_data(health)
            .wrap(Trace)
            .service(
                web::scope("/api")
                    .app_data(json_config())
                    .configure(api_routes),
            )
            .service(ready)
            .service(live),
    )
    .await
}

/// Attach a bearer token when one is supplied.
pub fn authorised(request: test::TestRequest, token: Option<&str>) -> test::TestRequest {
    match token {
        Some(token) => request.insert_header((AUTHORIZATION, format!("Bearer {token}"))),
        None => request,
    }
}

/// Call the service and decode the JSON body.
pub async fn call_json<S>(app: &S, request: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(app, request.to_request()).await;
    let status = res.status();
    (status, test::read_body_json(res).await)
}
