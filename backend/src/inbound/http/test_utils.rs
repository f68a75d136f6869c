//! Test helpers for inbound HTTP components.
//!
//! [`TestApp`] wires the real services over in-memory stores and a JWT
//! signer with a fixed key, so handler tests exercise the full request path
//! without external I/O.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockable::DefaultClock;

use crate::domain::ports::{
    IdentityProvider, NoOpPushNotifier, PasswordHashError, PasswordHasher, TokenService,
    UnconfiguredIdentityProvider, UserRepository,
};
use crate::domain::{
    AccountService, AccountServiceDeps, BloodGroup, BloodRequestService, City, DonorMatcher,
    EmailAddress, NotificationFanout, Role, TokenClaims, User, UserId,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryBloodRequestRepository, InMemoryUserRepository};
use crate::outbound::realtime::BroadcastHub;
use crate::outbound::security::{JwtTokenService, TokenKey};

/// Reversible hasher so tests avoid Argon2's deliberate cost.
struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordHashError> {
        Ok(stored_hash.strip_prefix("plain:") == Some(password))
    }
}

pub struct TestApp {
    pub users: Arc<InMemoryUserRepository>,
    pub requests: Arc<InMemoryBloodRequestRepository>,
    pub hub: BroadcastHub,
    tokens: Arc<JwtTokenService>,
    state: web::Data<HttpState>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_identity(Arc::new(UnconfiguredIdentityProvider))
    }

    /// Harness whose account service signs in through `identity`.
    pub fn with_identity(identity: Arc<dyn IdentityProvider>) -> Self {
        let clock = Arc::new(DefaultClock);
        let users = Arc::new(InMemoryUserRepository::new());
        let requests = Arc::new(InMemoryBloodRequestRepository::new());
        let hub = BroadcastHub::default();
        let tokens = Arc::new(JwtTokenService::new(
            &TokenKey::from_bytes(vec![7_u8; 32]),
            clock.clone(),
        ));

        let accounts = Arc::new(AccountService::new(AccountServiceDeps {
            users: users.clone(),
            hasher: Arc::new(PlainHasher),
            tokens: tokens.clone(),
            captcha: None,
            identity,
            clock: clock.clone(),
        }));
        let fanout = NotificationFanout::new(
            Arc::new(hub.clone()),
            Arc::new(NoOpPushNotifier),
            DonorMatcher::new(users.clone()),
        );
        let request_service = Arc::new(BloodRequestService::new(
            users.clone(),
            requests.clone(),
            fanout,
            clock,
        ));

        let state = HttpState::new(
            HttpStatePorts {
                accounts: accounts.clone(),
                accounts_query: accounts,
                requests: request_service.clone(),
                requests_query: request_service,
                tokens: tokens.clone(),
            },
            "http://localhost:3000/",
        );

        Self {
            users,
            requests,
            hub,
            tokens,
            state: web::Data::new(state),
        }
    }

    pub fn http_state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    /// Application with every API route mounted under `/api`.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.http_state())
            .app_data(super::json_config())
            .service(web::scope("/api").configure(super::api_routes))
    }

    /// Run one request against a fresh service and decode the JSON body.
    pub async fn send(&self, request: test::TestRequest) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(self.app()).await;
        let res = test::call_service(&app, request.to_request()).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    pub fn token_for(&self, user_id: UserId) -> String {
        self.tokens
            .issue(&TokenClaims::for_subject(user_id))
            .expect("token issues")
    }

    pub fn bearer(&self, user_id: UserId) -> (actix_web::http::header::HeaderName, String) {
        (AUTHORIZATION, format!("Bearer {}", self.token_for(user_id)))
    }

    /// Store a profile-complete user and return it.
    pub async fn seed_user(
        &self,
        role: Role,
        city: Option<&str>,
        blood_group: Option<BloodGroup>,
    ) -> User {
        let email = EmailAddress::new(format!("{}@example.com", UserId::random()))
            .expect("fixture email");
        let mut user = User::new("Fixture", email, chrono::Utc::now());
        user.role = Some(role);
        user.city = city.map(|raw| City::new(raw).expect("fixture city"));
        user.blood_group = blood_group;
        user.profile_completed = true;
        if role == Role::Hospital {
            user.hospital_name = Some("City General".to_owned());
        }
        self.users.insert(&user).await.expect("seed user");
        user
    }
}
