//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers take an [`AuthContext`] argument instead of reading headers, so
//! credential checks live in one place and every protected route fails with
//! the same `401` payload.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, TokenClaims, UserId};

use super::state::HttpState;

const UNAUTHORIZED: &str = "Unauthorized";
const BEARER_PREFIX: &str = "Bearer ";

/// Verified claims of the caller's bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext(TokenClaims);

impl AuthContext {
    pub fn user_id(&self) -> &UserId {
        &self.0.subject
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.0
    }
}

/// Extract the raw token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthContext, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req.headers()).ok_or_else(|| Error::unauthorized(UNAUTHORIZED))?;
    state.tokens.verify(token).map(AuthContext).map_err(|err| {
        debug!(error = %err, "bearer token rejected");
        Error::unauthorized(UNAUTHORIZED)
    })
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::inbound::http::test_utils::TestApp;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    #[rstest]
    #[case(Some("Bearer abc"), Some("abc"))]
    #[case(Some("Bearer   abc  "), Some("abc"))]
    #[case(Some("Bearer "), None)]
    #[case(Some("Basic abc"), None)]
    #[case(Some("bearer abc"), None)]
    #[case(None, None)]
    fn parses_bearer_header(#[case] header: Option<&str>, #[case] expected: Option<&str>) {
        let mut request = TestRequest::default();
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let req = request.to_http_request();
        assert_eq!(bearer_token(req.headers()), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn valid_token_yields_subject() {
        let harness = TestApp::new();
        let user_id = UserId::random();
        let token = harness.token_for(user_id);
        let app = actix_test::init_service(App::new().app_data(harness.http_state()).route(
            "/",
            web::get().to(|auth: AuthContext| async move {
                HttpResponse::Ok().body(auth.user_id().to_string())
            }),
        ))
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;

        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer not-a-jwt"))]
    #[case(Some("Token abc"))]
    #[actix_web::test]
    async fn missing_or_invalid_tokens_are_unauthorised(#[case] header: Option<&'static str>) {
        let harness = TestApp::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(harness.http_state())
                .route("/", web::get().to(|_: AuthContext| async { HttpResponse::Ok() })),
        )
        .await;

        let mut req = actix_test::TestRequest::get().uri("/");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Error = actix_test::read_body_json(res).await;
        assert_eq!(body.code(), ErrorCode::Unauthorized);
        assert_eq!(body.message(), "Unauthorized");
    }
}
