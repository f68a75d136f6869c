//! Google sign-in redirect handler.
//!
//! One endpoint serves both legs of the OAuth round trip. Without a `code`
//! it sends the browser to the provider; on the callback it resolves the
//! account and sends the browser back to the front end, carrying either a
//! token or an error code in the query string.

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::warn;
use url::form_urlencoded;
use utoipa::IntoParams;

use crate::domain::SignInMode;
use crate::domain::ports::{SocialSignInOutcome, SocialSignInRejection};
use crate::inbound::http::state::HttpState;

/// Query accepted by `GET /api/auth/google`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GoogleQuery {
    /// Authorisation code from the provider callback.
    pub code: Option<String>,
    /// Mode echoed back by the provider.
    pub state: Option<String>,
    /// `login` (default) or `signup` on the initial request.
    pub mode: Option<String>,
}

impl GoogleQuery {
    fn sign_in_mode(&self) -> SignInMode {
        SignInMode::from_query(self.state.as_deref().or(self.mode.as_deref()))
    }
}

fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location.into()))
        .finish()
}

fn rejection_location(state: &HttpState, rejection: SocialSignInRejection) -> String {
    let page = match rejection {
        SocialSignInRejection::NoAccount => "/signup",
        _ => "/login",
    };
    state.frontend_url(&format!("{page}?error={}", rejection.code()))
}

fn success_location(state: &HttpState, token: &str, mode: SignInMode) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token)
        .append_pair("mode", mode.as_str())
        .finish();
    state.frontend_url(&format!("/redirect-after-login?{query}"))
}

/// Start or complete Google sign-in.
///
/// Always answers with a `302`; failures are reported to the front end via
/// `?error=` on the login or signup page.
#[utoipa::path(
    get,
    path = "/api/auth/google",
    params(GoogleQuery),
    responses(
        (status = 302, description = "Redirect to the provider or back to the front end")
    ),
    tags = ["auth"],
    operation_id = "googleSignIn",
    security([])
)]
#[get("/auth/google")]
pub async fn google_sign_in(
    state: web::Data<HttpState>,
    query: web::Query<GoogleQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let mode = query.sign_in_mode();

    let Some(code) = query.code.filter(|code| !code.is_empty()) else {
        return match state.accounts.social_sign_in_url(mode) {
            Ok(url) => redirect(url),
            Err(err) => {
                warn!(error = %err, "google sign-in unavailable");
                redirect(rejection_location(
                    &state,
                    SocialSignInRejection::ProviderFailed,
                ))
            }
        };
    };

    match state.accounts.social_sign_in(&code, mode).await {
        SocialSignInOutcome::SignedIn { token, mode } => {
            redirect(success_location(&state, &token, mode))
        }
        SocialSignInOutcome::Rejected(rejection) => {
            redirect(rejection_location(&state, rejection))
        }
    }
}
