//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod auth;
pub mod dto;
pub mod error;
pub mod google;
pub mod health;
pub mod history;
pub mod requests;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every API handler. Mount inside the `/api` scope.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::register)
        .service(accounts::login)
        .service(accounts::current_user)
        .service(accounts::complete_profile)
        .service(accounts::register_device_token)
        .service(google::google_sign_in)
        .service(requests::create_request)
        .service(requests::list_requests)
        .service(requests::respond)
        .service(requests::update_status)
        .service(requests::delete_request)
        .service(requests::list_responders)
        .service(history::donor_history)
        .service(history::hospital_history);
}

/// JSON extractor configuration reporting malformed bodies in the API
/// error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(error::json_error_handler)
}
