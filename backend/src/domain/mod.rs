//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the services that implement the driving ports.
//! Document invariants and serialisation contracts (serde) in each type's
//! Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - User / BloodRequest: the two aggregates.
//! - RequestEvent: state changes broadcast to dashboards.
//! - AccountService / BloodRequestService: driving port implementations.

pub mod auth;
pub mod blood_request;
pub mod error;
pub mod events;
pub mod ports;
pub mod trace_id;
pub mod user;

mod account_service;
mod donor_matcher;
mod notification_fanout;
mod request_service;

pub use self::account_service::{AccountService, AccountServiceDeps};
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, Registration, RegistrationInput, SignInMode,
    TokenClaims,
};
pub use self::blood_request::{
    BloodRequest, Quantity, RequestDraft, RequestId, RequestStatus, RequestValidationError,
    Responder, Urgency,
};
pub use self::donor_matcher::DonorMatcher;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::events::{REQUEST_CHANNEL, RequestEvent};
pub use self::notification_fanout::NotificationFanout;
pub use self::request_service::BloodRequestService;
pub use self::trace_id::TraceId;
pub use self::user::{
    BloodGroup, City, DonorSummary, EmailAddress, HospitalSummary, ProfileUpdate, Role, User,
    UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use lifelink::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
