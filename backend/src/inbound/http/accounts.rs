//! Account API handlers.
//!
//! ```text
//! POST /api/auth/register {"name":"Asha","email":"asha@example.com","password":"pw"}
//! POST /api/auth/login {"email":"asha@example.com","password":"pw"}
//! GET /api/auth/me
//! POST /api/complete-profile {"role":"donor","city":"Pune","bloodGroup":"b+"}
//! POST /api/user/device-token {"deviceToken":"fcm-token"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::AuthSession;
use crate::domain::{
    BloodGroup, City, CredentialsValidationError, Error, LoginCredentials, ProfileUpdate,
    Registration, RegistrationInput, Role, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::dto::{MessageResponse, UserDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, missing_field_error, require_text,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration body for `POST /api/auth/register`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `hospital` registers a hospital; anything else registers a donor.
    pub role: Option<String>,
    pub blood_group: Option<String>,
    pub city: Option<String>,
    pub hospital_name: Option<String>,
    pub contact_number: Option<String>,
}

impl From<RegisterRequest> for RegistrationInput {
    fn from(value: RegisterRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: value.password,
            role: value.role,
            blood_group: value.blood_group,
            city: value.city,
            hospital_name: value.hospital_name,
            contact_number: value.contact_number,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[schema(example = "User registered successfully")]
    pub message: String,
    pub user_id: String,
}

/// Login body for `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Required only when the server has a CAPTCHA secret configured.
    pub captcha_token: Option<String>,
}

/// Bearer token plus the public user view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub token: String,
    pub user: UserDto,
}

impl SessionResponse {
    fn from_session(session: AuthSession, message: Option<&str>) -> Self {
        Self {
            message: message.map(str::to_owned),
            user: UserDto::from(&session.user),
            token: session.token,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub user: UserDto,
}

/// Profile completion body for `POST /api/complete-profile`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfileRequest {
    #[schema(example = "donor")]
    pub role: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub hospital_name: Option<String>,
    pub contact_number: Option<String>,
}

const ROLE: FieldName = FieldName::new("role");
const CITY: FieldName = FieldName::new("city");
const BLOOD_GROUP: FieldName = FieldName::new("bloodGroup");
const DEVICE_TOKEN: FieldName = FieldName::new("deviceToken");

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

impl TryFrom<CompleteProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: CompleteProfileRequest) -> Result<Self, Self::Error> {
        let role = require_text(value.role, ROLE, "Role is required")?
            .parse::<Role>()
            .map_err(|err| invalid_field_error(ROLE, err))?;
        let city = trimmed(value.city)
            .map(City::new)
            .transpose()
            .map_err(|err| invalid_field_error(CITY, err))?;
        let blood_group = match (role, trimmed(value.blood_group)) {
            (Role::Donor, Some(raw)) => {
                Some(BloodGroup::parse(&raw).map_err(|err| invalid_field_error(BLOOD_GROUP, err))?)
            }
            _ => None,
        };
        Ok(Self {
            role,
            city,
            state: trimmed(value.state),
            pincode: trimmed(value.pincode),
            address: trimmed(value.address),
            blood_group,
            hospital_name: trimmed(value.hospital_name),
            contact_number: trimmed(value.contact_number),
        })
    }
}

/// Device token body for `POST /api/user/device-token`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenRequest {
    pub device_token: Option<String>,
}

fn map_registration_error(err: CredentialsValidationError) -> Error {
    match err {
        CredentialsValidationError::EmptyName
        | CredentialsValidationError::EmptyEmail
        | CredentialsValidationError::EmptyPassword => {
            Error::invalid_request("Name, email and password are required")
                .with_details(json!({ "code": "missing_field" }))
        }
        CredentialsValidationError::Field(field) => {
            let name = match field {
                UserValidationError::InvalidEmail => "email",
                UserValidationError::UnknownBloodGroup { .. }
                | UserValidationError::EmptyBloodGroup => "bloodGroup",
                UserValidationError::EmptyCity => "city",
                UserValidationError::UnknownRole { .. } => "role",
                UserValidationError::EmptyName => "name",
                UserValidationError::EmptyEmail => "email",
                UserValidationError::EmptyId | UserValidationError::InvalidId => "id",
            };
            Error::invalid_request(field.to_string())
                .with_details(json!({ "field": name, "code": "invalid_value" }))
        }
    }
}

/// Register a password account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing fields or email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from_input(payload.into_inner().into()).map_err(map_registration_error)?;
    let user_id = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_owned(),
        user_id: user_id.to_string(),
    }))
}

/// Exchange email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse),
        (status = 400, description = "Captcha verification failed", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let LoginRequest {
        email,
        password,
        captcha_token,
    } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        email.as_deref().unwrap_or_default(),
        password.as_deref().unwrap_or_default(),
    )
    .map_err(|_| Error::unauthorized(INVALID_CREDENTIALS))?;
    let session = state.accounts.login(credentials, captcha_token).await?;
    Ok(web::Json(SessionResponse::from_session(session, None)))
}

/// Return the caller's account.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<CurrentUserResponse>> {
    let user = state.accounts_query.current_user(auth.user_id()).await?;
    Ok(web::Json(CurrentUserResponse {
        user: UserDto::from(&user),
    }))
}

/// Set role and locale fields and mark the profile complete.
///
/// The response carries a fresh token whose claims reflect the new role.
#[utoipa::path(
    post,
    path = "/api/complete-profile",
    request_body = CompleteProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = SessionResponse),
        (status = 400, description = "Invalid profile fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "completeProfile"
)]
#[post("/complete-profile")]
pub async fn complete_profile(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CompleteProfileRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let session = state
        .accounts
        .complete_profile(auth.user_id(), update)
        .await?;
    Ok(web::Json(SessionResponse::from_session(
        session,
        Some("Profile updated successfully"),
    )))
}

/// Store the caller's push-notification address.
#[utoipa::path(
    post,
    path = "/api/user/device-token",
    request_body = DeviceTokenRequest,
    responses(
        (status = 200, description = "Token saved", body = MessageResponse),
        (status = 400, description = "Missing device token", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "registerDeviceToken"
)]
#[post("/user/device-token")]
pub async fn register_device_token(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<DeviceTokenRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let device_token = payload
        .into_inner()
        .device_token
        .ok_or_else(|| missing_field_error(DEVICE_TOKEN, "Missing device token"))?;
    state
        .accounts
        .register_device_token(auth.user_id(), device_token)
        .await?;
    Ok(web::Json(MessageResponse::new("Device token saved")))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
