//! Blood request API handlers.
//!
//! ```text
//! POST /api/requests/create {"bloodGroup":"b+","quantity":2,"urgency":"high"}
//! GET /api/requests/list?role=donor&city=pune&bloodGroup=B%2B
//! POST /api/requests/respond {"requestId":"..."}
//! POST /api/requests/status {"requestId":"...","status":"fulfilled"}
//! POST /api/requests/delete {"requestId":"..."}
//! POST /api/requests/responders {"requestId":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ListScope;
use crate::domain::{BloodGroup, City, Error, Quantity, RequestDraft, RequestStatus, Urgency};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::dto::{BloodRequestDto, MessageResponse, ResponderDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_request_id, require_text,
};

const BLOOD_GROUP: FieldName = FieldName::new("bloodGroup");
const QUANTITY: FieldName = FieldName::new("quantity");
const URGENCY: FieldName = FieldName::new("urgency");
const CITY: FieldName = FieldName::new("city");
const STATUS: FieldName = FieldName::new("status");

/// Body for `POST /api/requests/create`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    #[schema(example = "B+")]
    pub blood_group: Option<String>,
    /// Units needed; `units` is accepted as an alias. Defaults to 1.
    #[serde(alias = "units")]
    #[schema(example = 2)]
    pub quantity: Option<u32>,
    /// `low`, `medium` (default), `high` or `emergency`.
    pub urgency: Option<String>,
    pub notes: Option<String>,
    /// Used only when the hospital profile has no city.
    pub city: Option<String>,
}

impl TryFrom<CreateRequestBody> for RequestDraft {
    type Error = Error;

    fn try_from(body: CreateRequestBody) -> Result<Self, Self::Error> {
        let raw_group = require_text(body.blood_group, BLOOD_GROUP, "Blood group is required")?;
        let blood_group =
            BloodGroup::parse(&raw_group).map_err(|err| invalid_field_error(BLOOD_GROUP, err))?;
        let quantity = Quantity::new(body.quantity.unwrap_or(1))
            .map_err(|err| invalid_field_error(QUANTITY, err))?;
        let urgency = match non_blank(body.urgency) {
            Some(raw) => raw
                .parse::<Urgency>()
                .map_err(|err| invalid_field_error(URGENCY, err))?,
            None => Urgency::default(),
        };
        let city = non_blank(body.city)
            .map(City::new)
            .transpose()
            .map_err(|err| invalid_field_error(CITY, err))?;
        Ok(Self {
            blood_group,
            quantity,
            urgency,
            notes: non_blank(body.notes),
            city,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestResponse {
    #[schema(example = "Request created")]
    pub message: String,
    pub request_id: String,
}

/// Query for `GET /api/requests/list`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListRequestsQuery {
    /// `donor`, `hospital`, or anything else for all requests.
    pub role: Option<String>,
    /// Donor filter; falls back to the caller's profile city.
    pub city: Option<String>,
    /// Donor filter; falls back to the caller's profile blood group.
    pub blood_group: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRequestsResponse {
    pub requests: Vec<BloodRequestDto>,
}

/// Body naming a single request.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdBody {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondResponse {
    #[schema(example = "Response submitted!")]
    pub message: String,
    pub already_responded: bool,
}

/// Body for `POST /api/requests/status`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub request_id: Option<String>,
    #[schema(example = "fulfilled")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "Status updated")]
    pub message: String,
    #[schema(example = "fulfilled")]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RespondersResponse {
    pub responders: Vec<ResponderDto>,
}

fn parse_status(raw: Option<String>) -> Result<RequestStatus, Error> {
    let raw = raw.unwrap_or_default();
    raw.parse::<RequestStatus>().map_err(|_| {
        Error::invalid_request("Invalid status").with_details(json!({
            "field": STATUS.as_str(),
            "value": raw,
            "allowed": ["active", "fulfilled", "cancelled"],
        }))
    })
}

/// Open a new request owned by the calling hospital.
///
/// Matching donors receive a push notification and dashboards receive a
/// `new-request` event.
#[utoipa::path(
    post,
    path = "/api/requests/create",
    request_body = CreateRequestBody,
    responses(
        (status = 201, description = "Request created", body = CreateRequestResponse),
        (status = 400, description = "Invalid request fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a hospital", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "createRequest"
)]
#[post("/requests/create")]
pub async fn create_request(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateRequestBody>,
) -> ApiResult<HttpResponse> {
    let draft = RequestDraft::try_from(payload.into_inner())?;
    let request_id = state.requests.create(auth.user_id(), draft).await?;
    Ok(HttpResponse::Created().json(CreateRequestResponse {
        message: "Request created".to_owned(),
        request_id: request_id.to_string(),
    }))
}

/// List requests for a donor, a hospital, or everyone.
#[utoipa::path(
    get,
    path = "/api/requests/list",
    params(ListRequestsQuery),
    responses(
        (status = 200, description = "Requests, newest first", body = ListRequestsResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "listRequests"
)]
#[get("/requests/list")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<ListRequestsQuery>,
) -> ApiResult<web::Json<ListRequestsResponse>> {
    let ListRequestsQuery {
        role,
        city,
        blood_group,
    } = query.into_inner();
    let scope = ListScope::from_role(role.as_deref(), city, blood_group);
    let listings = state.requests_query.list(auth.user_id(), scope).await?;
    Ok(web::Json(ListRequestsResponse {
        requests: listings.into_iter().map(BloodRequestDto::from).collect(),
    }))
}

/// Record the calling donor as a responder. Repeat calls are no-ops.
#[utoipa::path(
    post,
    path = "/api/requests/respond",
    request_body = RequestIdBody,
    responses(
        (status = 200, description = "Response recorded", body = RespondResponse),
        (status = 400, description = "Missing or malformed requestId", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a donor", body = ErrorSchema),
        (status = 404, description = "Request not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "respondToRequest"
)]
#[post("/requests/respond")]
pub async fn respond(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<RequestIdBody>,
) -> ApiResult<web::Json<RespondResponse>> {
    let request_id = parse_request_id(payload.into_inner().request_id)?;
    let outcome = state.requests.respond(auth.user_id(), &request_id).await?;
    let message = if outcome.already_responded {
        "Already responded"
    } else {
        "Response submitted!"
    };
    Ok(web::Json(RespondResponse {
        message: message.to_owned(),
        already_responded: outcome.already_responded,
    }))
}

/// Change the status of one of the caller's requests.
#[utoipa::path(
    post,
    path = "/api/requests/status",
    request_body = StatusBody,
    responses(
        (status = 200, description = "Status updated", body = StatusResponse),
        (status = 400, description = "Invalid status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owning hospital", body = ErrorSchema),
        (status = 404, description = "Request not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "updateRequestStatus"
)]
#[post("/requests/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<StatusBody>,
) -> ApiResult<web::Json<StatusResponse>> {
    let StatusBody { request_id, status } = payload.into_inner();
    let request_id = parse_request_id(request_id)?;
    let status = parse_status(status)?;
    state
        .requests
        .set_status(auth.user_id(), &request_id, status)
        .await?;
    Ok(web::Json(StatusResponse {
        message: "Status updated".to_owned(),
        status: status.as_str().to_owned(),
    }))
}

/// Hard-delete one of the caller's requests.
#[utoipa::path(
    post,
    path = "/api/requests/delete",
    request_body = RequestIdBody,
    responses(
        (status = 200, description = "Request deleted", body = MessageResponse),
        (status = 400, description = "Missing or malformed requestId", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owning hospital", body = ErrorSchema),
        (status = 404, description = "Request not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "deleteRequest"
)]
#[post("/requests/delete")]
pub async fn delete_request(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<RequestIdBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let request_id = parse_request_id(payload.into_inner().request_id)?;
    state.requests.delete(auth.user_id(), &request_id).await?;
    Ok(web::Json(MessageResponse::new("Request deleted successfully")))
}

/// List donors who responded to a request.
#[utoipa::path(
    post,
    path = "/api/requests/responders",
    request_body = RequestIdBody,
    responses(
        (status = 200, description = "Responders in response order", body = RespondersResponse),
        (status = 400, description = "Missing or malformed requestId", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a hospital", body = ErrorSchema),
        (status = 404, description = "Request not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "listResponders"
)]
#[post("/requests/responders")]
pub async fn list_responders(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<RequestIdBody>,
) -> ApiResult<web::Json<RespondersResponse>> {
    let request_id = parse_request_id(payload.into_inner().request_id)?;
    let responders = state
        .requests_query
        .responders(auth.user_id(), &request_id)
        .await?;
    Ok(web::Json(RespondersResponse {
        responders: responders.into_iter().map(ResponderDto::from).collect(),
    }))
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;
