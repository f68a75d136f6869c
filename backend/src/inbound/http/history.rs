//! Request history handlers.
//!
//! ```text
//! GET /api/history/donor
//! GET /api/history/hospital
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::dto::{BloodRequestDto, HospitalHistoryDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DonorHistoryResponse {
    pub history: Vec<BloodRequestDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HospitalHistoryResponse {
    pub history: Vec<HospitalHistoryDto>,
}

/// Requests the calling donor has responded to, newest first.
#[utoipa::path(
    get,
    path = "/api/history/donor",
    responses(
        (status = 200, description = "Donor history", body = DonorHistoryResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a donor", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["history"],
    operation_id = "donorHistory"
)]
#[get("/history/donor")]
pub async fn donor_history(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<DonorHistoryResponse>> {
    let listings = state.requests_query.donor_history(auth.user_id()).await?;
    Ok(web::Json(DonorHistoryResponse {
        history: listings.into_iter().map(BloodRequestDto::from).collect(),
    }))
}

/// The calling hospital's requests with resolved responders, newest first.
#[utoipa::path(
    get,
    path = "/api/history/hospital",
    responses(
        (status = 200, description = "Hospital history", body = HospitalHistoryResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a hospital", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["history"],
    operation_id = "hospitalHistory"
)]
#[get("/history/hospital")]
pub async fn hospital_history(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<HospitalHistoryResponse>> {
    let entries = state
        .requests_query
        .hospital_history(auth.user_id())
        .await?;
    Ok(web::Json(HospitalHistoryResponse {
        history: entries.into_iter().map(HospitalHistoryDto::from).collect(),
    }))
}
