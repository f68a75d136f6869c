//! JSON views returned by the HTTP handlers.
//!
//! Domain aggregates stay serde-free at the edges that matter to clients;
//! these views fix the wire names (camelCase) and flatten typed values to
//! the strings the dashboard expects.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{HospitalHistoryEntry, RequestListing, ResponderView};
use crate::domain::{BloodRequest, DonorSummary, HospitalSummary, User};

/// Public view of an account. Never carries the password hash or device
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[schema(example = "donor")]
    pub role: Option<String>,
    #[schema(example = "B+")]
    pub blood_group: Option<String>,
    #[schema(example = "pune")]
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub hospital_name: Option<String>,
    pub contact_number: Option<String>,
    pub profile_completed: bool,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.to_string(),
            role: user.role.map(|role| role.as_str().to_owned()),
            blood_group: user.blood_group.map(|group| group.as_str().to_owned()),
            city: user.city.as_ref().map(ToString::to_string),
            state: user.state.clone(),
            pincode: user.pincode.clone(),
            address: user.address.clone(),
            hospital_name: user.hospital_name.clone(),
            contact_number: user.contact_number.clone(),
            profile_completed: user.profile_completed,
        }
    }
}

/// Owning hospital fields shown alongside a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalDto {
    pub id: String,
    pub hospital_name: Option<String>,
    pub city: Option<String>,
    pub contact_number: Option<String>,
    pub email: String,
}

impl From<HospitalSummary> for HospitalDto {
    fn from(summary: HospitalSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            hospital_name: summary.hospital_name,
            city: summary.city.map(|city| city.to_string()),
            contact_number: summary.contact_number,
            email: summary.email.to_string(),
        }
    }
}

/// Donor profile fields shown to hospitals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonorDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub city: Option<String>,
    pub blood_group: Option<String>,
    pub contact_number: Option<String>,
}

impl From<DonorSummary> for DonorDto {
    fn from(summary: DonorSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name,
            email: summary.email.to_string(),
            city: summary.city.map(|city| city.to_string()),
            blood_group: summary.blood_group.map(|group| group.as_str().to_owned()),
            contact_number: summary.contact_number,
        }
    }
}

/// One responder entry. `donor` is `null` when the account no longer
/// resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponderDto {
    pub donor: Option<DonorDto>,
    pub responded_at: DateTime<Utc>,
}

impl From<ResponderView> for ResponderDto {
    fn from(view: ResponderView) -> Self {
        Self {
            donor: view.donor.map(DonorDto::from),
            responded_at: view.responded_at,
        }
    }
}

/// A blood request as listed to dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequestDto {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub hospital_id: String,
    pub hospital: Option<HospitalDto>,
    #[schema(example = "B+")]
    pub blood_group: String,
    #[schema(example = 2)]
    pub quantity: u32,
    #[schema(example = "high")]
    pub urgency: String,
    #[schema(example = "pune")]
    pub city: String,
    pub notes: Option<String>,
    #[schema(example = "active")]
    pub status: String,
    pub responder_count: usize,
    /// Whether the calling donor already responded.
    pub responded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BloodRequestDto {
    fn from_parts(
        request: BloodRequest,
        hospital: Option<HospitalSummary>,
        responded: bool,
    ) -> Self {
        Self {
            id: request.id.to_string(),
            hospital_id: request.hospital_id.to_string(),
            hospital: hospital.map(HospitalDto::from),
            blood_group: request.blood_group.as_str().to_owned(),
            quantity: request.quantity.get(),
            urgency: request.urgency.as_str().to_owned(),
            city: request.city.to_string(),
            notes: request.notes,
            status: request.status.as_str().to_owned(),
            responder_count: request.responders.len(),
            responded,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

impl From<RequestListing> for BloodRequestDto {
    fn from(listing: RequestListing) -> Self {
        Self::from_parts(listing.request, listing.hospital, listing.responded)
    }
}

/// A hospital's own request with resolved responders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalHistoryDto {
    #[serde(flatten)]
    pub request: BloodRequestDto,
    pub responders: Vec<ResponderDto>,
}

impl From<HospitalHistoryEntry> for HospitalHistoryDto {
    fn from(entry: HospitalHistoryEntry) -> Self {
        Self {
            request: BloodRequestDto::from_parts(entry.request, None, false),
            responders: entry.responders.into_iter().map(ResponderDto::from).collect(),
        }
    }
}

/// `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Device token saved")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
