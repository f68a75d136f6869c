//! Blood request aggregate and its value types.
//!
//! A request is owned by exactly one hospital for its whole lifetime. The
//! responder list is append-only and keyed by donor; stores enforce the
//! at-most-once rule atomically, so [`BloodRequest::has_responder`] is only a
//! read-side convenience.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{BloodGroup, City, UserId};

/// Validation errors for request value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    EmptyId,
    InvalidId,
    UnknownUrgency { value: String },
    UnknownStatus { value: String },
    ZeroQuantity,
    QuantityTooLarge { units: u32 },
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "request id must not be empty"),
            Self::InvalidId => write!(f, "request id must be a valid UUID"),
            Self::UnknownUrgency { value } => write!(
                f,
                "urgency must be one of low, medium, high, emergency (got '{value}')"
            ),
            Self::UnknownStatus { value } => write!(
                f,
                "status must be one of active, fulfilled, cancelled (got '{value}')"
            ),
            Self::ZeroQuantity => write!(f, "quantity must be at least 1"),
            Self::QuantityTooLarge { units } => {
                write!(f, "quantity must be at most {} (got {units})", Quantity::MAX)
            }
        }
    }
}

impl std::error::Error for RequestValidationError {}

/// Stable request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestId(Uuid);

impl RequestId {
    /// Validate and construct a [`RequestId`] from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, RequestValidationError> {
        let raw = id.as_ref().trim();
        if raw.is_empty() {
            return Err(RequestValidationError::EmptyId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| RequestValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a stored UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<RequestId> for String {
    fn from(value: RequestId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for RequestId {
    type Error = RequestValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// How quickly blood is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Emergency,
}

impl Urgency {
    /// Lower-case wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = RequestValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "emergency" => Ok(Self::Emergency),
            _ => Err(RequestValidationError::UnknownUrgency {
                value: value.to_owned(),
            }),
        }
    }
}

/// Request lifecycle state.
///
/// Any status may move to any other; only ownership is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Active,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    /// Lower-case wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = RequestValidationError;

    /// Statuses are matched exactly; `"Active"` is not a valid status.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "fulfilled" => Ok(Self::Fulfilled),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(RequestValidationError::UnknownStatus {
                value: value.to_owned(),
            }),
        }
    }
}

/// Number of units requested. Between one and [`Quantity::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Largest unit count any repository can store.
    pub const MAX: u32 = i32::MAX.unsigned_abs();

    /// Validate a unit count.
    pub fn new(units: u32) -> Result<Self, RequestValidationError> {
        if units == 0 {
            return Err(RequestValidationError::ZeroQuantity);
        }
        if units > Self::MAX {
            return Err(RequestValidationError::QuantityTooLarge { units });
        }
        Ok(Self(units))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(1)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = RequestValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One donor response to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Responder {
    pub donor_id: UserId,
    pub responded_at: DateTime<Utc>,
}

/// Validated hospital input for a new request.
///
/// `city` is only consulted when the hospital has no stored city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub blood_group: BloodGroup,
    pub quantity: Quantity,
    pub urgency: Urgency,
    pub notes: Option<String>,
    pub city: Option<City>,
}

/// A hospital's request for blood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodRequest {
    pub id: RequestId,
    pub hospital_id: UserId,
    pub blood_group: BloodGroup,
    pub quantity: Quantity,
    pub urgency: Urgency,
    pub city: City,
    pub notes: Option<String>,
    pub status: RequestStatus,
    pub responders: Vec<Responder>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BloodRequest {
    /// Build a fresh active request with no responders.
    pub fn open(hospital_id: UserId, city: City, draft: RequestDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: RequestId::random(),
            hospital_id,
            blood_group: draft.blood_group,
            quantity: draft.quantity,
            urgency: draft.urgency,
            city,
            notes: draft.notes,
            status: RequestStatus::Active,
            responders: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `hospital_id` owns this request.
    pub fn is_owned_by(&self, hospital_id: &UserId) -> bool {
        self.hospital_id == *hospital_id
    }

    /// Whether `donor_id` already appears in the responder list.
    pub fn has_responder(&self, donor_id: &UserId) -> bool {
        self.responders
            .iter()
            .any(|responder| responder.donor_id == *donor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft() -> RequestDraft {
        RequestDraft {
            blood_group: BloodGroup::BPositive,
            quantity: Quantity::default(),
            urgency: Urgency::default(),
            notes: None,
            city: None,
        }
    }

    #[rstest]
    #[case("active", RequestStatus::Active)]
    #[case("fulfilled", RequestStatus::Fulfilled)]
    #[case("cancelled", RequestStatus::Cancelled)]
    fn parses_known_statuses(#[case] raw: &str, #[case] expected: RequestStatus) {
        assert_eq!(raw.parse::<RequestStatus>(), Ok(expected));
    }

    #[rstest]
    #[case("deleted")]
    #[case("Active")]
    #[case("")]
    fn rejects_unknown_statuses(#[case] raw: &str) {
        assert!(matches!(
            raw.parse::<RequestStatus>(),
            Err(RequestValidationError::UnknownStatus { .. })
        ));
    }

    #[rstest]
    #[case("HIGH", Urgency::High)]
    #[case(" emergency", Urgency::Emergency)]
    fn parses_urgency_case_insensitively(#[case] raw: &str, #[case] expected: Urgency) {
        assert_eq!(raw.parse::<Urgency>(), Ok(expected));
    }

    #[rstest]
    fn defaults_match_a_routine_request() {
        assert_eq!(Urgency::default(), Urgency::Medium);
        assert_eq!(RequestStatus::default(), RequestStatus::Active);
        assert_eq!(Quantity::default().get(), 1);
    }

    #[rstest]
    fn zero_quantity_is_rejected() {
        assert_eq!(Quantity::new(0), Err(RequestValidationError::ZeroQuantity));
        assert!(serde_json::from_value::<Quantity>(serde_json::json!(0)).is_err());
    }

    #[rstest]
    fn quantity_is_capped_at_storable_range() {
        assert_eq!(Quantity::new(Quantity::MAX).map(Quantity::get), Ok(Quantity::MAX));
        assert_eq!(
            Quantity::new(3_000_000_000),
            Err(RequestValidationError::QuantityTooLarge {
                units: 3_000_000_000
            })
        );
    }

    #[rstest]
    fn open_request_is_active_and_empty() {
        let hospital = UserId::random();
        let city = City::new("Pune").expect("city");
        let request = BloodRequest::open(hospital, city, draft(), Utc::now());

        assert_eq!(request.status, RequestStatus::Active);
        assert!(request.responders.is_empty());
        assert!(request.is_owned_by(&hospital));
        assert!(!request.is_owned_by(&UserId::random()));
    }

    #[rstest]
    fn has_responder_checks_donor_identity() {
        let donor = UserId::random();
        let city = City::new("pune").expect("city");
        let mut request = BloodRequest::open(UserId::random(), city, draft(), Utc::now());
        request.responders.push(Responder {
            donor_id: donor,
            responded_at: Utc::now(),
        });

        assert!(request.has_responder(&donor));
        assert!(!request.has_responder(&UserId::random()));
    }
}
