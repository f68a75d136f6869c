//! User data model: identifiers, roles, and the normalised locale fields
//! used to match donors against blood requests.
//!
//! City and blood group normalisation lives here so that registration,
//! profile completion, request creation, and donor queries all share a
//! single implementation. Matching is exact equality on the normalised
//! values, so any drift between call sites silently breaks matching.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyName,
    EmptyEmail,
    InvalidEmail,
    UnknownRole { value: String },
    EmptyBloodGroup,
    UnknownBloodGroup { value: String },
    EmptyCity,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must contain a local part and a domain"),
            Self::UnknownRole { value } => {
                write!(f, "role must be one of donor, hospital, admin (got '{value}')")
            }
            Self::EmptyBloodGroup => write!(f, "blood group must not be empty"),
            Self::UnknownBloodGroup { value } => write!(
                f,
                "blood group must be one of A+, A-, B+, B-, AB+, AB-, O+, O- (got '{value}')"
            ),
            Self::EmptyCity => write!(f, "city must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role.
///
/// Role-gated decisions match on this enum exhaustively; there is no
/// fallthrough for unrecognised strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Hospital,
    Admin,
}

impl Role {
    /// Lower-case wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Hospital => "hospital",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "donor" => Ok(Self::Donor),
            "hospital" => Ok(Self::Hospital),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole {
                value: value.to_owned(),
            }),
        }
    }
}

/// One of the eight canonical ABO/Rh blood groups.
///
/// # Examples
/// ```
/// use lifelink::domain::BloodGroup;
///
/// let group = BloodGroup::parse(" o+ ").unwrap();
/// assert_eq!(group, BloodGroup::OPositive);
/// assert_eq!(group.as_str(), "O+");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BloodGroup {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
}

impl BloodGroup {
    /// All canonical groups in display order.
    pub const ALL: [BloodGroup; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// Normalise and parse caller input.
    ///
    /// Input is trimmed and upper-cased; the Unicode minus sign is accepted
    /// in place of `-`.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let normalised = raw.trim().replace('\u{2212}', "-").to_ascii_uppercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyBloodGroup);
        }
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == normalised)
            .ok_or(UserValidationError::UnknownBloodGroup { value: normalised })
    }

    /// Canonical upper-case representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BloodGroup> for String {
    fn from(value: BloodGroup) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for BloodGroup {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// City name normalised to trimmed lower case.
///
/// # Examples
/// ```
/// use lifelink::domain::City;
///
/// let city = City::new(" Mumbai ").unwrap();
/// assert_eq!(city.as_ref(), "mumbai");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct City(String);

impl City {
    /// Normalise and validate a city name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyCity);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for City {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<City> for String {
    fn from(value: City) -> Self {
        value.0
    }
}

impl TryFrom<String> for City {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account email. Compared case-sensitively; only surrounding whitespace is
/// removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        match trimmed.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(UserValidationError::InvalidEmail),
        }
    }

    /// Part before the `@`, used as a fallback display name.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Trim an optional free-text field, mapping blank input to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Registered account.
///
/// ## Invariants
/// - `email` is unique across accounts (enforced by the repository).
/// - `city` and `blood_group`, when set, are normalised.
/// - `password_hash` is `None` for accounts created through an identity
///   provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: EmailAddress,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub profile_completed: bool,
    pub blood_group: Option<BloodGroup>,
    pub city: Option<City>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub hospital_name: Option<String>,
    pub contact_number: Option<String>,
    pub last_donation_date: Option<NaiveDate>,
    pub device_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fresh account with only identity fields populated.
    pub fn new(name: impl Into<String>, email: EmailAddress, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::random(),
            name: name.into(),
            email,
            password_hash: None,
            role: None,
            profile_completed: false,
            blood_group: None,
            city: None,
            state: None,
            pincode: None,
            address: None,
            hospital_name: None,
            contact_number: None,
            last_donation_date: None,
            device_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the stored role equals `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    /// Apply a completed profile, replacing the locale and role fields.
    pub fn complete_profile(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        let ProfileUpdate {
            role,
            city,
            state,
            pincode,
            address,
            blood_group,
            hospital_name,
            contact_number,
        } = update.scoped_to_role();
        self.role = Some(role);
        self.city = city;
        self.state = state;
        self.pincode = pincode;
        self.address = address;
        self.blood_group = blood_group;
        self.hospital_name = hospital_name;
        self.contact_number = contact_number;
        self.profile_completed = true;
        self.updated_at = now;
    }

    /// Donor-facing profile projection.
    pub fn donor_summary(&self) -> DonorSummary {
        DonorSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            city: self.city.clone(),
            blood_group: self.blood_group,
            contact_number: self.contact_number.clone(),
        }
    }

    /// Hospital-facing profile projection.
    pub fn hospital_summary(&self) -> HospitalSummary {
        HospitalSummary {
            id: self.id,
            hospital_name: self.hospital_name.clone(),
            city: self.city.clone(),
            contact_number: self.contact_number.clone(),
            email: self.email.clone(),
        }
    }
}

/// Validated profile completion payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub role: Role,
    pub city: Option<City>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub hospital_name: Option<String>,
    pub contact_number: Option<String>,
}

impl ProfileUpdate {
    /// Drop the fields that do not belong to the chosen role: only donors
    /// keep a blood group and only hospitals keep a hospital name.
    #[must_use]
    pub fn scoped_to_role(mut self) -> Self {
        if self.role != Role::Donor {
            self.blood_group = None;
        }
        if self.role != Role::Hospital {
            self.hospital_name = None;
        }
        self
    }
}

/// Donor profile fields exposed to hospitals and broadcast subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorSummary {
    pub id: UserId,
    pub name: String,
    pub email: EmailAddress,
    pub city: Option<City>,
    pub blood_group: Option<BloodGroup>,
    pub contact_number: Option<String>,
}

/// Hospital profile fields exposed alongside requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalSummary {
    pub id: UserId,
    pub hospital_name: Option<String>,
    pub city: Option<City>,
    pub contact_number: Option<String>,
    pub email: EmailAddress,
}
