//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to and from domain types live
//! next to the repositories that use them.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{blood_requests, request_responders, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Option<String>,
    pub profile_completed: bool,
    pub blood_group: Option<String>,
    pub city: Option<String>,
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

/// Insertable struct for user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct UserRecord<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub role: Option<&'a str>,
    pub profile_completed: bool,
    pub blood_group: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub pincode: Option<&'a str>,
    pub address: Option<&'a str>,
    pub hospital_name: Option<&'a str>,
    pub contact_number: Option<&'a str>,
    pub last_donation_date: Option<NaiveDate>,
    pub device_token: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset covering only the profile columns of a user.
///
/// `treat_none_as_null` makes updates clear fields the profile left empty.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileRecord<'a> {
    pub role: Option<&'a str>,
    pub profile_completed: bool,
    pub blood_group: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub pincode: Option<&'a str>,
    pub address: Option<&'a str>,
    pub hospital_name: Option<&'a str>,
    pub contact_number: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Blood request models
// ---------------------------------------------------------------------------

/// Row struct for reading from the blood_requests table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = blood_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BloodRequestRow {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub blood_group: String,
    pub quantity: i32,
    pub urgency: String,
    pub city: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new blood requests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blood_requests)]
pub(crate) struct NewBloodRequestRow<'a> {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub blood_group: &'a str,
    pub quantity: i32,
    pub urgency: &'a str,
    pub city: &'a str,
    pub notes: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the request_responders table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = request_responders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResponderRow {
    pub request_id: Uuid,
    pub donor_id: Uuid,
    pub responded_at: DateTime<Utc>,
}
