//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The
//! `diesel print-schema` command can regenerate them from a live database.

diesel::table! {
    /// Registered accounts.
    ///
    /// `city` is stored lower-cased and `blood_group` in canonical form so
    /// donor matching is a plain equality filter.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        /// Argon2 PHC string; null for identity-provider accounts.
        password_hash -> Nullable<Varchar>,
        role -> Nullable<Varchar>,
        profile_completed -> Bool,
        blood_group -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        state -> Nullable<Varchar>,
        pincode -> Nullable<Varchar>,
        address -> Nullable<Varchar>,
        hospital_name -> Nullable<Varchar>,
        contact_number -> Nullable<Varchar>,
        last_donation_date -> Nullable<Date>,
        device_token -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Hospital blood requests.
    blood_requests (id) {
        id -> Uuid,
        hospital_id -> Uuid,
        blood_group -> Varchar,
        quantity -> Int4,
        urgency -> Varchar,
        city -> Varchar,
        notes -> Nullable<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Donor responses. The composite key makes each donor appear at most
    /// once per request.
    request_responders (request_id, donor_id) {
        request_id -> Uuid,
        donor_id -> Uuid,
        responded_at -> Timestamptz,
    }
}

diesel::joinable!(blood_requests -> users (hospital_id));
diesel::joinable!(request_responders -> blood_requests (request_id));
diesel::joinable!(request_responders -> users (donor_id));

diesel::allow_tables_to_appear_in_same_query!(users, blood_requests, request_responders);
