//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{BloodGroup, City, EmailAddress, ProfileUpdate, Role, User, UserId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{ProfileRecord, UserRecord, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, |message| UserPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn record_for(user: &User) -> UserRecord<'_> {
    UserRecord {
        id: *user.id.as_uuid(),
        name: user.name.as_str(),
        email: user.email.as_ref(),
        password_hash: user.password_hash.as_deref(),
        role: user.role.map(Role::as_str),
        profile_completed: user.profile_completed,
        blood_group: user.blood_group.map(BloodGroup::as_str),
        city: user.city.as_ref().map(AsRef::as_ref),
        state: user.state.as_deref(),
        pincode: user.pincode.as_deref(),
        address: user.address.as_deref(),
        hospital_name: user.hospital_name.as_deref(),
        contact_number: user.contact_number.as_deref(),
        last_donation_date: user.last_donation_date,
        device_token: user.device_token.as_deref(),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn profile_record_for(profile: &ProfileUpdate, at: DateTime<Utc>) -> ProfileRecord<'_> {
    ProfileRecord {
        role: Some(profile.role.as_str()),
        profile_completed: true,
        blood_group: profile.blood_group.map(BloodGroup::as_str),
        city: profile.city.as_ref().map(AsRef::as_ref),
        state: profile.state.as_deref(),
        pincode: profile.pincode.as_deref(),
        address: profile.address.as_deref(),
        hospital_name: profile.hospital_name.as_deref(),
        contact_number: profile.contact_number.as_deref(),
        updated_at: at,
    }
}

/// Convert a row to the domain record.
///
/// Columns are constrained by the migration, so unparseable values only
/// appear after manual edits; they are logged and dropped rather than
/// failing the whole read.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| UserPersistenceError::query(format!("stored email invalid: {err}")))?;
    let role = row.role.as_deref().and_then(|raw| {
        raw.parse::<Role>()
            .inspect_err(|_| warn!(user_id = %row.id, value = raw, "unrecognised stored role"))
            .ok()
    });
    let blood_group = row.blood_group.as_deref().and_then(|raw| {
        BloodGroup::parse(raw)
            .inspect_err(|_| {
                warn!(user_id = %row.id, value = raw, "unrecognised stored blood group");
            })
            .ok()
    });
    let city = row.city.as_deref().and_then(|raw| City::new(raw).ok());

    Ok(User {
        id: UserId::from_uuid(row.id),
        name: row.name,
        email,
        password_hash: row.password_hash,
        role,
        profile_completed: row.profile_completed,
        blood_group,
        city,
        state: row.state,
        pincode: row.pincode,
        address: row.address,
        hospital_name: row.hospital_name,
        contact_number: row.contact_number,
        last_donation_date: row.last_donation_date,
        device_token: row.device_token,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    rows.into_iter().map(row_to_user).collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&record_for(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_email(user.email.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn update_profile(
        &self,
        id: &UserId,
        profile: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.find(*id.as_uuid()))
            .set(&profile_record_for(profile, at))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_users(rows)
    }

    async fn find_donor_candidates(
        &self,
        city: &City,
        blood_group: BloodGroup,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(Role::Donor.as_str()))
            .filter(users::city.eq(city.as_ref()))
            .filter(users::blood_group.eq(blood_group.as_str()))
            .filter(users::device_token.is_not_null())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_users(rows)
    }

    async fn set_device_token(
        &self,
        id: &UserId,
        device_token: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(*id.as_uuid()))
            .set((
                users::device_token.eq(device_token),
                users::updated_at.eq(at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
