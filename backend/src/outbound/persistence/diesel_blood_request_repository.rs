//! PostgreSQL-backed `BloodRequestRepository` implementation using Diesel ORM.
//!
//! Responders live in `request_responders` with a `(request_id, donor_id)`
//! primary key. Appends use `ON CONFLICT DO NOTHING`, so concurrent responses
//! from one donor store a single row and the affected-row count tells the
//! caller which one won.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    AppendOutcome, BloodRequestPersistenceError, BloodRequestRepository, RequestFilter,
};
use crate::domain::{
    BloodGroup, BloodRequest, City, Quantity, RequestId, RequestStatus, Responder, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{BloodRequestRow, NewBloodRequestRow, ResponderRow};
use super::pool::{DbPool, PoolError};
use super::schema::{blood_requests, request_responders};

/// Diesel-backed implementation of the [`BloodRequestRepository`] port.
#[derive(Clone)]
pub struct DieselBloodRequestRepository {
    pool: DbPool,
}

impl DieselBloodRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BloodRequestPersistenceError {
    map_basic_pool_error(error, |message| {
        BloodRequestPersistenceError::connection(message)
    })
}

fn map_diesel_error(error: DieselError) -> BloodRequestPersistenceError {
    map_basic_diesel_error(
        error,
        BloodRequestPersistenceError::query,
        BloodRequestPersistenceError::connection,
    )
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> BloodRequestPersistenceError {
    BloodRequestPersistenceError::query(format!("stored {column} invalid: {err}"))
}

fn row_to_request(
    row: BloodRequestRow,
    responders: Vec<Responder>,
) -> Result<BloodRequest, BloodRequestPersistenceError> {
    let quantity = u32::try_from(row.quantity)
        .map_err(|err| corrupt("quantity", err))
        .and_then(|units| Quantity::new(units).map_err(|err| corrupt("quantity", err)))?;

    Ok(BloodRequest {
        id: RequestId::from_uuid(row.id),
        hospital_id: UserId::from_uuid(row.hospital_id),
        blood_group: BloodGroup::parse(&row.blood_group)
            .map_err(|err| corrupt("blood group", err))?,
        quantity,
        urgency: row.urgency.parse().map_err(|err| corrupt("urgency", err))?,
        city: City::new(&row.city).map_err(|err| corrupt("city", err))?,
        notes: row.notes,
        status: row.status.parse().map_err(|err| corrupt("status", err))?,
        responders,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn quantity_for_db(quantity: Quantity) -> Result<i32, BloodRequestPersistenceError> {
    i32::try_from(quantity.get())
        .map_err(|_| BloodRequestPersistenceError::query("quantity exceeds column range"))
}

impl DieselBloodRequestRepository {
    /// Attach responders to each row, preserving response order.
    async fn hydrate<C>(
        conn: &mut C,
        rows: Vec<BloodRequestRow>,
    ) -> Result<Vec<BloodRequest>, BloodRequestPersistenceError>
    where
        C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
    {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let responder_rows: Vec<ResponderRow> = request_responders::table
            .filter(request_responders::request_id.eq_any(ids))
            .order((
                request_responders::responded_at.asc(),
                request_responders::donor_id.asc(),
            ))
            .select(ResponderRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;

        let mut grouped: HashMap<Uuid, Vec<Responder>> = HashMap::new();
        for responder in responder_rows {
            grouped
                .entry(responder.request_id)
                .or_default()
                .push(Responder {
                    donor_id: UserId::from_uuid(responder.donor_id),
                    responded_at: responder.responded_at,
                });
        }

        rows.into_iter()
            .map(|row| {
                let responders = grouped.remove(&row.id).unwrap_or_default();
                row_to_request(row, responders)
            })
            .collect()
    }
}

#[async_trait]
impl BloodRequestRepository for DieselBloodRequestRepository {
    async fn insert(&self, request: &BloodRequest) -> Result<(), BloodRequestPersistenceError> {
        let row = NewBloodRequestRow {
            id: *request.id.as_uuid(),
            hospital_id: *request.hospital_id.as_uuid(),
            blood_group: request.blood_group.as_str(),
            quantity: quantity_for_db(request.quantity)?,
            urgency: request.urgency.as_str(),
            city: request.city.as_ref(),
            notes: request.notes.as_deref(),
            status: request.status.as_str(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(blood_requests::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &RequestId,
    ) -> Result<Option<BloodRequest>, BloodRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BloodRequestRow> = blood_requests::table
            .filter(blood_requests::id.eq(id.as_uuid()))
            .select(BloodRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Self::hydrate(&mut conn, vec![row]).await?.pop())
    }

    async fn list(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<BloodRequest>, BloodRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = blood_requests::table
            .select(BloodRequestRow::as_select())
            .order((blood_requests::created_at.desc(), blood_requests::id.desc()))
            .into_boxed();

        query = match filter {
            RequestFilter::ActiveMatching { city, blood_group } => query
                .filter(blood_requests::status.eq(RequestStatus::Active.as_str()))
                .filter(blood_requests::city.eq(city.as_ref().to_owned()))
                .filter(blood_requests::blood_group.eq(blood_group.as_str())),
            RequestFilter::OwnedBy(hospital_id) => {
                query.filter(blood_requests::hospital_id.eq(*hospital_id.as_uuid()))
            }
            RequestFilter::RespondedBy(donor_id) => query.filter(
                blood_requests::id.eq_any(
                    request_responders::table
                        .filter(request_responders::donor_id.eq(*donor_id.as_uuid()))
                        .select(request_responders::request_id),
                ),
            ),
            RequestFilter::All => query,
        };

        let rows: Vec<BloodRequestRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Self::hydrate(&mut conn, rows).await
    }

    async fn append_responder(
        &self,
        id: &RequestId,
        responder: &Responder,
    ) -> Result<AppendOutcome, BloodRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let exists: bool = diesel::select(diesel::dsl::exists(
            blood_requests::table.filter(blood_requests::id.eq(id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if !exists {
            return Ok(AppendOutcome::RequestMissing);
        }

        let row = ResponderRow {
            request_id: *id.as_uuid(),
            donor_id: *responder.donor_id.as_uuid(),
            responded_at: responder.responded_at,
        };
        let inserted = diesel::insert_into(request_responders::table)
            .values(&row)
            .on_conflict((request_responders::request_id, request_responders::donor_id))
            .do_nothing()
            .execute(&mut conn)
            .await;

        match inserted {
            Ok(0) => Ok(AppendOutcome::AlreadyPresent),
            Ok(_) => Ok(AppendOutcome::Appended),
            // The request was deleted between the existence check and the insert.
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                Ok(AppendOutcome::RequestMissing)
            }
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, BloodRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(blood_requests::table.find(*id.as_uuid()))
            .set((
                blood_requests::status.eq(status.as_str()),
                blood_requests::updated_at.eq(updated_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &RequestId) -> Result<bool, BloodRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(blood_requests::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
