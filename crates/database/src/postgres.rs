use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{NewReservation, Reservation, VehicleType};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{FromRow, Transaction};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{ReservationStore, ReservationUnit};

/// The Postgres-backed reservation store used in production.
///
/// Atomicity comes from two layers. Each booking unit is a transaction that
/// first takes `pg_advisory_xact_lock(hashtext(vehicle_type))`, so units for
/// one vehicle type run strictly one at a time while other types proceed on
/// their own locks. Underneath that, the `reservations_no_overlap` exclusion
/// constraint rejects overlapping rows of the same type at the schema level,
/// catching anything written past the resolver.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of the `reservations` table.
#[derive(Debug, Clone, FromRow)]
struct DbReservation {
    id: Uuid,
    user_id: String,
    vehicle_type: VehicleType,
    pickup_date: NaiveDate,
    return_date: NaiveDate,
    price: Option<Decimal>,
    notes: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl DbReservation {
    fn into_reservation(self) -> Result<Reservation, StoreError> {
        let status = self
            .status
            .parse()
            .map_err(|_| StoreError::CorruptRow(format!("unknown status '{}'", self.status)))?;
        Ok(Reservation {
            id: self.id,
            user_id: self.user_id,
            vehicle_type: self.vehicle_type,
            pickup_date: self.pickup_date,
            return_date: self.return_date,
            price: self.price,
            notes: self.notes,
            status,
            created_at: self.created_at,
        })
    }
}

struct PgUnit {
    tx: Transaction<'static, Postgres>,
    vehicle_type: VehicleType,
}

#[async_trait]
impl ReservationUnit for PgUnit {
    async fn existing_reservations(&mut self) -> Result<Vec<Reservation>, StoreError> {
        let rows = sqlx::query_as::<_, DbReservation>(
            r#"
            SELECT id, user_id, vehicle_type, pickup_date, return_date, price, notes, status, created_at
            FROM reservations
            WHERE vehicle_type = $1
            "#,
        )
        .bind(&self.vehicle_type)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(DbReservation::into_reservation).collect()
    }

    async fn insert(&mut self, reservation: NewReservation) -> Result<Reservation, StoreError> {
        let row = sqlx::query_as::<_, DbReservation>(
            r#"
            INSERT INTO reservations (id, user_id, vehicle_type, pickup_date, return_date, price, notes, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING id, user_id, vehicle_type, pickup_date, return_date, price, notes, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&reservation.user_id)
        .bind(&reservation.vehicle_type)
        .bind(reservation.pickup_date)
        .bind(reservation.return_date)
        .bind(reservation.price)
        .bind(&reservation.notes)
        .bind(reservation.status.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_insert_error)?;

        row.into_reservation()
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for PgStore {
    async fn begin_unit(
        &self,
        vehicle_type: &VehicleType,
    ) -> Result<Box<dyn ReservationUnit>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Held until the transaction commits or rolls back. hashtext folds
        // the type name into the advisory lock keyspace; a hash collision
        // between two type names costs latency, never correctness.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(vehicle_type)
            .execute(&mut *tx)
            .await?;
        tracing::debug!(vehicle_type = %vehicle_type, "advisory lock acquired");

        Ok(Box::new(PgUnit {
            tx,
            vehicle_type: vehicle_type.clone(),
        }))
    }

    async fn reservations_for_user(&self, user_id: &str) -> Result<Vec<Reservation>, StoreError> {
        let rows = sqlx::query_as::<_, DbReservation>(
            r#"
            SELECT id, user_id, vehicle_type, pickup_date, return_date, price, notes, status, created_at
            FROM reservations
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DbReservation::into_reservation).collect()
    }
}

/// 23P01 is an exclusion constraint violation. The gist constraint is the
/// last line of defense if a conflicting row lands outside the advisory
/// lock, e.g. written by hand or by an older deployment.
fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23P01") {
            return StoreError::Conflict;
        }
    }
    StoreError::DatabaseError(err)
}
