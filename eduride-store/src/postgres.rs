use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use eduride_catalog::repository::{ApplyPayment, ApplyRide, PaymentStore, RideStore};
use eduride_catalog::ride::{Membership, Ride, RideStatus};
use eduride_core::error::{DomainError, DomainResult};
use eduride_core::payment::{Payment, PaymentMethod, PaymentStatus};

/// Postgres-backed store.
///
/// Per-ride serialisation comes from `SELECT ... FOR UPDATE` on the ride
/// row: the row lock covers the aggregate for the duration of the
/// transaction, and the memberships are rewritten inside the same
/// transaction. Dropping the transaction on an apply error rolls everything
/// back, so a failing precondition commits nothing.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::Storage(e.to_string())
}

#[derive(sqlx::FromRow)]
struct RideRow {
    id: Uuid,
    driver_id: Uuid,
    rider_id: Option<Uuid>,
    pickup: String,
    dropoff: String,
    pickup_time: DateTime<Utc>,
    fare_minor: i64,
    is_group: bool,
    max_passengers: i32,
    current_passengers: i32,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    ride_id: Uuid,
    student_id: Uuid,
    joined_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    ride_id: Uuid,
    student_id: Uuid,
    amount_minor: i64,
    method: String,
    status: String,
    qr_payload: Option<String>,
    created_at: DateTime<Utc>,
}

const RIDE_COLUMNS: &str = "id, driver_id, rider_id, pickup, dropoff, pickup_time, fare_minor, \
     is_group, max_passengers, current_passengers, status, created_at";

const PAYMENT_COLUMNS: &str =
    "id, ride_id, student_id, amount_minor, method, status, qr_payload, created_at";

fn into_ride(row: RideRow, members: Vec<MemberRow>) -> DomainResult<Ride> {
    Ok(Ride {
        id: row.id,
        driver_id: row.driver_id,
        rider_id: row.rider_id,
        pickup: row.pickup,
        dropoff: row.dropoff,
        pickup_time: row.pickup_time,
        fare_minor: row.fare_minor,
        is_group: row.is_group,
        max_passengers: row.max_passengers as u32,
        current_passengers: row.current_passengers as u32,
        status: RideStatus::parse(&row.status)?,
        members: members
            .into_iter()
            .map(|m| Membership {
                id: m.id,
                ride_id: m.ride_id,
                student_id: m.student_id,
                joined_at: m.joined_at,
            })
            .collect(),
        created_at: row.created_at,
    })
}

fn into_payment(row: PaymentRow) -> DomainResult<Payment> {
    Ok(Payment {
        id: row.id,
        ride_id: row.ride_id,
        student_id: row.student_id,
        amount_minor: row.amount_minor,
        method: PaymentMethod::parse(&row.method)?,
        status: PaymentStatus::parse(&row.status)?,
        qr_payload: row.qr_payload,
        created_at: row.created_at,
    })
}

impl PgStore {
    async fn members_of(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
    ) -> DomainResult<Vec<MemberRow>> {
        sqlx::query_as::<_, MemberRow>(
            "SELECT id, ride_id, student_id, joined_at FROM ride_members \
             WHERE ride_id = $1 ORDER BY joined_at",
        )
        .bind(ride_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(db_err)
    }

    async fn load_rides(&self, rows: Vec<RideRow>) -> DomainResult<Vec<Ride>> {
        let mut rides = Vec::with_capacity(rows.len());
        for row in rows {
            let members = sqlx::query_as::<_, MemberRow>(
                "SELECT id, ride_id, student_id, joined_at FROM ride_members \
                 WHERE ride_id = $1 ORDER BY joined_at",
            )
            .bind(row.id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
            rides.push(into_ride(row, members)?);
        }
        Ok(rides)
    }
}

#[async_trait]
impl RideStore for PgStore {
    async fn insert_ride(&self, ride: Ride) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO rides (id, driver_id, rider_id, pickup, dropoff, pickup_time, \
             fare_minor, is_group, max_passengers, current_passengers, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(ride.id)
        .bind(ride.driver_id)
        .bind(ride.rider_id)
        .bind(&ride.pickup)
        .bind(&ride.dropoff)
        .bind(ride.pickup_time)
        .bind(ride.fare_minor)
        .bind(ride.is_group)
        .bind(ride.max_passengers as i32)
        .bind(ride.current_passengers as i32)
        .bind(ride.status.as_str())
        .bind(ride.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn fetch_ride(&self, id: Uuid) -> DomainResult<Option<Ride>> {
        let row = sqlx::query_as::<_, RideRow>(&format!(
            "SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => {
                let members = sqlx::query_as::<_, MemberRow>(
                    "SELECT id, ride_id, student_id, joined_at FROM ride_members \
                     WHERE ride_id = $1 ORDER BY joined_at",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
                Ok(Some(into_ride(row, members)?))
            }
            None => Ok(None),
        }
    }

    async fn update_ride(&self, id: Uuid, apply: ApplyRide<'_>) -> DomainResult<Ride> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query_as::<_, RideRow>(&format!(
            "SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::NotFound(format!("ride {id}")))?;

        let members = self.members_of(&mut tx, id).await?;
        let mut ride = into_ride(row, members)?;

        // An Err here drops the transaction, which releases the row lock
        // and rolls back with nothing written.
        apply(&mut ride)?;

        sqlx::query(
            "UPDATE rides SET rider_id = $2, status = $3, current_passengers = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(ride.rider_id)
        .bind(ride.status.as_str())
        .bind(ride.current_passengers as i32)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("DELETE FROM ride_members WHERE ride_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        for member in &ride.members {
            sqlx::query(
                "INSERT INTO ride_members (id, ride_id, student_id, joined_at) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(member.id)
            .bind(member.ride_id)
            .bind(member.student_id)
            .bind(member.joined_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(ride)
    }

    async fn list_available(&self) -> DomainResult<Vec<Ride>> {
        let rows = sqlx::query_as::<_, RideRow>(&format!(
            "SELECT {RIDE_COLUMNS} FROM rides WHERE status = 'AVAILABLE' \
             ORDER BY pickup_time, created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        self.load_rides(rows).await
    }

    async fn list_for_driver(&self, driver_id: Uuid) -> DomainResult<Vec<Ride>> {
        let rows = sqlx::query_as::<_, RideRow>(&format!(
            "SELECT {RIDE_COLUMNS} FROM rides WHERE driver_id = $1 \
             ORDER BY pickup_time, created_at"
        ))
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        self.load_rides(rows).await
    }

    async fn list_for_student(&self, student_id: Uuid) -> DomainResult<Vec<Ride>> {
        let rows = sqlx::query_as::<_, RideRow>(&format!(
            "SELECT {RIDE_COLUMNS} FROM rides r WHERE r.rider_id = $1 \
             OR EXISTS (SELECT 1 FROM ride_members m WHERE m.ride_id = r.id AND m.student_id = $1) \
             ORDER BY pickup_time, created_at"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        self.load_rides(rows).await
    }
}

#[async_trait]
impl PaymentStore for PgStore {
    async fn insert_payment(&self, payment: Payment) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO payments (id, ride_id, student_id, amount_minor, method, status, \
             qr_payload, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(payment.id)
        .bind(payment.ride_id)
        .bind(payment.student_id)
        .bind(payment.amount_minor)
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.qr_payload)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn fetch_payment(&self, id: Uuid) -> DomainResult<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(into_payment).transpose()
    }

    async fn update_payment(&self, id: Uuid, apply: ApplyPayment<'_>) -> DomainResult<Payment> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::NotFound(format!("payment {id}")))?;

        let mut payment = into_payment(row)?;
        apply(&mut payment)?;

        // Amount and QR payload are immutable after creation; only the
        // status ever changes.
        sqlx::query("UPDATE payments SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(payment.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(payment)
    }

    async fn list_for_ride(&self, ride_id: Uuid) -> DomainResult<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE ride_id = $1 ORDER BY created_at"
        ))
        .bind(ride_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(into_payment).collect()
    }
}
