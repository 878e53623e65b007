use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use eduride_catalog::repository::{ApplyPayment, ApplyRide, PaymentStore, RideStore};
use eduride_catalog::ride::{Ride, RideStatus};
use eduride_core::error::{DomainError, DomainResult};
use eduride_core::payment::Payment;

/// In-memory store, the reference implementation of the isolation model.
///
/// Each aggregate sits behind its own async mutex: mutating operations on
/// one ride serialise against each other (booking and seat release alike)
/// while independent rides proceed without coordination. Reads clone the
/// record under its lock, so a snapshot never reflects a half-applied write.
#[derive(Default)]
pub struct MemoryStore {
    rides: RwLock<HashMap<Uuid, Arc<Mutex<Ride>>>>,
    payments: RwLock<HashMap<Uuid, Arc<Mutex<Payment>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn ride_cell(&self, id: Uuid) -> DomainResult<Arc<Mutex<Ride>>> {
        self.rides
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("ride {id}")))
    }

    async fn payment_cell(&self, id: Uuid) -> DomainResult<Arc<Mutex<Payment>>> {
        self.payments
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("payment {id}")))
    }

    async fn snapshot_rides(&self) -> Vec<Ride> {
        let cells: Vec<Arc<Mutex<Ride>>> = self.rides.read().await.values().cloned().collect();
        let mut rides = Vec::with_capacity(cells.len());
        for cell in cells {
            rides.push(cell.lock().await.clone());
        }
        rides
    }
}

fn sort_by_schedule(rides: &mut [Ride]) {
    rides.sort_by(|a, b| {
        a.pickup_time
            .cmp(&b.pickup_time)
            .then(a.created_at.cmp(&b.created_at))
    });
}

#[async_trait]
impl RideStore for MemoryStore {
    async fn insert_ride(&self, ride: Ride) -> DomainResult<()> {
        self.rides
            .write()
            .await
            .insert(ride.id, Arc::new(Mutex::new(ride)));
        Ok(())
    }

    async fn fetch_ride(&self, id: Uuid) -> DomainResult<Option<Ride>> {
        let cell = self.rides.read().await.get(&id).cloned();
        match cell {
            Some(cell) => Ok(Some(cell.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn update_ride(&self, id: Uuid, apply: ApplyRide<'_>) -> DomainResult<Ride> {
        let cell = self.ride_cell(id).await?;
        let mut guard = cell.lock().await;

        // Mutate a scratch copy; commit only on Ok so a failed precondition
        // leaves the stored aggregate untouched.
        let mut draft = guard.clone();
        apply(&mut draft)?;
        debug_assert!(draft.current_passengers <= draft.max_passengers);

        *guard = draft.clone();
        Ok(draft)
    }

    async fn list_available(&self) -> DomainResult<Vec<Ride>> {
        let mut rides: Vec<Ride> = self
            .snapshot_rides()
            .await
            .into_iter()
            .filter(|r| r.status == RideStatus::Available)
            .collect();
        sort_by_schedule(&mut rides);
        Ok(rides)
    }

    async fn list_for_driver(&self, driver_id: Uuid) -> DomainResult<Vec<Ride>> {
        let mut rides: Vec<Ride> = self
            .snapshot_rides()
            .await
            .into_iter()
            .filter(|r| r.driver_id == driver_id)
            .collect();
        sort_by_schedule(&mut rides);
        Ok(rides)
    }

    async fn list_for_student(&self, student_id: Uuid) -> DomainResult<Vec<Ride>> {
        let mut rides: Vec<Ride> = self
            .snapshot_rides()
            .await
            .into_iter()
            .filter(|r| r.holds_seat(student_id))
            .collect();
        sort_by_schedule(&mut rides);
        Ok(rides)
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert_payment(&self, payment: Payment) -> DomainResult<()> {
        self.payments
            .write()
            .await
            .insert(payment.id, Arc::new(Mutex::new(payment)));
        Ok(())
    }

    async fn fetch_payment(&self, id: Uuid) -> DomainResult<Option<Payment>> {
        let cell = self.payments.read().await.get(&id).cloned();
        match cell {
            Some(cell) => Ok(Some(cell.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn update_payment(&self, id: Uuid, apply: ApplyPayment<'_>) -> DomainResult<Payment> {
        let cell = self.payment_cell(id).await?;
        let mut guard = cell.lock().await;

        let mut draft = guard.clone();
        apply(&mut draft)?;

        *guard = draft.clone();
        Ok(draft)
    }

    async fn list_for_ride(&self, ride_id: Uuid) -> DomainResult<Vec<Payment>> {
        let cells: Vec<Arc<Mutex<Payment>>> =
            self.payments.read().await.values().cloned().collect();
        let mut payments = Vec::new();
        for cell in cells {
            let payment = cell.lock().await.clone();
            if payment.ride_id == ride_id {
                payments.push(payment);
            }
        }
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(payments)
    }
}
