use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use eduride_core::auth::{AuthContext, Role};
use eduride_core::error::{DomainError, DomainResult};

use crate::repository::RideStore;
use crate::ride::Ride;

/// Parameters for advertising a new ride.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRide {
    pub pickup: String,
    pub dropoff: String,
    pub pickup_time: DateTime<Utc>,
    pub fare_minor: i64,
    pub is_group: bool,
    pub max_passengers: u32,
}

/// Creates and queries ride advertisements. Mutation beyond creation is the
/// booking coordinator's job.
pub struct RideCatalog {
    store: Arc<dyn RideStore>,
}

impl RideCatalog {
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    pub async fn create_ride(&self, auth: &AuthContext, req: CreateRide) -> DomainResult<Ride> {
        if auth.role != Role::Driver {
            return Err(DomainError::Authorization(
                "only drivers can advertise rides".to_string(),
            ));
        }
        validate(&req)?;

        let ride = Ride::new(
            auth.actor_id,
            req.pickup.trim().to_string(),
            req.dropoff.trim().to_string(),
            req.pickup_time,
            req.fare_minor,
            req.is_group,
            req.max_passengers,
        );
        self.store.insert_ride(ride.clone()).await?;

        tracing::info!(
            ride_id = %ride.id,
            driver_id = %ride.driver_id,
            is_group = ride.is_group,
            "ride advertised"
        );
        Ok(ride)
    }

    pub async fn get_ride(&self, id: Uuid) -> DomainResult<Ride> {
        self.store
            .fetch_ride(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("ride {id}")))
    }

    pub async fn list_available(&self) -> DomainResult<Vec<Ride>> {
        self.store.list_available().await
    }

    pub async fn rides_for_driver(&self, driver_id: Uuid) -> DomainResult<Vec<Ride>> {
        self.store.list_for_driver(driver_id).await
    }

    pub async fn rides_for_student(&self, student_id: Uuid) -> DomainResult<Vec<Ride>> {
        self.store.list_for_student(student_id).await
    }
}

fn validate(req: &CreateRide) -> DomainResult<()> {
    let pickup = req.pickup.trim();
    let dropoff = req.dropoff.trim();

    if pickup.is_empty() || dropoff.is_empty() {
        return Err(DomainError::Validation(
            "pickup and dropoff locations are required".to_string(),
        ));
    }
    if pickup == dropoff {
        return Err(DomainError::Validation(
            "pickup and dropoff must differ".to_string(),
        ));
    }
    if req.fare_minor <= 0 {
        return Err(DomainError::Validation("fare must be positive".to_string()));
    }
    if req.max_passengers < 1 {
        return Err(DomainError::Validation(
            "max_passengers must be at least 1".to_string(),
        ));
    }
    if !req.is_group && req.max_passengers != 1 {
        return Err(DomainError::Validation(
            "non-group rides carry exactly one passenger".to_string(),
        ));
    }
    if req.pickup_time <= Utc::now() {
        return Err(DomainError::Validation(
            "pickup time must be in the future".to_string(),
        ));
    }
    Ok(())
}
