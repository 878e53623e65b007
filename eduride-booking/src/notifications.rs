use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use eduride_core::auth::{AuthContext, Role};
use eduride_core::error::DomainResult;
use eduride_catalog::repository::RideStore;
use eduride_catalog::ride::{Ride, RideStatus};

/// Feed records per call; older events simply fall off.
pub const FEED_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
}

/// A derived feed record. Nothing is persisted; the feed is recomputed from
/// stored ride history on every call, so it is deterministic for identical
/// stored state.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Read-only projection of recent ride activity for one user.
pub struct NotificationProjector {
    store: Arc<dyn RideStore>,
}

impl NotificationProjector {
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    /// At most `FEED_LIMIT` records, newest ride first.
    pub async fn project(&self, auth: &AuthContext) -> DomainResult<Vec<Notification>> {
        let mut rides = match auth.role {
            Role::Student => self.store.list_for_student(auth.actor_id).await?,
            Role::Driver => self.store.list_for_driver(auth.actor_id).await?,
        };
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let records = rides
            .iter()
            .filter_map(|ride| match auth.role {
                Role::Student => student_record(ride),
                Role::Driver => driver_record(ride),
            })
            .take(FEED_LIMIT)
            .collect();
        Ok(records)
    }
}

fn student_record(ride: &Ride) -> Option<Notification> {
    match ride.status {
        RideStatus::Booked => Some(Notification {
            kind: NotificationKind::Info,
            message: format!(
                "Your ride from {} to {} is confirmed!",
                ride.pickup, ride.dropoff
            ),
            timestamp: ride.created_at,
        }),
        RideStatus::InProgress => Some(Notification {
            kind: NotificationKind::Success,
            message: format!(
                "Your ride from {} to {} is on the way!",
                ride.pickup, ride.dropoff
            ),
            timestamp: ride.created_at,
        }),
        _ => None,
    }
}

fn driver_record(ride: &Ride) -> Option<Notification> {
    match ride.status {
        RideStatus::Booked => Some(Notification {
            kind: NotificationKind::Info,
            message: format!("New booking: {} to {}", ride.pickup, ride.dropoff),
            timestamp: ride.created_at,
        }),
        _ => None,
    }
}
