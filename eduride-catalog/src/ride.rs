use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eduride_core::error::{DomainError, DomainResult};

/// Lifecycle state of a ride.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Available,
    Booked,
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Available => "AVAILABLE",
            RideStatus::Booked => "BOOKED",
            RideStatus::InProgress => "IN_PROGRESS",
            RideStatus::Completed => "COMPLETED",
            RideStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "AVAILABLE" => Ok(RideStatus::Available),
            "BOOKED" => Ok(RideStatus::Booked),
            "IN_PROGRESS" => Ok(RideStatus::InProgress),
            "COMPLETED" => Ok(RideStatus::Completed),
            "CANCELLED" => Ok(RideStatus::Cancelled),
            other => Err(DomainError::Storage(format!("unknown ride status: {other}"))),
        }
    }

    /// Completed and Cancelled are logical end states; nothing leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }
}

/// A student's claim on one seat of a group ride.
///
/// Created on booking, never mutated, removed only when the student releases
/// the seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub student_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

/// An advertised trip. The aggregate root of the booking engine.
///
/// The ride owns its memberships; the pair is read and written as one unit.
/// All mutation goes through the booking coordinator under the store's
/// per-ride lock, so `current_passengers` never drifts from the membership
/// count and never exceeds `max_passengers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub driver_id: Uuid,
    /// Sole rider of a non-group ride. Group rides track riders in `members`.
    pub rider_id: Option<Uuid>,
    pub pickup: String,
    pub dropoff: String,
    pub pickup_time: DateTime<Utc>,
    /// Fare in minor currency units.
    pub fare_minor: i64,
    pub is_group: bool,
    pub max_passengers: u32,
    pub current_passengers: u32,
    pub status: RideStatus,
    pub members: Vec<Membership>,
    pub created_at: DateTime<Utc>,
}

impl Ride {
    pub fn new(
        driver_id: Uuid,
        pickup: String,
        dropoff: String,
        pickup_time: DateTime<Utc>,
        fare_minor: i64,
        is_group: bool,
        max_passengers: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            driver_id,
            rider_id: None,
            pickup,
            dropoff,
            pickup_time,
            fare_minor,
            is_group,
            max_passengers,
            current_passengers: 0,
            status: RideStatus::Available,
            members: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.current_passengers < self.max_passengers
    }

    pub fn member(&self, student_id: Uuid) -> Option<&Membership> {
        self.members.iter().find(|m| m.student_id == student_id)
    }

    /// Whether the student occupies a seat, either as the sole rider of a
    /// non-group ride or through a membership.
    pub fn holds_seat(&self, student_id: Uuid) -> bool {
        self.rider_id == Some(student_id) || self.member(student_id).is_some()
    }

    /// Claim the single seat of a non-group ride.
    pub fn assign_sole_rider(&mut self, student_id: Uuid) {
        self.rider_id = Some(student_id);
        self.current_passengers = 1;
    }

    /// Append a membership and bring the passenger count along with it.
    /// Returns the new membership id.
    pub fn add_member(&mut self, student_id: Uuid) -> Uuid {
        let member = Membership {
            id: Uuid::new_v4(),
            ride_id: self.id,
            student_id,
            joined_at: Utc::now(),
        };
        let member_id = member.id;
        self.members.push(member);
        self.current_passengers = self.members.len() as u32;
        member_id
    }

    /// Give the student's seat back.
    pub fn release_seat(&mut self, student_id: Uuid) {
        if self.is_group {
            self.members.retain(|m| m.student_id != student_id);
            self.current_passengers = self.members.len() as u32;
        } else {
            self.rider_id = None;
            self.current_passengers = 0;
        }
    }
}
