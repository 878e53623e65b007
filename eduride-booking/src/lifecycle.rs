//! Pure transition rules for the ride lifecycle.
//!
//! The coordinator consults `transition` before applying any mutation; the
//! function itself never mutates anything. All logic is deterministic over
//! the ride snapshot it is given.

use eduride_core::error::{DomainError, DomainResult};
use eduride_catalog::ride::{Ride, RideStatus};

/// Events that can move a ride through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideEvent {
    /// A student claims a seat.
    Book,
    /// The owning driver starts the trip.
    Start,
    /// The owning driver completes the trip.
    Complete,
    /// The owning driver cancels the whole ride.
    CancelRide,
    /// A booked rider gives their seat back.
    ReleaseSeat,
}

impl RideEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideEvent::Book => "book",
            RideEvent::Start => "start",
            RideEvent::Complete => "complete",
            RideEvent::CancelRide => "cancel",
            RideEvent::ReleaseSeat => "release-seat",
        }
    }
}

/// Decide the next status for `ride` under `event`, or reject.
///
/// | From               | Event        | Guard               | To         |
/// |--------------------|--------------|---------------------|------------|
/// | Available          | book         | capacity available  | Booked     |
/// | Booked             | book (group) | capacity remaining  | Booked     |
/// | Booked             | start        |                     | InProgress |
/// | InProgress         | complete     |                     | Completed  |
/// | Available, Booked  | cancel       |                     | Cancelled  |
/// | Booked             | release-seat | last seat freed     | Available  |
///
/// Completed and Cancelled reject every event. A full group ride stays
/// Booked; capacity is enforced by the guard alone, there is no separate
/// "full" status.
pub fn transition(ride: &Ride, event: RideEvent) -> DomainResult<RideStatus> {
    use eduride_catalog::ride::RideStatus::*;

    let conflict = || DomainError::StateConflict {
        from: ride.status.as_str().to_string(),
        event: event.as_str().to_string(),
    };

    match (ride.status, event) {
        (Available, RideEvent::Book) => {
            if ride.has_capacity() {
                Ok(Booked)
            } else {
                Err(DomainError::RideFull {
                    capacity: ride.max_passengers,
                })
            }
        }
        (Booked, RideEvent::Book) => {
            if !ride.is_group {
                Err(DomainError::RideNotAvailable(ride.id.to_string()))
            } else if !ride.has_capacity() {
                Err(DomainError::RideFull {
                    capacity: ride.max_passengers,
                })
            } else {
                Ok(Booked)
            }
        }

        (Booked, RideEvent::Start) => Ok(InProgress),
        (InProgress, RideEvent::Complete) => Ok(Completed),
        (Available | Booked, RideEvent::CancelRide) => Ok(Cancelled),

        (Booked, RideEvent::ReleaseSeat) => {
            // Guard is on the occupancy before removal: freeing the last
            // seat reverts the ride to Available.
            if ride.current_passengers <= 1 {
                Ok(Available)
            } else {
                Ok(Booked)
            }
        }

        _ => Err(conflict()),
    }
}
