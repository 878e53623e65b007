use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use eduride_core::auth::{AuthContext, Role};
use eduride_core::error::{DomainError, DomainResult};
use eduride_catalog::repository::RideStore;
use eduride_catalog::ride::{Ride, RideStatus};

use crate::lifecycle::{transition, RideEvent};

/// Outcome of a successful `book_seat`.
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub ride_id: Uuid,
    pub status: RideStatus,
    /// Set for group rides; non-group rides have a sole rider instead.
    pub membership_id: Option<Uuid>,
}

/// Orchestrates seat allocation and status transitions.
///
/// Every mutating operation runs as one atomic read-modify-write against a
/// single ride aggregate through `RideStore::update_ride`. The closure sees
/// a private copy under the ride's exclusive lock; either the full set of
/// effects commits or none of them do, and a losing concurrent caller fails
/// fast with the typed error instead of queuing.
pub struct BookingCoordinator {
    store: Arc<dyn RideStore>,
}

impl BookingCoordinator {
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    /// Claim a seat for the acting student.
    ///
    /// Non-group rides flip Available -> Booked and record the sole rider.
    /// Group rides append a membership and bump the count; the first member
    /// moves the ride to Booked, later members leave it there.
    pub async fn book_seat(
        &self,
        ride_id: Uuid,
        auth: &AuthContext,
    ) -> DomainResult<BookingConfirmation> {
        if auth.role != Role::Student {
            return Err(DomainError::Authorization(
                "only students can book seats".to_string(),
            ));
        }
        let student_id = auth.actor_id;

        let updated = self
            .store
            .update_ride(ride_id, &move |ride: &mut Ride| {
                if ride.is_group && ride.holds_seat(student_id) {
                    return Err(DomainError::DuplicateMembership {
                        ride_id: ride.id.to_string(),
                        student_id: student_id.to_string(),
                    });
                }
                let next = transition(ride, RideEvent::Book)?;
                if ride.is_group {
                    ride.add_member(student_id);
                } else {
                    ride.assign_sole_rider(student_id);
                }
                ride.status = next;
                Ok(())
            })
            .await?;

        tracing::info!(
            ride_id = %ride_id,
            student_id = %student_id,
            passengers = updated.current_passengers,
            "seat booked"
        );

        let membership_id = if updated.is_group {
            updated.member(student_id).map(|m| m.id)
        } else {
            None
        };
        Ok(BookingConfirmation {
            ride_id: updated.id,
            status: updated.status,
            membership_id,
        })
    }

    /// Booked -> InProgress, by the owning driver.
    pub async fn start_ride(&self, ride_id: Uuid, auth: &AuthContext) -> DomainResult<Ride> {
        self.driver_transition(ride_id, auth, RideEvent::Start).await
    }

    /// InProgress -> Completed, by the owning driver. Terminal.
    pub async fn complete_ride(&self, ride_id: Uuid, auth: &AuthContext) -> DomainResult<Ride> {
        self.driver_transition(ride_id, auth, RideEvent::Complete)
            .await
    }

    /// Cancel, legal only while the ride has not departed.
    ///
    /// The owning driver cancels the whole ride regardless of passenger
    /// count. A booked rider releases only their own seat; when the last
    /// seat is freed the ride reverts to Available.
    pub async fn cancel_ride(&self, ride_id: Uuid, auth: &AuthContext) -> DomainResult<Ride> {
        let actor_id = auth.actor_id;
        let updated = match auth.role {
            Role::Driver => {
                self.store
                    .update_ride(ride_id, &move |ride: &mut Ride| {
                        if ride.driver_id != actor_id {
                            return Err(DomainError::Authorization(
                                "ride belongs to another driver".to_string(),
                            ));
                        }
                        ride.status = transition(ride, RideEvent::CancelRide)?;
                        Ok(())
                    })
                    .await?
            }
            Role::Student => {
                self.store
                    .update_ride(ride_id, &move |ride: &mut Ride| {
                        if !ride.holds_seat(actor_id) {
                            return Err(DomainError::Authorization(
                                "no seat held on this ride".to_string(),
                            ));
                        }
                        let next = transition(ride, RideEvent::ReleaseSeat)?;
                        ride.release_seat(actor_id);
                        ride.status = next;
                        Ok(())
                    })
                    .await?
            }
        };

        tracing::info!(
            ride_id = %ride_id,
            actor_id = %actor_id,
            role = auth.role.as_str(),
            status = ?updated.status,
            "ride cancelled or seat released"
        );
        Ok(updated)
    }

    async fn driver_transition(
        &self,
        ride_id: Uuid,
        auth: &AuthContext,
        event: RideEvent,
    ) -> DomainResult<Ride> {
        if auth.role != Role::Driver {
            return Err(DomainError::Authorization(format!(
                "only the driver can {} a ride",
                event.as_str()
            )));
        }
        let driver_id = auth.actor_id;

        let updated = self
            .store
            .update_ride(ride_id, &move |ride: &mut Ride| {
                if ride.driver_id != driver_id {
                    return Err(DomainError::Authorization(
                        "ride belongs to another driver".to_string(),
                    ));
                }
                ride.status = transition(ride, event)?;
                Ok(())
            })
            .await?;

        tracing::info!(
            ride_id = %ride_id,
            driver_id = %driver_id,
            status = ?updated.status,
            "ride transitioned"
        );
        Ok(updated)
    }
}
