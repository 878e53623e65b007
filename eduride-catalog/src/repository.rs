use async_trait::async_trait;
use uuid::Uuid;

use eduride_core::error::DomainResult;
use eduride_core::payment::Payment;

use crate::ride::Ride;

/// Mutation applied to a ride aggregate under its exclusive lock.
pub type ApplyRide<'a> = &'a (dyn Fn(&mut Ride) -> DomainResult<()> + Send + Sync);

/// Mutation applied to a payment record under its exclusive lock.
pub type ApplyPayment<'a> = &'a (dyn Fn(&mut Payment) -> DomainResult<()> + Send + Sync);

/// Storage for ride aggregates (a ride plus its memberships).
///
/// The aggregate is the unit of isolation: `update_ride` serialises mutating
/// operations on one ride relative to each other, while independent rides
/// need no coordination. Reads are snapshots and never observe a partially
/// applied write.
#[async_trait]
pub trait RideStore: Send + Sync {
    async fn insert_ride(&self, ride: Ride) -> DomainResult<()>;

    async fn fetch_ride(&self, id: Uuid) -> DomainResult<Option<Ride>>;

    /// Atomic read-modify-write on a single aggregate.
    ///
    /// `apply` runs against a private copy while the ride is exclusively
    /// held; the copy is committed only when it returns Ok, so a failing
    /// precondition leaves the stored aggregate untouched. Returns the
    /// committed state.
    async fn update_ride(&self, id: Uuid, apply: ApplyRide<'_>) -> DomainResult<Ride>;

    /// Rides with status Available, ordered by pickup time ascending, ties
    /// broken by creation order.
    async fn list_available(&self) -> DomainResult<Vec<Ride>>;

    /// Rides advertised by the driver, same ordering as `list_available`.
    async fn list_for_driver(&self, driver_id: Uuid) -> DomainResult<Vec<Ride>>;

    /// Rides the student occupies a seat on, as sole rider or member, same
    /// ordering as `list_available`.
    async fn list_for_student(&self, student_id: Uuid) -> DomainResult<Vec<Ride>>;
}

/// Append-only storage for payment records.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_payment(&self, payment: Payment) -> DomainResult<()>;

    async fn fetch_payment(&self, id: Uuid) -> DomainResult<Option<Payment>>;

    /// Same commit-on-Ok contract as `RideStore::update_ride`.
    async fn update_payment(&self, id: Uuid, apply: ApplyPayment<'_>) -> DomainResult<Payment>;

    /// Payments recorded against a ride, in creation order.
    async fn list_for_ride(&self, ride_id: Uuid) -> DomainResult<Vec<Payment>>;
}
