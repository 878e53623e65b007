pub mod catalog;
pub mod repository;
pub mod ride;

pub use catalog::{CreateRide, RideCatalog};
pub use repository::{PaymentStore, RideStore};
pub use ride::{Membership, Ride, RideStatus};
