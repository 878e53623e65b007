pub mod coordinator;
pub mod ledger;
pub mod lifecycle;
pub mod notifications;

pub use coordinator::{BookingConfirmation, BookingCoordinator};
pub use ledger::PaymentLedger;
pub use lifecycle::{transition, RideEvent};
pub use notifications::{Notification, NotificationKind, NotificationProjector};
