pub mod auth;
pub mod error;
pub mod payment;

pub use auth::{AuthContext, Role};
pub use error::{DomainError, DomainResult};
pub use payment::{Payment, PaymentMethod, PaymentStatus, QrPayload};
