/// Failure taxonomy shared by every component.
///
/// Every operation returns one of these as a typed result; nothing panics
/// across a component boundary and nothing partially commits before failing.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("illegal transition from {from} on {event}")]
    StateConflict { from: String, event: String },

    #[error("ride not available: {0}")]
    RideNotAvailable(String),

    #[error("ride full: all {capacity} seats are taken")]
    RideFull { capacity: u32 },

    #[error("student {student_id} already holds a seat on ride {ride_id}")]
    DuplicateMembership { ride_id: String, student_id: String },

    #[error("payment {id} cannot move from {from} to {to}")]
    InvalidPaymentState { id: String, from: String, to: String },

    #[error("storage error: {0}")]
    Storage(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
