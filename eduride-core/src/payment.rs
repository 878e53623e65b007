use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(DomainError::Storage(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Upi,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Cash => "CASH",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "UPI" => Ok(PaymentMethod::Upi),
            "CASH" => Ok(PaymentMethod::Cash),
            other => Err(DomainError::Storage(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

/// The data a rendering collaborator turns into a payment QR code.
///
/// Serialized exactly once when a UPI intent is recorded and stored on the
/// payment verbatim. It is never regenerated from later ride state, so the
/// rendered code always matches what was agreed at intent time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QrPayload {
    pub ride_id: Uuid,
    pub driver_id: Uuid,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}

/// A recorded, not-yet-settled payment obligation tied to a ride.
///
/// `amount_minor` snapshots the ride fare at creation time and is immutable
/// afterwards. Payments are append-only: created Pending, moved exactly once
/// to Completed or Failed, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub student_id: Uuid,
    pub amount_minor: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub qr_payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(ride_id: Uuid, student_id: Uuid, amount_minor: i64, method: PaymentMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            ride_id,
            student_id,
            amount_minor,
            method,
            status: PaymentStatus::Pending,
            qr_payload: None,
            created_at: Utc::now(),
        }
    }

    /// Move the payment to a terminal status.
    ///
    /// Only Pending -> Completed and Pending -> Failed are legal. A repeat
    /// after the terminal commit fails, as does any attempt to return to
    /// Pending.
    pub fn transition(&mut self, to: PaymentStatus) -> DomainResult<()> {
        if self.status != PaymentStatus::Pending || to == PaymentStatus::Pending {
            return Err(DomainError::InvalidPaymentState {
                id: self.id.to_string(),
                from: self.status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}
