use std::sync::Arc;

use uuid::Uuid;

use eduride_core::auth::{AuthContext, Role};
use eduride_core::error::{DomainError, DomainResult};
use eduride_core::payment::{Payment, PaymentMethod, PaymentStatus, QrPayload};
use eduride_catalog::repository::{PaymentStore, RideStore};

/// Records payment intents correlated to a ride.
///
/// The amount is snapshotted from the ride's fare at the moment the intent
/// is recorded and never touched again; for UPI the QR payload is serialized
/// once alongside it.
pub struct PaymentLedger {
    rides: Arc<dyn RideStore>,
    payments: Arc<dyn PaymentStore>,
}

impl PaymentLedger {
    pub fn new(rides: Arc<dyn RideStore>, payments: Arc<dyn PaymentStore>) -> Self {
        Self { rides, payments }
    }

    pub async fn record_intent(
        &self,
        ride_id: Uuid,
        auth: &AuthContext,
        method: PaymentMethod,
    ) -> DomainResult<Payment> {
        if auth.role != Role::Student {
            return Err(DomainError::Authorization(
                "only students record payment intents".to_string(),
            ));
        }

        let ride = self
            .rides
            .fetch_ride(ride_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("ride {ride_id}")))?;

        let mut payment = Payment::new(ride.id, auth.actor_id, ride.fare_minor, method);
        if method == PaymentMethod::Upi {
            let payload = QrPayload {
                ride_id: ride.id,
                driver_id: ride.driver_id,
                amount: ride.fare_minor,
                timestamp: payment.created_at,
            };
            let serialized = serde_json::to_string(&payload)
                .map_err(|e| DomainError::Storage(e.to_string()))?;
            payment.qr_payload = Some(serialized);
        }

        self.payments.insert_payment(payment.clone()).await?;
        tracing::info!(
            payment_id = %payment.id,
            ride_id = %ride_id,
            method = method.as_str(),
            amount_minor = payment.amount_minor,
            "payment intent recorded"
        );
        Ok(payment)
    }

    /// Settle a pending payment. Only Pending -> Completed and
    /// Pending -> Failed are accepted; anything else is rejected without
    /// touching the record.
    pub async fn mark_status(
        &self,
        payment_id: Uuid,
        new_status: PaymentStatus,
    ) -> DomainResult<Payment> {
        let updated = self
            .payments
            .update_payment(payment_id, &move |payment: &mut Payment| {
                payment.transition(new_status)
            })
            .await?;
        tracing::info!(
            payment_id = %payment_id,
            status = new_status.as_str(),
            "payment settled"
        );
        Ok(updated)
    }

    pub async fn payments_for_ride(&self, ride_id: Uuid) -> DomainResult<Vec<Payment>> {
        self.payments.list_for_ride(ride_id).await
    }
}
