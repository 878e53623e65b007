use std::sync::Arc;

use eduride_booking::{BookingCoordinator, NotificationProjector, PaymentLedger};
use eduride_catalog::catalog::RideCatalog;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RideCatalog>,
    pub coordinator: Arc<BookingCoordinator>,
    pub ledger: Arc<PaymentLedger>,
    pub projector: Arc<NotificationProjector>,
    pub auth: AuthConfig,
}
