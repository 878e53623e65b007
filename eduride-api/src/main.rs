use std::net::SocketAddr;
use std::sync::Arc;

use eduride_api::{
    app,
    state::{AppState, AuthConfig},
};
use eduride_booking::{BookingCoordinator, NotificationProjector, PaymentLedger};
use eduride_catalog::catalog::RideCatalog;
use eduride_store::{DbClient, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eduride_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = eduride_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Edu-Ride API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let store = Arc::new(PgStore::new(db.pool.clone()));

    let app_state = AppState {
        catalog: Arc::new(RideCatalog::new(store.clone())),
        coordinator: Arc::new(BookingCoordinator::new(store.clone())),
        ledger: Arc::new(PaymentLedger::new(store.clone(), store.clone())),
        projector: Arc::new(NotificationProjector::new(store.clone())),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
