use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use venue_api::{app, AppState};
use venue_booking::{BookingService, LedgerService, StaffService};
use venue_core::notify::LogNotifier;
use venue_core::payment::MockPaymentGateway;
use venue_store::{
    Config, DbClient, PgGiftCardRepository, PgReservationRepository, PgResourceRepository,
    PgStaffRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "venue_api=debug,venue_booking=debug,venue_store=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load config")?;
    tracing::info!("Starting venue API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .context("failed to connect to database")?;
    db.migrate().await.context("failed to run migrations")?;

    let reservations = Arc::new(PgReservationRepository::new(db.pool.clone()));
    let catalog = Arc::new(PgResourceRepository::new(db.pool.clone()));
    let cards = Arc::new(PgGiftCardRepository::new(db.pool.clone()));
    let staff_repo = Arc::new(PgStaffRepository::new(db.pool.clone()));
    let notifier = Arc::new(LogNotifier);
    let rules = config.engine.clone();

    let state = AppState {
        booking: Arc::new(BookingService::new(
            reservations,
            catalog,
            staff_repo.clone(),
            notifier.clone(),
            Arc::new(MockPaymentGateway),
            rules.clone(),
        )),
        ledger: Arc::new(LedgerService::new(cards, notifier, rules)),
        staff: Arc::new(StaffService::new(staff_repo)),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
