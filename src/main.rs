mod application;
mod auth;
mod db;
mod error;
mod middleware;
mod notification;
mod reminder;
mod routes;
mod scheduler;
mod state;

use application::ApplicationRepository;
use db::{create_pool, run_migrations};
use notification::NotificationRepository;
use reminder::{ReminderRepository, ReminderService};
use routes::create_router;
use scheduler::{ReminderScheduler, SystemClock};
use state::{AppState, Config};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_tracker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    // Created notifications fan out to SSE subscribers
    let (notification_tx, _) = broadcast::channel(100);

    // Create repositories
    let application_repository = ApplicationRepository::new(db.clone());
    let reminder_repository = ReminderRepository::new(db.clone());
    let notification_repository = NotificationRepository::new(db.clone());

    // Create services
    let reminder_service =
        ReminderService::new(reminder_repository.clone(), application_repository.clone());

    let state = AppState {
        config: config.clone(),
        notification_tx: notification_tx.clone(),
        application_repository,
        notification_repository: notification_repository.clone(),
        reminder_service,
    };

    // Start the reminder scheduler
    let reminder_scheduler = Arc::new(
        ReminderScheduler::new(
            Arc::new(reminder_repository),
            Arc::new(notification_repository),
            Arc::new(SystemClock),
            &config.scheduler,
        )
        .with_broadcast(notification_tx),
    );
    let scheduler_handle = reminder_scheduler.start(&config.scheduler.schedule).await?;

    let app = create_router(state);

    let addr = config.addr();
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler_handle.shutdown().await?;
    db.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
