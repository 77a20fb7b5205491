use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use assist_events::{
    EventBus, LogDispatcher, NotificationDispatcher, Notifier, OutboxDispatcher, WebhookDelivery,
};
use assist_gcal::{CalendarSyncService, EnvCredentialProvider, GoogleCalendarProvider};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assist_api::config::ServerConfig;
use assist_api::router::build_app_router;
use assist_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assist_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = assist_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    assist_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    assist_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Event bus and notifications ---
    let event_bus = Arc::new(EventBus::default());
    let notifier = Arc::new(Notifier::new(pool.clone(), Arc::clone(&event_bus)));

    let dispatcher: Arc<dyn NotificationDispatcher> = match &config.notification_webhook_url {
        Some(url) => {
            tracing::info!(%url, "Delivering notifications to webhook");
            Arc::new(WebhookDelivery::new(url).context("Invalid NOTIFICATION_WEBHOOK_URL")?)
        }
        None => {
            tracing::info!("No notification webhook configured, notifications are logged");
            Arc::new(LogDispatcher)
        }
    };

    // Spawn the outbox dispatcher. It wakes on enqueue events and polls as a fallback.
    let outbox_cancel = CancellationToken::new();
    let outbox = OutboxDispatcher::new(
        pool.clone(),
        dispatcher,
        Duration::from_secs(config.outbox_poll_interval_secs),
    );
    let outbox_events = event_bus.subscribe();
    let outbox_cancel_clone = outbox_cancel.clone();
    let outbox_handle = tokio::spawn(async move {
        outbox.run(outbox_events, outbox_cancel_clone).await;
    });
    tracing::info!("Outbox dispatcher started");

    // --- Google Calendar ---
    let calendar_sync = Arc::new(CalendarSyncService::new(
        pool.clone(),
        Arc::new(EnvCredentialProvider),
        Arc::new(GoogleCalendarProvider::new().context("Failed to build Google Calendar client")?),
        config.oauth_state_secret.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        notifier,
        calendar_sync,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    outbox_cancel.cancel();
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(shutdown_timeout, outbox_handle).await.is_err() {
        tracing::warn!("Outbox dispatcher did not stop in time");
    } else {
        tracing::info!("Outbox dispatcher stopped");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
