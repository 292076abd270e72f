use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helios_api::background::progress_sweep;
use helios_api::config::ServerConfig;
use helios_api::router::build_app_router;
use helios_api::state::AppState;
use helios_core::store::{Notifier, Stores};
use helios_db::PgStore;
use helios_events::{
    EmailConfig, EmailDelivery, EventBus, EventNotifier, NotificationLog,
    NotificationPersistence, PgNotificationLog,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "helios_api=debug,helios_core=info,helios_events=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(
        host = %config.host,
        port = %config.port,
        weighting = ?config.progress_weighting,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = helios_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    helios_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    helios_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let notifications: Arc<dyn NotificationLog> = Arc::new(PgNotificationLog::new(pool.clone()));

    // Spawn notification persistence (writes every event to `notifications`).
    let persistence_handle = tokio::spawn(NotificationPersistence::run(
        Arc::clone(&notifications),
        event_bus.subscribe(),
    ));

    // --- Notifier ---
    let mut event_notifier = EventNotifier::new(Arc::clone(&event_bus));
    match EmailConfig::from_env() {
        Some(email) => {
            tracing::info!(smtp_host = %email.smtp_host, "Email notifications enabled");
            event_notifier = event_notifier.with_email(EmailDelivery::new(email));
        }
        None => tracing::info!("SMTP_HOST or NOTIFY_EMAIL_TO not set, email notifications off"),
    }
    let notifier: Arc<dyn Notifier> = Arc::new(event_notifier);

    // --- App state ---
    let stores = Stores::from_shared(Arc::new(PgStore::new(pool.clone())));
    let state = AppState::new(config.clone(), stores, notifier, notifications).with_pool(pool);

    // --- Progress sweep ---
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = config.sweep_interval().map(|every| {
        tokio::spawn(progress_sweep::run(
            Arc::clone(&state.tracker),
            every,
            sweep_cancel.clone(),
        ))
    });
    if sweep_handle.is_none() {
        tracing::info!("Progress sweep disabled");
    }

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweep_cancel.cancel();
    if let Some(handle) = sweep_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Progress sweep stopped");
    }

    // Dropping the last bus handle closes the channel and ends persistence.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), persistence_handle).await;
    tracing::info!("Notification persistence shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
