//! Logbook LINE Bot
//!
//! Main application entry point

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use logbook::{
    config::Settings,
    database::{connection::{create_pool, run_migrations}, DatabaseService, PoolOptions},
    handlers::{build_router, AppState, DialogueOrchestrator, MenuState, ReplyComposer},
    services::{LineClient, ServiceFactory},
    state::{RedisStore, StateStorage},
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", logbook::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&PoolOptions::from(&settings.database)).await?;
    run_migrations(&db_pool).await?;
    let database_service = DatabaseService::new(db_pool);

    // Initialize conversation state storage
    info!("Connecting to Redis...");
    let redis_store = RedisStore::connect(&settings.redis.url).await?;
    let state_storage = StateStorage::from_config(Arc::new(redis_store), &settings.redis);

    // Initialize services
    info!("Initializing services...");
    let line_client = LineClient::new(&settings.line)?;
    let services = ServiceFactory::new(&database_service, line_client);

    let composer = ReplyComposer::from_config(&settings.menu).await;
    if let MenuState::Failed(reason) = composer.menu_state() {
        warn!(reason = %reason, "Flex menu unavailable, replies will be text-only");
    }

    let replies = services.replies.clone();
    let orchestrator = DialogueOrchestrator::new(services, state_storage, Arc::new(composer), &settings.wizard);
    let state = AppState::new(Arc::new(orchestrator), replies, &settings.line.channel_secret);
    let app = build_router(state, &settings.server.webhook_path);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind_address))?;
    info!(
        address = %settings.server.bind_address,
        webhook_path = %settings.server.webhook_path,
        "Logbook bot is ready!"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Logbook bot has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
