//! Study Timer - A state-managed WORK/BREAK study timer service
//!
//! This is the main entry point for the study-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use study_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    services::HttpStudyBackend,
    tasks::ticker_task,
    utils::{shutdown_channel, shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("study_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting study-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, backend={}",
          config.host, config.port, config.backend_url);

    let backend = HttpStudyBackend::new(&config.backend_url, config.token.clone(), config.request_timeout())?;
    let store = config.settings_store();
    info!("Timer settings file: {}", store.path().display());

    // Create application state
    let state = Arc::new(AppState::new(Arc::new(backend), store, Arc::new(SystemClock)));

    // Backend defaults load in the background; local settings take precedence
    let settings_state = Arc::clone(&state);
    tokio::spawn(async move {
        settings_state.load_settings().await;
    });

    // Start the one-second ticker
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let ticker = tokio::spawn(ticker_task(Arc::clone(&state), shutdown_rx));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer             - Current timer");
    info!("  POST /timer/toggle      - Start or pause");
    info!("  POST /timer/reset       - Reset to a full focus phase");
    info!("  POST /timer/study-type  - Set deep or practice");
    info!("  PUT  /timer/durations   - Set focus/break minutes");
    info!("  POST /timer/preset      - Apply a named preset");
    info!("  POST /session/start     - Start a study session");
    info!("  POST /session/end       - End the study session");
    info!("  GET  /sessions          - Finished sessions");
    info!("  GET  /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = ticker.await {
        tracing::warn!("Ticker task ended abnormally: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
