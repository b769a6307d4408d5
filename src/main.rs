//! Task Timer - A countdown timer for the active task, served over HTTP
//!
//! This is the main entry point for the task-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use task_timer::{
    api::create_router,
    config::Config,
    state::{AppState, TaskQueue},
    tasks::spawn_presenter,
    utils::{shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("task_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting task-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, tasks={:?}",
          config.host, config.port, config.tick_ms, config.tasks);

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        Arc::new(SystemClock),
        Box::new(TaskQueue::from_iter(config.tasks.iter().cloned())),
    ));

    // Start the timer presenter; it stops the timer when shut down
    let presenter = spawn_presenter(Arc::clone(&state), config.tick());

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer            - Timer state and time remaining");
    info!("  POST /timer/start      - Start the countdown");
    info!("  POST /timer/pause      - Pause the countdown");
    info!("  POST /timer/resume     - Resume a paused countdown");
    info!("  POST /timer/toggle     - Start or pause");
    info!("  POST /timer/stop       - Reset the timer");
    info!("  PUT  /timer/duration   - Set hours/minutes/seconds");
    info!("  GET  /tasks            - List tasks (POST to add)");
    info!("  POST /tasks/skip       - Skip the active task");
    info!("  GET  /completions      - List completions (POST to add)");
    info!("  PUT  /completions/:id  - Edit a completion (DELETE to remove)");
    info!("  GET  /status           - Timer, tasks and server metadata");
    info!("  GET  /health           - Health check");

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received, stopping presenter");
    if let Err(e) = presenter.shutdown().await {
        tracing::error!("Presenter task failed: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
