//! GTD Timer - a two-minute work-cycle countdown
//!
//! This is the main entry point for the gtd-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use gtd_timer::{
    api::create_router,
    config::Config,
    services::{
        CommandNotifier, JsonFileStorage, LogNotifier, Notifier, Storage, WriteBehindStorage,
    },
    state::AppState,
    tasks::{console_view_task, spawn_controller},
    utils::{shutdown_signal, shutdown_signals},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr, the console view owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("gtd_timer={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting gtd-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, state_file={}",
          config.host, config.port, config.state_file.display());

    let storage: Arc<dyn Storage> = Arc::new(WriteBehindStorage::spawn(Arc::new(
        JsonFileStorage::new(&config.state_file),
    )));
    let notifier: Arc<dyn Notifier> = match &config.notify_command {
        Some(program) => {
            info!("Completion notifications via {}", program);
            Arc::new(CommandNotifier::new(program.clone()))
        }
        None => Arc::new(LogNotifier),
    };

    // Start the countdown controller; it outlives any attached view
    let controller = spawn_controller(Arc::clone(&storage), notifier);

    if !config.headless {
        let view_controller = controller.clone();
        let view_storage = Arc::clone(&storage);
        tokio::spawn(async move {
            console_view_task(view_controller, view_storage).await;
        });
    }

    let state = Arc::new(AppState::new(
        controller,
        storage,
        config.port,
        config.host.clone(),
    ));
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /message      - Send an intent (startTimer, stopTimer, resetTimer)");
    info!("  POST /alarms/:name - Fire a named alarm");
    info!("  GET  /status       - Persisted timer state and display");
    info!("  GET  /events       - Server-sent controller events");
    info!("  GET  /health       - Health check");

    let signals = shutdown_signals()?;
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal(signals) => {
            info!("Shutdown signal received");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
