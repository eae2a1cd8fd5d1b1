//! Signal handling for graceful shutdown

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::info;

/// Register for the signals that stop the timer (SIGTERM, SIGINT)
pub fn shutdown_signals() -> std::io::Result<Signals> {
    Signals::new([SIGTERM, SIGINT])
}

/// Wait until one of the registered signals arrives
pub async fn shutdown_signal(mut signals: Signals) {
    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
}
