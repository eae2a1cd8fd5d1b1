//! User-visible cycle completion notifications

use tokio::process::Command;
use tracing::{info, warn};

/// Title shown when a cycle completes
pub const NOTIFICATION_TITLE: &str = "GTD Timer";
/// Message shown when a cycle completes
pub const NOTIFICATION_MESSAGE: &str = "✅ 2分経過！次のサイクルを開始";

/// Sink for completion notifications; delivery is fire-and-forget
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Writes notifications to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!("{}: {}", title, message);
    }
}

/// Runs an external program as `<program> <title> <message>`, e.g. `notify-send`
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, title: &str, message: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available, dropping notification: {}", title);
            return;
        };

        let program = self.program.clone();
        let args = [title.to_string(), message.to_string()];
        handle.spawn(async move {
            if let Err(e) = run_notify_command(&program, &args).await {
                warn!("{}", e);
            }
        });
    }
}

async fn run_notify_command(program: &str, args: &[String]) -> Result<(), String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", program, stderr));
    }

    info!("Notification delivered via {}", program);
    Ok(())
}
