//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "gtd-timer")]
#[command(about = "A two-minute GTD work-cycle timer")]
#[command(version)]
pub struct Config {
    /// Port to bind the local API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File holding the persisted timer state
    #[arg(long, default_value = "gtd-timer-state.json")]
    pub state_file: PathBuf,

    /// Program run as `<cmd> <title> <message>` when a cycle completes (e.g. notify-send)
    #[arg(long)]
    pub notify_command: Option<String>,

    /// Run without attaching the console view
    #[arg(long)]
    pub headless: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_locally() {
        let config = Config::try_parse_from(["gtd-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.state_file, PathBuf::from("gtd-timer-state.json"));
        assert!(config.notify_command.is_none());
        assert!(!config.headless);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "gtd-timer",
            "-p",
            "9000",
            "--state-file",
            "/tmp/t.json",
            "--notify-command",
            "notify-send",
            "--headless",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.state_file, PathBuf::from("/tmp/t.json"));
        assert_eq!(config.notify_command.as_deref(), Some("notify-send"));
        assert!(config.headless);
        assert_eq!(config.log_level(), "debug");
    }
}
