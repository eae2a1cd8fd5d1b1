//! Shared state for the HTTP surface

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::info;

use super::{Intent, TimerState};
use crate::{
    error::ControllerError,
    services::{load_or_default, Storage},
    tasks::ControllerHandle,
};

/// State handed to every HTTP handler
pub struct AppState {
    /// Entry point to the countdown controller
    pub controller: ControllerHandle,
    /// Persisted record, the source of truth for newly attached views
    pub storage: Arc<dyn Storage>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        controller: ControllerHandle,
        storage: Arc<dyn Storage>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            controller,
            storage,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Forward an intent to the controller and remember it
    pub fn send_intent(&self, intent: Intent) -> Result<(), ControllerError> {
        info!("Forwarding intent: {}", intent.name());
        let name = intent.name();
        self.controller.send(intent)?;
        self.record_action(name);
        Ok(())
    }

    /// Deliver a named alarm to the controller and remember it
    pub fn fire_alarm(&self, name: &str) -> Result<(), ControllerError> {
        info!("Forwarding alarm: {}", name);
        self.controller.fire_alarm(name)?;
        self.record_action(&format!("alarm:{}", name));
        Ok(())
    }

    /// Last persisted timer state
    pub fn snapshot(&self) -> TimerState {
        load_or_default(self.storage.as_ref())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }
}
