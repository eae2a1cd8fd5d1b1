//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{state::TimerState, view::Display};

/// Response to a forwarded intent or alarm
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Last persisted state; it may not yet reflect the forwarded request
    pub state: TimerState,
}

impl ApiResponse {
    pub fn new(status: String, message: String, state: TimerState) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            state,
        }
    }

    /// Create an accepted response
    pub fn accepted(message: String, state: TimerState) -> Self {
        Self::new("accepted".to_string(), message, state)
    }
}

/// Status response with the rendered display
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub state: TimerState,
    pub total_duration: u32,
    pub display: Display,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
