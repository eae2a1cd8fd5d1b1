//! Timer state structure and persisted record

use serde::{Deserialize, Serialize};

/// Length of one work cycle in seconds
pub const TOTAL_DURATION: u32 = 120;

/// Authoritative countdown state, also the shape of the persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub time_left: u32,
    pub is_running: bool,
    pub completed_cycles: u64,
}

impl TimerState {
    /// Create a fresh, stopped, full-length timer state
    pub fn new() -> Self {
        Self {
            time_left: TOTAL_DURATION,
            is_running: false,
            completed_cycles: 0,
        }
    }

    /// Build a state from a persisted record, falling back to defaults per field
    pub fn from_stored(stored: &StoredState) -> Self {
        let defaults = Self::new();
        Self {
            time_left: stored
                .time_left
                .map(clamp_time_left)
                .unwrap_or(defaults.time_left),
            is_running: stored.is_running.unwrap_or(defaults.is_running),
            completed_cycles: stored.completed_cycles.unwrap_or(defaults.completed_cycles),
        }
    }

    /// Check if this state describes a countdown that can keep ticking
    pub fn is_resumable(&self) -> bool {
        self.is_running && self.time_left > 0
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted record as read back from storage; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredState {
    pub time_left: Option<i64>,
    pub is_running: Option<bool>,
    pub completed_cycles: Option<u64>,
}

impl From<TimerState> for StoredState {
    fn from(state: TimerState) -> Self {
        Self {
            time_left: Some(i64::from(state.time_left)),
            is_running: Some(state.is_running),
            completed_cycles: Some(state.completed_cycles),
        }
    }
}

/// Clamp an untrusted seconds value into `[0, TOTAL_DURATION]`
pub fn clamp_time_left(seconds: i64) -> u32 {
    // Bounded by TOTAL_DURATION, the cast cannot truncate.
    seconds.clamp(0, i64::from(TOTAL_DURATION)) as u32
}
