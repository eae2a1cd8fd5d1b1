//! State management module
//! 
//! This module contains all state-related structures and their management logic.

pub mod app_state;
pub mod messages;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use messages::{Event, Intent};
pub use timer_state::{clamp_time_left, StoredState, TimerState, TOTAL_DURATION};
