//! GTD Timer - a two-minute work-cycle countdown
//! 
//! This library provides a long-lived countdown controller, transient views
//! that mirror it, and a local HTTP surface for views in other processes.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;
pub mod view;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, TimerState};
pub use tasks::{ControllerHandle, TimerController};
pub use utils::signals::{shutdown_signal, shutdown_signals};
pub use view::TimerView;
