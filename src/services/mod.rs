//! External service module
//! 
//! This module contains the persisted state store and the desktop
//! notification sinks.

pub mod notifications;
pub mod storage;

// Re-export main types
pub use notifications::*;
pub use storage::*;
