//! View module
//! 
//! Display model and the transient view that mirrors the controller.

pub mod render;
pub mod timer_view;

pub use render::{Display, Progress};
pub use timer_view::{Surface, TimerView};
