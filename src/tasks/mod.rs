//! Background tasks module
//! 
//! This module contains the countdown controller and the console view that run
//! alongside the HTTP server.

pub mod console_view;
pub mod timer_controller;

// Re-export main types
pub use console_view::console_view_task;
pub use timer_controller::{
    controller_channel, spawn_controller, ControllerHandle, ControllerInbox, TimerController,
    ALARM_NAME,
};
