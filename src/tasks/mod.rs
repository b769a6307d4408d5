//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod presenter;

// Re-export main functions
pub use presenter::{poll_once, presenter_task, spawn_presenter, PresenterHandle, TickOutcome};
