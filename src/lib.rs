//! Task Timer - A countdown timer for the active task, served over HTTP
//!
//! This library provides the timer state machine, the presenter task that
//! drives it to expiry, an in-memory task list and completion log, and the
//! HTTP API that exposes them.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::AppError;
pub use state::{AppState, TimerState};
pub use tasks::spawn_presenter;
pub use utils::signals::shutdown_signal;
