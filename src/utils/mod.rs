//! Utility functions module
//!
//! Time sources, duration arithmetic and signal handling used throughout the
//! application.

pub mod clock;
pub mod duration;
pub mod signals;

// Re-export main functions
pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{decompose, sum_time_components, TimeComponents};
pub use signals::shutdown_signal;
