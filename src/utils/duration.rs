//! Duration decomposition helpers
//!
//! Converts a count of seconds to and from its `{hours, minutes, seconds}`
//! components, and coerces loosely typed form input into whole numbers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A duration split into whole hours, minutes and residual seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeComponents {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeComponents {
    /// Replace the hours, keeping minutes and dropping seconds
    pub fn with_hours(self, hours: u64) -> Self {
        Self { hours, minutes: self.minutes, seconds: 0 }
    }

    /// Replace the minutes, keeping hours and dropping seconds
    pub fn with_minutes(self, minutes: u64) -> Self {
        Self { hours: self.hours, minutes, seconds: 0 }
    }

    /// Replace the seconds, keeping hours and minutes
    pub fn with_seconds(self, seconds: u64) -> Self {
        Self { seconds, ..self }
    }

    /// Total number of seconds these components represent
    pub fn total_seconds(&self) -> u64 {
        sum_time_components(*self)
    }
}

impl fmt::Display for TimeComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
        } else if self.minutes > 0 {
            write!(f, "{}m {}s", self.minutes, self.seconds)
        } else {
            write!(f, "{}s", self.seconds)
        }
    }
}

pub fn whole_hours(total: u64) -> u64 {
    total / 3600
}

pub fn whole_minutes(total: u64) -> u64 {
    (total % 3600) / 60
}

pub fn residual_seconds(total: u64) -> u64 {
    total % 60
}

/// Split a number of seconds into hours, minutes and seconds
pub fn decompose(total: u64) -> TimeComponents {
    TimeComponents {
        hours: whole_hours(total),
        minutes: whole_minutes(total),
        seconds: residual_seconds(total),
    }
}

/// Inverse of [`decompose`]
pub fn sum_time_components(components: TimeComponents) -> u64 {
    components
        .hours
        .saturating_mul(3600)
        .saturating_add(components.minutes.saturating_mul(60))
        .saturating_add(components.seconds)
}

/// Coerce a text field into a non-negative whole number.
///
/// Anything that does not parse as a finite, positive number becomes 0;
/// fractional values are floored.
pub fn coerce_str(input: &str) -> u64 {
    match input.trim().parse::<f64>() {
        Ok(n) => coerce_f64(n),
        Err(_) => 0,
    }
}

/// Coerce a JSON value (number, numeric string, or anything else) the same
/// way as [`coerce_str`]
pub fn coerce_non_negative(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| n.as_f64().map(coerce_f64).unwrap_or(0)),
        Value::String(s) => coerce_str(s),
        Value::Bool(true) => 1,
        _ => 0,
    }
}

fn coerce_f64(n: f64) -> u64 {
    if n.is_finite() && n > 0.0 {
        // saturating float-to-int cast
        n.floor() as u64
    } else {
        0
    }
}
