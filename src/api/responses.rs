//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::AppError,
    state::{CompletionRecord, TimerPhase, TimerSnapshot},
    utils::{decompose, TimeComponents},
};
use super::theme::Theme;

/// Timer state with everything a display needs derived from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub duration: u64,
    pub paused: bool,
    pub started: bool,
    pub start_time: Option<i64>,
    pub now: i64,
    pub time_remaining: u64,
    pub remaining: TimeComponents,
    pub display: String,
    pub phase: TimerPhase,
    pub theme: Theme,
    pub theme_classes: String,
    pub active_task: Option<String>,
}

impl TimerResponse {
    pub fn new(snapshot: TimerSnapshot, active_task: Option<String>) -> Self {
        let TimerSnapshot { timer, now, time_remaining } = snapshot;
        let remaining = decompose(time_remaining);
        let theme = Theme::for_timer(&timer, now);

        Self {
            duration: timer.duration,
            paused: timer.paused,
            started: timer.is_started(),
            start_time: timer.start_time,
            now,
            time_remaining,
            remaining,
            display: remaining.to_string(),
            phase: timer.phase(),
            theme,
            theme_classes: theme.classes(false),
            active_task,
        }
    }
}

/// Response for timer control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerResponse,
}

impl ApiResponse {
    pub fn new(status: String, message: String, timer: TimerResponse) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    pub fn running(message: String, timer: TimerResponse) -> Self {
        Self::new("running".to_string(), message, timer)
    }

    pub fn paused(message: String, timer: TimerResponse) -> Self {
        Self::new("paused".to_string(), message, timer)
    }
}

/// Overall status with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerResponse,
    pub tasks: Vec<String>,
    pub completions: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksResponse {
    pub active_task: Option<String>,
    pub tasks: Vec<String>,
}

impl From<Vec<String>> for TasksResponse {
    fn from(tasks: Vec<String>) -> Self {
        Self {
            active_task: tasks.first().cloned(),
            tasks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: u64,
    pub time: i64,
    pub duration: u64,
    pub date: NaiveDate,
    pub duration_minutes: Option<u64>,
}

impl CompletionResponse {
    pub fn new(id: u64, record: CompletionRecord) -> Self {
        Self {
            id,
            time: record.time,
            duration: record.duration,
            date: record.date(),
            duration_minutes: record.duration_minutes(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match &self {
            AppError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::CompletionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        };
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
        };
        (code, Json(body)).into_response()
    }
}

/// Duration form fields. Each one is optional and loosely typed: numbers and
/// numeric strings are accepted, anything else counts as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationRequest {
    pub hours: Option<Value>,
    pub minutes: Option<Value>,
    pub seconds: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// `YYYY-MM-DD`
    pub date: String,
    pub duration_minutes: Option<Value>,
}
