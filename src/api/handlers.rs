//! HTTP endpoint handlers
//!
//! The handlers play the part of the timer's controls: each one checks that
//! its control would be enabled before dispatching the transition. The timer
//! transitions themselves accept any state.

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{
    error::{AppError, Result},
    state::{AppState, CompletionEdit, TimerPhase},
    utils::{decompose, duration::coerce_non_negative},
};
use super::responses::{
    ApiResponse, CompletionRequest, CompletionResponse, DurationRequest, HealthResponse,
    StatusResponse, TaskRequest, TasksResponse, TimerResponse,
};

fn timer_response(state: &AppState) -> Result<TimerResponse> {
    Ok(TimerResponse::new(state.snapshot()?, state.active_task()?))
}

fn conflict(message: &str) -> AppError {
    warn!("Rejected timer control: {}", message);
    AppError::Conflict(message.to_string())
}

fn require_active_task(state: &AppState) -> Result<()> {
    match state.active_task()? {
        Some(_) => Ok(()),
        None => Err(conflict("No active task")),
    }
}

fn start_timer(state: &AppState) -> Result<Json<ApiResponse>> {
    let timer = state.get_timer_state()?;
    match timer.phase() {
        TimerPhase::Running => return Err(conflict("Timer is already running")),
        TimerPhase::Idle => return Err(conflict("Set a duration before starting")),
        TimerPhase::Ready => {}
    }

    state.start()?;
    info!("Start endpoint called - timer running");
    Ok(Json(ApiResponse::running(
        "Timer started".to_string(),
        timer_response(state)?,
    )))
}

fn pause_timer(state: &AppState) -> Result<Json<ApiResponse>> {
    if !state.get_timer_state()?.is_running() {
        return Err(conflict("Timer is not running"));
    }
    require_active_task(state)?;

    state.pause()?;
    info!("Pause endpoint called - timer paused");
    Ok(Json(ApiResponse::paused(
        "Timer paused".to_string(),
        timer_response(state)?,
    )))
}

/// Handle GET /timer - Current timer state and remaining time
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>> {
    Ok(Json(timer_response(&state)?))
}

/// Handle POST /timer/start - Begin the countdown from the configured duration
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>> {
    start_timer(&state)
}

/// Handle POST /timer/pause - Freeze the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>> {
    pause_timer(&state)
}

/// Handle POST /timer/resume - Continue a paused countdown
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>> {
    match state.get_timer_state()?.phase() {
        TimerPhase::Running => return Err(conflict("Timer is already running")),
        TimerPhase::Idle => return Err(conflict("No time left to resume")),
        TimerPhase::Ready => {}
    }
    require_active_task(&state)?;

    state.resume()?;
    info!("Resume endpoint called - timer running");
    Ok(Json(ApiResponse::running(
        "Timer resumed".to_string(),
        timer_response(&state)?,
    )))
}

/// Handle POST /timer/toggle - Start when paused, pause when running
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>> {
    if state.get_timer_state()?.paused {
        start_timer(&state)
    } else {
        pause_timer(&state)
    }
}

/// Handle POST /timer/stop - Abandon the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>> {
    if !state.get_timer_state()?.is_started() {
        return Err(conflict("Timer is not started"));
    }

    state.stop()?;
    info!("Stop endpoint called - timer reset");
    Ok(Json(ApiResponse::paused(
        "Timer stopped".to_string(),
        timer_response(&state)?,
    )))
}

/// Handle PUT /timer/duration - Edit the hours, minutes and seconds fields
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> Result<Json<ApiResponse>> {
    let timer = state.get_timer_state()?;
    if timer.is_running() {
        return Err(conflict("Duration cannot change while the timer is running"));
    }

    let mut components = decompose(timer.duration);
    if let Some(hours) = &request.hours {
        components = components.with_hours(coerce_non_negative(hours));
    }
    if let Some(minutes) = &request.minutes {
        components = components.with_minutes(coerce_non_negative(minutes));
    }
    if let Some(seconds) = &request.seconds {
        components = components.with_seconds(coerce_non_negative(seconds));
    }

    let requested = components.total_seconds();
    let timer = state.set_duration(requested)?;
    if timer.is_running() || timer.duration != requested {
        return Err(conflict("Duration cannot change while the timer is running"));
    }
    let duration = timer.duration;
    info!("Duration endpoint called - duration set to {}", decompose(duration));
    Ok(Json(ApiResponse::paused(
        format!("Duration set to {}", decompose(duration)),
        timer_response(&state)?,
    )))
}

/// Handle GET /tasks - Pending tasks, active one first
pub async fn tasks_handler(State(state): State<Arc<AppState>>) -> Result<Json<TasksResponse>> {
    Ok(Json(state.tasks()?.into()))
}

/// Handle POST /tasks - Queue a task
pub async fn add_task_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TaskRequest>,
) -> Result<(StatusCode, Json<TasksResponse>)> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("task name is empty".to_string()));
    }
    let tasks = state.add_task(name.to_string())?;
    Ok((StatusCode::CREATED, Json(tasks.into())))
}

/// Handle POST /tasks/skip - Move on to the next task while the timer is started
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<TasksResponse>> {
    if !state.get_timer_state()?.is_started() {
        return Err(conflict("Timer is not started"));
    }
    require_active_task(&state)?;
    state.skip_active_task()?;
    Ok(Json(state.tasks()?.into()))
}

fn completion_edit(request: &CompletionRequest) -> Result<CompletionEdit> {
    let minutes = request.duration_minutes.as_ref().map(coerce_non_negative);
    CompletionEdit::parse(&request.date, minutes)
}

/// Handle GET /completions - Logged intervals
pub async fn completions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CompletionResponse>>> {
    let completions = state
        .completions()?
        .into_iter()
        .map(|(id, record)| CompletionResponse::new(id, record))
        .collect();
    Ok(Json(completions))
}

/// Handle POST /completions - Log an interval
pub async fn add_completion_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CompletionRequest>,
) -> Result<(StatusCode, Json<CompletionResponse>)> {
    let record = completion_edit(&request)?.to_record();
    let id = state.add_completion(record)?;
    Ok((StatusCode::CREATED, Json(CompletionResponse::new(id, record))))
}

/// Handle PUT /completions/:id - Save an edited interval
pub async fn update_completion_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>> {
    let record = state.update_completion(id, completion_edit(&request)?)?;
    Ok(Json(CompletionResponse::new(id, record)))
}

/// Handle DELETE /completions/:id - Remove an interval
pub async fn delete_completion_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    state.delete_completion(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle GET /status - Timer, tasks and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>> {
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: timer_response(&state)?,
        tasks: state.tasks()?,
        completions: state.completions()?.len(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
