//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    error::{AppError, Result},
    utils::{duration::decompose, Clock},
};
use super::{CompletionEdit, CompletionLog, CompletionRecord, TaskList, TimerState};

/// Timer state as observed at a given instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub timer: TimerState,
    pub now: i64,
    pub time_remaining: u64,
}

impl TimerSnapshot {
    pub fn new(timer: TimerState, now: i64) -> Self {
        let time_remaining = timer.time_remaining(now);
        Self { timer, now, time_remaining }
    }
}

/// Application state shared by the HTTP handlers and the presenter task
#[derive(Debug)]
pub struct AppState {
    /// The countdown; only changed through the transition methods below
    timer_state: Mutex<TimerState>,
    clock: Arc<dyn Clock>,
    task_list: Mutex<Box<dyn TaskList>>,
    completions: Mutex<CompletionLog>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
    /// Channel for timer updates
    timer_update_tx: watch::Sender<TimerSnapshot>,
}

impl AppState {
    /// Create a new AppState with an idle timer
    pub fn new(
        port: u16,
        host: String,
        clock: Arc<dyn Clock>,
        task_list: Box<dyn TaskList>,
    ) -> Self {
        let (timer_update_tx, _) =
            watch::channel(TimerSnapshot::new(TimerState::new(), clock.now()));

        Self {
            timer_state: Mutex::new(TimerState::new()),
            clock,
            task_list: Mutex::new(task_list),
            completions: Mutex::new(CompletionLog::new()),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            timer_update_tx,
        }
    }

    /// Current wall-clock time in Unix seconds
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, TimerState>> {
        self.timer_state
            .lock()
            .map_err(|_| AppError::LockPoisoned("timer"))
    }

    fn lock_tasks(&self) -> Result<MutexGuard<'_, Box<dyn TaskList>>> {
        self.task_list
            .lock()
            .map_err(|_| AppError::LockPoisoned("task list"))
    }

    fn lock_completions(&self) -> Result<MutexGuard<'_, CompletionLog>> {
        self.completions
            .lock()
            .map_err(|_| AppError::LockPoisoned("completions"))
    }

    fn transition<F>(&self, action: &str, apply: F) -> Result<TimerState>
    where
        F: FnOnce(&mut TimerState, i64) -> bool,
    {
        self.apply_transition(action, apply).map(|(state, _)| state)
    }

    /// Apply a timer transition under the lock and notify watchers if it
    /// changed anything
    fn apply_transition<F>(&self, action: &str, apply: F) -> Result<(TimerState, bool)>
    where
        F: FnOnce(&mut TimerState, i64) -> bool,
    {
        let now = self.now();
        let mut timer = self.lock_timer()?;
        let changed = apply(&mut *timer, now);
        let new_state = timer.clone();
        drop(timer); // Release the lock early

        if changed {
            info!(
                "Timer {}: {:?} with {} remaining",
                action,
                new_state.phase(),
                decompose(new_state.time_remaining(now))
            );
            self.record_action(action);
            self.publish(TimerSnapshot::new(new_state.clone(), now));
        } else {
            debug!("Timer {} ignored in phase {:?}", action, new_state.phase());
        }

        Ok((new_state, changed))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
    }

    /// Send a snapshot to every timer watcher
    pub fn publish(&self, snapshot: TimerSnapshot) {
        // send_replace never fails, even with no receivers
        self.timer_update_tx.send_replace(snapshot);
    }

    /// Subscribe to timer snapshots
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    /// Overwrite the countdown budget (ignored while running)
    pub fn set_duration(&self, seconds: u64) -> Result<TimerState> {
        self.transition("set-duration", |timer, _| timer.set_duration(seconds))
    }

    pub fn start(&self) -> Result<TimerState> {
        self.transition("start", |timer, now| timer.start(now))
    }

    pub fn pause(&self) -> Result<TimerState> {
        self.transition("pause", |timer, now| timer.pause(now))
    }

    /// Pause the countdown if it has run out, checked against the state held
    /// under the lock. Returns whether the timer was paused.
    pub fn pause_if_expired(&self) -> Result<bool> {
        self.apply_transition("expire", |timer, now| timer.pause_if_expired(now))
            .map(|(_, expired)| expired)
    }

    pub fn resume(&self) -> Result<TimerState> {
        self.transition("resume", |timer, now| timer.resume(now))
    }

    pub fn stop(&self) -> Result<TimerState> {
        self.transition("stop", |timer, _| timer.stop())
    }

    /// Tell the task list to move on. The timer itself is left alone.
    pub fn skip_active_task(&self) -> Result<Option<String>> {
        let next = self.lock_tasks()?.skip_active_task();
        self.record_action("skip");
        info!("Active task is now {:?}", next);
        Ok(next)
    }

    pub fn active_task(&self) -> Result<Option<String>> {
        Ok(self.lock_tasks()?.active_task())
    }

    pub fn tasks(&self) -> Result<Vec<String>> {
        Ok(self.lock_tasks()?.tasks())
    }

    pub fn add_task(&self, name: String) -> Result<Vec<String>> {
        let mut tasks = self.lock_tasks()?;
        tasks.add_task(name);
        Ok(tasks.tasks())
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState> {
        self.lock_timer().map(|state| state.clone())
    }

    /// Current timer state with remaining time derived at `now`
    pub fn snapshot(&self) -> Result<TimerSnapshot> {
        let now = self.now();
        Ok(TimerSnapshot::new(self.get_timer_state()?, now))
    }

    pub fn completions(&self) -> Result<Vec<(u64, CompletionRecord)>> {
        Ok(self.lock_completions()?.list())
    }

    pub fn add_completion(&self, record: CompletionRecord) -> Result<u64> {
        let id = self.lock_completions()?.insert(record);
        info!("Logged completion {}: {}s at {}", id, record.duration, record.time);
        Ok(id)
    }

    /// Save an edit over an existing completion
    pub fn update_completion(&self, id: u64, edit: CompletionEdit) -> Result<CompletionRecord> {
        let mut log = self.lock_completions()?;
        let record = edit.apply_to(&log.get(id)?);
        let record = log.update(id, record)?;
        drop(log);

        info!("Updated completion {}", id);
        Ok(record)
    }

    pub fn delete_completion(&self, id: u64) -> Result<CompletionRecord> {
        let record = self.lock_completions()?.remove(id)?;
        info!("Deleted completion {}", id);
        Ok(record)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        decompose(self.start_time.elapsed().as_secs()).to_string()
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, time)) => (Some(action), Some(time)),
            None => (None, None),
        }
    }
}
