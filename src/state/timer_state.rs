//! Timer state structure and its transitions
//!
//! The countdown is described by three fields. While paused, `duration` holds
//! the seconds left; while running, it holds the budget at `start_time` and the
//! time remaining is derived from the wall clock. The transitions below are the
//! only mutators and none of them can fail: a transition that makes no sense in
//! the current phase leaves the state untouched and reports `false`.

use serde::{Deserialize, Serialize};

/// Coarse phase derived from the timer fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Paused with nothing left on the clock
    Idle,
    /// Paused with time left, either freshly configured or paused mid-run
    Ready,
    /// Counting down
    Running,
}

/// Countdown state for the active task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub duration: u64,
    pub paused: bool,
    pub start_time: Option<i64>,
}

impl TimerState {
    /// Create an idle timer
    pub fn new() -> Self {
        Self {
            duration: 0,
            paused: true,
            start_time: None,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.paused
    }

    /// Whether a countdown has been started and not yet paused or stopped
    pub fn is_started(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn phase(&self) -> TimerPhase {
        if self.is_running() {
            TimerPhase::Running
        } else if self.duration > 0 {
            TimerPhase::Ready
        } else {
            TimerPhase::Idle
        }
    }

    /// Seconds since the countdown (re)started; never negative
    pub fn elapsed(&self, now: i64) -> u64 {
        match self.start_time {
            Some(start) if now > start => (now - start) as u64,
            _ => 0,
        }
    }

    /// Seconds left on the clock at `now`
    pub fn time_remaining(&self, now: i64) -> u64 {
        if self.paused {
            self.duration
        } else {
            self.duration.saturating_sub(self.elapsed(now))
        }
    }

    /// Unix time at which a running countdown reaches zero
    pub fn deadline(&self) -> Option<i64> {
        self.start_time
            .map(|start| start.saturating_add(i64::try_from(self.duration).unwrap_or(i64::MAX)))
    }

    /// Overwrite the budget. Ignored while running.
    pub fn set_duration(&mut self, seconds: u64) -> bool {
        if self.is_running() {
            return false;
        }
        self.duration = seconds;
        true
    }

    /// Begin counting down from the configured duration. Ignored while running.
    pub fn start(&mut self, now: i64) -> bool {
        self.run_from(now)
    }

    /// Freeze the countdown, keeping what is left of it.
    ///
    /// Time elapsed past the deadline is not carried over: the duration
    /// bottoms out at zero.
    pub fn pause(&mut self, now: i64) -> bool {
        if self.paused {
            return false;
        }
        self.duration = self.time_remaining(now);
        self.paused = true;
        self.start_time = None;
        true
    }

    /// Pause only when the countdown has run out at `now`
    pub fn pause_if_expired(&mut self, now: i64) -> bool {
        match (self.start_time, self.deadline()) {
            (Some(start), Some(deadline)) if !self.paused && now > start && now >= deadline => {
                self.pause(now)
            }
            _ => false,
        }
    }

    /// Continue a paused countdown. Ignored while running, so the current
    /// start time is kept.
    pub fn resume(&mut self, now: i64) -> bool {
        self.run_from(now)
    }

    /// Return to the idle state, discarding any remaining time
    pub fn stop(&mut self) -> bool {
        let changed = *self != Self::new();
        *self = Self::new();
        changed
    }

    fn run_from(&mut self, now: i64) -> bool {
        if self.is_running() {
            return false;
        }
        self.paused = false;
        self.start_time = Some(now);
        true
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}
