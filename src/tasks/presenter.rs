//! Timer presenter background task
//!
//! Polls the timer on a fixed tick, publishes the time remaining while the
//! countdown runs and pauses the timer once it reaches zero.

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::{JoinError, JoinHandle},
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::{
    error::Result,
    state::{AppState, TimerSnapshot},
};

/// What a single poll observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not counting down; nothing to do
    Inactive,
    /// Counting down with this many seconds left
    Running { remaining: u64 },
    /// The countdown hit zero and the timer was paused
    Expired,
}

/// Run one presenter tick against the current state
pub fn poll_once(state: &AppState) -> Result<TickOutcome> {
    let timer = state.get_timer_state()?;
    let now = state.now();

    match (timer.paused, timer.start_time, timer.deadline()) {
        (false, Some(start), Some(deadline)) if now > start => {
            if now < deadline {
                let snapshot = TimerSnapshot::new(timer, now);
                let remaining = snapshot.time_remaining;
                state.publish(snapshot);
                Ok(TickOutcome::Running { remaining })
            } else if state.pause_if_expired()? {
                info!("Countdown reached zero, timer paused");
                Ok(TickOutcome::Expired)
            } else {
                // changed since it was read; the next tick sees the new state
                Ok(TickOutcome::Inactive)
            }
        }
        _ => Ok(TickOutcome::Inactive),
    }
}

/// Poll the timer every `period` until `shutdown` fires or its sender is
/// dropped, then stop the timer so no countdown outlives the presenter
pub async fn presenter_task(
    state: Arc<AppState>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Starting timer presenter task ({:?} tick)", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match poll_once(&state) {
                    Ok(TickOutcome::Running { remaining }) => {
                        debug!("Timer tick: {}s remaining", remaining);
                    }
                    Ok(_) => {}
                    Err(e) => error!("Timer tick failed: {}", e),
                }
            }
            _ = shutdown.changed() => {
                debug!("Presenter shutdown requested");
                break;
            }
        }
    }

    if let Err(e) = state.stop() {
        error!("Failed to stop timer on presenter shutdown: {}", e);
    }
    info!("Timer presenter task stopped");
}

/// Owner of a running presenter. Dropping it also shuts the presenter down.
#[derive(Debug)]
pub struct PresenterHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl PresenterHandle {
    /// Signal the presenter to stop and wait for it to finish
    pub async fn shutdown(self) -> std::result::Result<(), JoinError> {
        self.shutdown_tx.send_replace(true);
        self.join.await
    }
}

/// Spawn the presenter on the current tokio runtime
pub fn spawn_presenter(state: Arc<AppState>, period: Duration) -> PresenterHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let join = tokio::spawn(presenter_task(state, period, shutdown_rx));
    PresenterHandle { shutdown_tx, join }
}
