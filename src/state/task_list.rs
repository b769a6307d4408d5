//! Task list collaborator
//!
//! The timer only ever asks which task is active and signals a skip; the list
//! itself owns task identity.

use std::collections::VecDeque;

use tracing::{debug, info};

/// Something that tracks the current task and accepts skip signals
pub trait TaskList: Send + std::fmt::Debug {
    /// The task the timer is counting down for, if any
    fn active_task(&self) -> Option<String>;

    /// Advance past the active task, returning the new active task
    fn skip_active_task(&mut self) -> Option<String>;

    fn add_task(&mut self, name: String);

    /// All pending tasks, active one first
    fn tasks(&self) -> Vec<String>;
}

/// In-memory FIFO of task names; the front of the queue is active
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    pending: VecDeque<String>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Into<String>> FromIterator<S> for TaskQueue {
    fn from_iter<I: IntoIterator<Item = S>>(tasks: I) -> Self {
        Self {
            pending: tasks.into_iter().map(Into::into).collect(),
        }
    }
}

impl TaskList for TaskQueue {
    fn active_task(&self) -> Option<String> {
        self.pending.front().cloned()
    }

    fn skip_active_task(&mut self) -> Option<String> {
        match self.pending.pop_front() {
            Some(skipped) => info!("Skipped task: {}", skipped),
            None => debug!("Skip requested with no active task"),
        }
        self.active_task()
    }

    fn add_task(&mut self, name: String) {
        debug!("Queued task: {}", name);
        self.pending.push_back(name);
    }

    fn tasks(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }
}
