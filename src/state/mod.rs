//! State management module
//!
//! The timer store, the task list it signals, the completion log, and the
//! application state that ties them together.

pub mod app_state;
pub mod completion;
pub mod task_list;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TimerSnapshot};
pub use completion::{CompletionEdit, CompletionLog, CompletionRecord};
pub use task_list::{TaskList, TaskQueue};
pub use timer_state::{TimerPhase, TimerState};
