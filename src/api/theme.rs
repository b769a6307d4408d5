//! Visual themes for timer controls

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{TimerPhase, TimerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Accent,
    Caution,
    Danger,
    Dark,
    #[default]
    Default,
    Success,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Accent => "accent",
            Theme::Caution => "caution",
            Theme::Danger => "danger",
            Theme::Dark => "dark",
            Theme::Default => "default",
            Theme::Success => "success",
        }
    }

    /// CSS class list for an element styled with this theme
    pub fn classes(&self, invert: bool) -> String {
        let mut classes = format!("theme theme-{}", self.name());
        if invert {
            classes.push_str(" theme-invert");
        }
        classes
    }

    /// Theme for the timer display given its state at `now`
    pub fn for_timer(timer: &TimerState, now: i64) -> Self {
        match timer.phase() {
            TimerPhase::Running if timer.time_remaining(now) == 0 => Theme::Danger,
            TimerPhase::Running => Theme::Accent,
            TimerPhase::Ready => Theme::Caution,
            TimerPhase::Idle => Theme::Default,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
