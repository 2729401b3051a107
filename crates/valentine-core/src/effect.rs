//! Side effects requested by the state machines.
//!
//! The machines never sleep or touch devices themselves: they return effects
//! and the runtime feeds fired timers back in as events.

use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Hand-off from the accepted proposal to the checkpoint map.
    AcceptHandoff,
    /// Hide the quiz retry hint shown by wrong answer number `seq`.
    QuizHint { seq: u64 },
    /// Start expanding the chocolate field from its origin.
    ChocolateExpand,
    /// Show the chocolate completion panel.
    ChocolateReveal,
    /// Revert the kiss toggle.
    KissRevert,
}

/// A delay requested by a single state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    pub kind: TimerKind,
    pub after: Duration,
}

impl Delay {
    pub fn new(kind: TimerKind, after: Duration) -> Self {
        Self { kind, after }
    }
}

/// A scheduled timer, stamped with the modal generation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Timer {
    pub kind: TimerKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Schedule { timer: Timer, after: Duration },
    StartCamera,
    StopCamera,
}
