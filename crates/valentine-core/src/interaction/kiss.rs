//! Kiss Day toggle.

use crate::effect::{Delay, TimerKind};
use serde::Serialize;
use std::time::Duration;

pub const REVERT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KissToggle {
    active: bool,
    count: u32,
}

impl KissToggle {
    pub fn new() -> Self {
        Self {
            active: false,
            count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// The activation control is hidden while active, so re-activating is
    /// ignored.
    pub fn activate(&mut self) -> Option<Delay> {
        if self.active {
            return None;
        }
        self.active = true;
        self.count += 1;
        Some(Delay::new(TimerKind::KissRevert, REVERT_DELAY))
    }

    pub fn revert(&mut self) {
        self.active = false;
    }
}

impl Default for KissToggle {
    fn default() -> Self {
        Self::new()
    }
}
