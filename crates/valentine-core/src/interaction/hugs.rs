//! Hug Day carousel: four hugs one at a time, then all of them together.

use serde::Serialize;

pub const MESSAGES: [&str; 4] = [
    "Here's a hug for you! 🤗",
    "More hugs! 🤗💚",
    "Even more hugs!! 🤗✨",
    "And more more hugs!!! 🤗💕",
];
/// Step index of the overview showing every hug.
pub const OVERVIEW: usize = MESSAGES.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HugCarousel {
    step: usize,
}

impl HugCarousel {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_overview(&self) -> bool {
        self.step == OVERVIEW
    }

    /// Message for the current single-hug step, `None` on the overview.
    pub fn message(&self) -> Option<&'static str> {
        MESSAGES.get(self.step).copied()
    }

    pub fn can_go_back(&self) -> bool {
        self.step > 0 && !self.is_overview()
    }

    pub fn next(&mut self) {
        self.step = (self.step + 1).min(OVERVIEW);
    }

    pub fn back(&mut self) {
        if self.can_go_back() {
            self.step -= 1;
        }
    }

    /// Start over; only offered on the overview.
    pub fn restart(&mut self) {
        if self.is_overview() {
            self.step = 0;
        }
    }
}

impl Default for HugCarousel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_at_start_is_noop() {
        let mut hugs = HugCarousel::new();
        hugs.back();
        assert_eq!(hugs.step(), 0);
        assert!(!hugs.can_go_back());
    }

    #[test]
    fn test_next_saturates_at_overview() {
        let mut hugs = HugCarousel::new();
        for _ in 0..10 {
            hugs.next();
        }
        assert_eq!(hugs.step(), OVERVIEW);
        assert!(hugs.is_overview());
        assert!(hugs.message().is_none());
    }

    #[test]
    fn test_restart_only_from_overview() {
        let mut hugs = HugCarousel::new();
        hugs.next();
        hugs.next();
        hugs.restart();
        assert_eq!(hugs.step(), 2);

        hugs.back();
        assert_eq!(hugs.step(), 1);
        assert_eq!(hugs.message(), Some(MESSAGES[1]));

        for _ in 0..3 {
            hugs.next();
        }
        hugs.restart();
        assert_eq!(hugs.step(), 0);
    }
}
