//! Propose Day quiz: three options, one correct.

use crate::effect::{Delay, TimerKind};
use serde::Serialize;
use std::time::Duration;

pub const QUESTION: &str = "Where was the first time I proposed to you with a rose? 🌹";
pub const OPTIONS: [&str; 3] = ["Powai", "Classroom", "Bedroom"];
pub const CORRECT: &str = "Classroom";
pub const RETRY_HINT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quiz {
    selected: Option<&'static str>,
    correct: bool,
    show_retry_hint: bool,
    /// Bumped on every wrong answer so only the latest hint timer clears it.
    hint_seq: u64,
}

impl Quiz {
    pub fn new() -> Self {
        Self {
            selected: None,
            correct: false,
            show_retry_hint: false,
            hint_seq: 0,
        }
    }

    pub fn selected(&self) -> Option<&'static str> {
        self.selected
    }

    pub fn is_correct(&self) -> bool {
        self.correct
    }

    pub fn show_retry_hint(&self) -> bool {
        self.show_retry_hint
    }

    /// Submit an answer. Unknown options and answers after the correct one
    /// are ignored.
    pub fn submit(&mut self, answer: &str) -> Option<Delay> {
        if self.correct {
            return None;
        }
        let option = OPTIONS.iter().copied().find(|o| o.eq_ignore_ascii_case(answer.trim()))?;
        self.selected = Some(option);

        if option == CORRECT {
            self.correct = true;
            self.show_retry_hint = false;
            None
        } else {
            self.show_retry_hint = true;
            self.hint_seq += 1;
            Some(Delay::new(
                TimerKind::QuizHint { seq: self.hint_seq },
                RETRY_HINT_DELAY,
            ))
        }
    }

    /// The hint timer for wrong answer `seq` fired.
    pub fn hint_expired(&mut self, seq: u64) {
        if seq == self.hint_seq {
            self.show_retry_hint = false;
        }
    }
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new()
    }
}
