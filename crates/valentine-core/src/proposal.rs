//! The proposal screen: an accept button and an evasive "No" button.
//!
//! ```text
//! Idle(0) -> Evading(1..=9) -> Cornered(10) -> Accepted
//!    \____________\_______________\______________^   (yes, from any state)
//! ```

use crate::effect::{Delay, TimerKind};
use crate::layout::{background_hearts, Annulus, FloatingHeart, Point, Viewport};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;

pub const CORNERED_AFTER: u32 = 10;
pub const ACCEPT_HANDOFF_DELAY: Duration = Duration::from_secs(2);

const NO_SCALE_STEP: f32 = 0.1;
const NO_SCALE_FLOOR: f32 = 0.3;
const YES_SCALE_STEP: f32 = 0.2;
const YES_SCALE_CEILING: f32 = 2.5;
const CORNERED_NO_SCALE: f32 = 0.5;
const BACKGROUND_HEARTS: usize = 50;

pub const INITIAL_LABEL: &str = "No";
pub const CORNERED_LABEL: &str = "No option! 😏";

pub const TAUNTS: [&str; 10] = [
    "Are you sure? 🥺",
    "Really? 💔",
    "Please reconsider! 🙏",
    "Don't break my heart! 💘",
    "Give me a chance! 🌹",
    "Pretty please? 🥹",
    "You're breaking my heart! 😢",
    "One more chance? 💕",
    "Think about it! 💭",
    "Last chance! 🙈",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalPhase {
    Idle,
    Evading,
    Cornered,
    Accepted,
}

#[derive(Debug, Clone)]
pub struct ProposalFlow {
    attempts: u32,
    offset: Point,
    no_scale: f32,
    yes_scale: f32,
    label: &'static str,
    accepted: bool,
    hearts: Vec<FloatingHeart>,
}

impl ProposalFlow {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            attempts: 0,
            offset: Point::ORIGIN,
            no_scale: 1.0,
            yes_scale: 1.0,
            label: INITIAL_LABEL,
            accepted: false,
            hearts: background_hearts(rng, BACKGROUND_HEARTS),
        }
    }

    pub fn phase(&self) -> ProposalPhase {
        if self.accepted {
            ProposalPhase::Accepted
        } else if self.attempts >= CORNERED_AFTER {
            ProposalPhase::Cornered
        } else if self.attempts > 0 {
            ProposalPhase::Evading
        } else {
            ProposalPhase::Idle
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn no_scale(&self) -> f32 {
        self.no_scale
    }

    pub fn yes_scale(&self) -> f32 {
        self.yes_scale
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn hearts(&self) -> &[FloatingHeart] {
        &self.hearts
    }

    /// Hover, touch or click on "No". Returns false when nothing changed.
    pub fn flee(&mut self, viewport: Viewport, rng: &mut impl Rng) -> bool {
        match self.phase() {
            ProposalPhase::Accepted | ProposalPhase::Cornered => false,
            ProposalPhase::Idle | ProposalPhase::Evading => {
                self.attempts += 1;
                if self.attempts >= CORNERED_AFTER {
                    self.offset = Point::ORIGIN;
                    self.no_scale = CORNERED_NO_SCALE;
                    self.label = CORNERED_LABEL;
                    tracing::debug!(attempts = self.attempts, "no button cornered");
                } else {
                    self.offset = Annulus::for_viewport(viewport).sample(rng);
                    self.no_scale = (self.no_scale - NO_SCALE_STEP).max(NO_SCALE_FLOOR);
                    self.yes_scale = (self.yes_scale + YES_SCALE_STEP).min(YES_SCALE_CEILING);
                    self.label = TAUNTS.choose(rng).copied().unwrap_or(INITIAL_LABEL);
                }
                true
            }
        }
    }

    /// Click on "Yes". The hand-off delay is requested only once.
    pub fn accept(&mut self) -> Option<Delay> {
        if self.accepted {
            return None;
        }
        self.accepted = true;
        tracing::info!(attempts = self.attempts, "proposal accepted");
        Some(Delay::new(TimerKind::AcceptHandoff, ACCEPT_HANDOFF_DELAY))
    }

    /// Footer line under the buttons.
    pub fn hint(&self) -> String {
        match self.attempts {
            0 => "Hint: The \"No\" button is a bit shy... 😏".to_string(),
            n if n < CORNERED_AFTER => {
                format!("Attempts: {n}/{CORNERED_AFTER} - The \"No\" button is running away! 🏃‍♂️")
            }
            _ => "The \"No\" button has given up! 🎯".to_string(),
        }
    }
}
