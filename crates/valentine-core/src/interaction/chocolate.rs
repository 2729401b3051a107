//! Chocolate Day doubling game.
//!
//! Three clicks grow the row of chocolates; the third spreads a field of
//! chocolates over the whole viewport and then shows a completion panel.

use crate::effect::{Delay, TimerKind};
use crate::layout::{chocolate_field, ChocolatePiece, Point, Viewport};
use rand::Rng;
use serde::Serialize;
use std::time::Duration;

pub const MAX_CLICKS: u8 = 3;
/// One animation frame between mounting the field and expanding it.
pub const EXPAND_DELAY: Duration = Duration::from_millis(16);
pub const REVEAL_DELAY: Duration = Duration::from_millis(1750);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPhase {
    Idle,
    /// Field mounted at its origin; `expanded` once the growth has begun.
    Spreading { expanded: bool },
    Revealed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChocolateGame {
    count: u32,
    clicks: u8,
    phase: RevealPhase,
    origin: Point,
    field: Vec<ChocolatePiece>,
}

impl ChocolateGame {
    pub fn new() -> Self {
        Self {
            count: 1,
            clicks: 0,
            phase: RevealPhase::Idle,
            origin: Point::ORIGIN,
            field: Vec::new(),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn clicks(&self) -> u8 {
        self.clicks
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn field(&self) -> &[ChocolatePiece] {
        &self.field
    }

    pub fn is_revealing(&self) -> bool {
        !matches!(self.phase, RevealPhase::Idle)
    }

    pub fn revealed(&self) -> bool {
        matches!(self.phase, RevealPhase::Revealed)
    }

    /// Close stays disabled from the third click until the panel shows.
    pub fn can_close(&self) -> bool {
        !matches!(self.phase, RevealPhase::Spreading { .. })
    }

    /// Whether the clickable chocolate still accepts clicks.
    pub fn accepts_clicks(&self) -> bool {
        self.clicks < MAX_CLICKS && !self.is_revealing()
    }

    /// Click the chocolate. `close_button` is the centre of the close control
    /// on screen, if known; the field spreads from there.
    pub fn click(
        &mut self,
        close_button: Option<Point>,
        viewport: Viewport,
        rng: &mut impl Rng,
    ) -> Vec<Delay> {
        if !self.accepts_clicks() {
            return Vec::new();
        }
        self.clicks += 1;
        self.count += 1;

        if self.clicks < MAX_CLICKS {
            return Vec::new();
        }

        self.origin = close_button.unwrap_or_else(|| viewport.center());
        self.field = chocolate_field(rng, viewport);
        self.phase = RevealPhase::Spreading { expanded: false };
        tracing::debug!(pieces = self.field.len(), "chocolate spread started");

        vec![
            Delay::new(TimerKind::ChocolateExpand, EXPAND_DELAY),
            Delay::new(TimerKind::ChocolateReveal, REVEAL_DELAY),
        ]
    }

    pub fn expand(&mut self) {
        if let RevealPhase::Spreading { expanded: false } = self.phase {
            self.phase = RevealPhase::Spreading { expanded: true };
        }
    }

    pub fn reveal(&mut self) {
        if self.is_revealing() {
            self.phase = RevealPhase::Revealed;
        }
    }
}

impl Default for ChocolateGame {
    fn default() -> Self {
        Self::new()
    }
}
