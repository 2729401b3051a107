//! Geometry and seeded decorative layouts.
//!
//! All randomness flows through a caller-supplied `Rng`, so a journey seeded
//! once produces the same hearts, roses and chocolates every run.

use rand::Rng;
use serde::Serialize;

/// Viewports narrower than this use the compact annulus.
pub const MOBILE_BREAKPOINT_PX: f32 = 768.0;

const MOBILE_ANNULUS: (f32, f32) = (80.0, 120.0);
const DESKTOP_ANNULUS: (f32, f32) = (150.0, 200.0);
/// Space kept between the fleeing button's centre and the viewport edge.
const EDGE_MARGIN_PX: f32 = 40.0;

/// Side of the square each chocolate roughly covers.
const CHOCOLATE_CELL_PX: f32 = 55.0;
pub const CHOCOLATE_FIELD_MIN: usize = 60;
pub const CHOCOLATE_FIELD_MAX: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_from_origin(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_mobile(&self) -> bool {
        self.width < MOBILE_BREAKPOINT_PX
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Ring between two radii around the button's resting position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annulus {
    pub inner: f32,
    pub outer: f32,
}

impl Annulus {
    /// Pick the ring for a viewport, shrunk if needed so the button stays
    /// on screen.
    pub fn for_viewport(viewport: Viewport) -> Self {
        let (inner, outer) = if viewport.is_mobile() {
            MOBILE_ANNULUS
        } else {
            DESKTOP_ANNULUS
        };
        let limit = (viewport.width.min(viewport.height) / 2.0 - EDGE_MARGIN_PX).max(0.0);
        let outer = outer.min(limit);
        Self {
            inner: inner.min(outer),
            outer,
        }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Point {
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        let distance = self.inner + rng.gen::<f32>() * (self.outer - self.inner);
        Point::new(angle.cos() * distance, angle.sin() * distance)
    }
}

/// A floating heart in percent-of-viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloatingHeart {
    pub left_pct: f32,
    pub top_pct: f32,
    pub delay_secs: f32,
    pub duration_secs: f32,
    pub rotation_deg: f32,
}

/// Hearts drifting behind the proposal card.
pub fn background_hearts(rng: &mut impl Rng, count: usize) -> Vec<FloatingHeart> {
    (0..count)
        .map(|_| FloatingHeart {
            left_pct: rng.gen_range(0.0..100.0),
            top_pct: rng.gen_range(0.0..100.0),
            delay_secs: rng.gen_range(0.0..3.0),
            duration_secs: rng.gen_range(3.0..7.0),
            rotation_deg: 0.0,
        })
        .collect()
}

/// Tilted hearts scattered over the checkpoint map.
pub fn map_hearts(rng: &mut impl Rng, count: usize) -> Vec<FloatingHeart> {
    (0..count)
        .map(|_| FloatingHeart {
            left_pct: rng.gen_range(0.0..100.0),
            top_pct: rng.gen_range(0.0..100.0),
            delay_secs: 0.0,
            duration_secs: 0.0,
            rotation_deg: rng.gen_range(0.0..360.0),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FallingRose {
    pub left_pct: f32,
    /// Starting height above the top edge, in percent of the viewport.
    pub start_above_pct: f32,
    pub delay_secs: f32,
    pub duration_secs: f32,
}

pub fn rose_shower(rng: &mut impl Rng, count: usize) -> Vec<FallingRose> {
    (0..count)
        .map(|_| FallingRose {
            left_pct: rng.gen_range(0.0..100.0),
            start_above_pct: rng.gen_range(0.0..20.0),
            delay_secs: rng.gen_range(0.0..3.0),
            duration_secs: rng.gen_range(3.0..5.0),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChocolatePiece {
    pub x_pct: f32,
    pub y_pct: f32,
    pub rotation_deg: f32,
    pub scale: f32,
    pub opacity: f32,
}

/// Number of chocolates needed to cover a viewport.
pub fn chocolate_field_size(viewport: Viewport) -> usize {
    let needed = (viewport.area() / (CHOCOLATE_CELL_PX * CHOCOLATE_CELL_PX)).floor() as usize;
    needed.clamp(CHOCOLATE_FIELD_MIN, CHOCOLATE_FIELD_MAX)
}

pub fn chocolate_field(rng: &mut impl Rng, viewport: Viewport) -> Vec<ChocolatePiece> {
    (0..chocolate_field_size(viewport))
        .map(|_| ChocolatePiece {
            x_pct: rng.gen_range(0.0..100.0),
            y_pct: rng.gen_range(0.0..100.0),
            rotation_deg: rng.gen_range(0.0..360.0),
            scale: rng.gen_range(0.7..1.5),
            opacity: rng.gen_range(0.55..1.0),
        })
        .collect()
}
