//! valentine-core — The Valentine's week journey as pure state machines.
//!
//! A proposal screen gates a map of eight date-locked checkpoints, each
//! opening its own small interaction. Nothing here sleeps or touches a
//! device: timers and camera control are returned as [`Effect`]s.

pub mod assets;
pub mod calendar;
pub mod checkpoint;
pub mod effect;
pub mod interaction;
pub mod journey;
pub mod layout;
pub mod proposal;

pub use assets::Assets;
pub use calendar::{CalendarDate, ClockSource, SessionClock};
pub use checkpoint::{Checkpoint, DayKind};
pub use effect::{Effect, Timer, TimerKind};
pub use journey::{Event, Journey, JourneyOptions, View};
pub use layout::{Point, Viewport};
