//! The static registry of the eight Valentine's week checkpoints.
//!
//! Built once from an embedded table and never mutated.

use crate::calendar::{is_unlocked, CalendarDate, SessionClock};
use serde::Serialize;
use std::sync::OnceLock;

/// Which bespoke interaction a checkpoint opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Rose,
    Propose,
    Chocolate,
    Teddy,
    Promise,
    Hug,
    Kiss,
    Valentine,
}

/// Two-stop colour gradient used to theme a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorTheme {
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkpoint {
    pub day: u8,
    pub unlock_date: CalendarDate,
    pub name: &'static str,
    pub emoji: &'static str,
    pub theme: ColorTheme,
    pub kind: DayKind,
}

impl Checkpoint {
    pub fn is_unlocked(&self, current: CalendarDate) -> bool {
        is_unlocked(current, self.unlock_date)
    }
}

type Row = (u8, (i32, u32, u32), &'static str, &'static str, (&'static str, &'static str), DayKind);

const VALENTINE_WEEK: [Row; 8] = [
    (1, (2026, 2, 7), "Rose Day", "🌹", ("red-400", "pink-400"), DayKind::Rose),
    (2, (2026, 2, 8), "Propose Day", "💍", ("purple-400", "pink-400"), DayKind::Propose),
    (3, (2026, 2, 9), "Chocolate Day", "🍫", ("amber-600", "yellow-600"), DayKind::Chocolate),
    (4, (2026, 2, 10), "Teddy Day", "🧸", ("amber-400", "orange-400"), DayKind::Teddy),
    (5, (2026, 2, 11), "Promise Day", "🤝", ("blue-400", "cyan-400"), DayKind::Promise),
    (6, (2026, 2, 12), "Hug Day", "🤗", ("green-400", "emerald-400"), DayKind::Hug),
    (7, (2026, 2, 13), "Kiss Day", "💋", ("pink-500", "rose-500"), DayKind::Kiss),
    (8, (2026, 2, 14), "Valentine's Day", "💕", ("red-500", "pink-600"), DayKind::Valentine),
];

static REGISTRY: OnceLock<Vec<Checkpoint>> = OnceLock::new();

fn registry() -> &'static Vec<Checkpoint> {
    REGISTRY.get_or_init(|| {
        let mut checkpoints = Vec::with_capacity(VALENTINE_WEEK.len());
        for (day, (y, m, d), name, emoji, (from, to), kind) in VALENTINE_WEEK {
            let Some(unlock_date) = CalendarDate::from_ymd(y, m, d) else {
                tracing::error!(day, "invalid unlock date in checkpoint table");
                continue;
            };
            checkpoints.push(Checkpoint {
                day,
                unlock_date,
                name,
                emoji,
                theme: ColorTheme { from, to },
                kind,
            });
        }
        checkpoints
    })
}

/// All checkpoints, ordered by day.
pub fn checkpoints() -> &'static [Checkpoint] {
    registry()
}

/// Look up a checkpoint by its 1-based day index.
pub fn checkpoint(day: u8) -> Option<&'static Checkpoint> {
    registry().iter().find(|c| c.day == day)
}

/// Checkpoints that the clock's current date has unlocked.
pub fn unlocked(clock: &SessionClock) -> impl Iterator<Item = &'static Checkpoint> + '_ {
    registry()
        .iter()
        .filter(move |c| c.is_unlocked(clock.current()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ClockSource;

    fn clock(s: &str) -> SessionClock {
        SessionClock::new(ClockSource::Fixed(s.parse().unwrap()))
    }

    #[test]
    fn test_registry_is_ordered_and_complete() {
        let all = checkpoints();
        assert_eq!(all.len(), 8);
        for (i, c) in all.iter().enumerate() {
            assert_eq!(c.day as usize, i + 1);
        }
        assert!(all.windows(2).all(|w| w[0].unlock_date < w[1].unlock_date));
    }

    #[test]
    fn test_ninth_of_february_unlocks_first_three() {
        let days: Vec<u8> = unlocked(&clock("2026-02-09")).map(|c| c.day).collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn test_before_the_week_nothing_unlocks() {
        assert_eq!(unlocked(&clock("2026-02-06")).count(), 0);
        assert_eq!(unlocked(&clock("2027-01-01")).count(), 8);
    }

    #[test]
    fn test_lookup_by_day() {
        assert_eq!(checkpoint(8).map(|c| c.kind), Some(DayKind::Valentine));
        assert_eq!(checkpoint(3).map(|c| c.name), Some("Chocolate Day"));
        assert!(checkpoint(0).is_none());
        assert!(checkpoint(9).is_none());
    }
}
