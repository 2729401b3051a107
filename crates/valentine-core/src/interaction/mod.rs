//! Per-day interaction state machines, one per checkpoint kind.
//!
//! Each state lives only as long as its modal. `Interaction::initial` is the
//! single place that builds the documented starting values.

pub mod chocolate;
pub mod crown;
pub mod hugs;
pub mod kiss;
pub mod quiz;

pub use chocolate::{ChocolateGame, RevealPhase};
pub use crown::CrownGate;
pub use hugs::HugCarousel;
pub use kiss::KissToggle;
pub use quiz::Quiz;

use crate::checkpoint::DayKind;
use crate::layout::{rose_shower, FallingRose};
use rand::Rng;
use serde::Serialize;

const ROSE_SHOWER_SIZE: usize = 30;

/// Rose Day: a shower of roses falling over the modal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoseShower {
    pub roses: Vec<FallingRose>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    Rose(RoseShower),
    Quiz(Quiz),
    Chocolate(ChocolateGame),
    Teddy,
    Promise,
    Hugs(HugCarousel),
    Kiss(KissToggle),
    Crown(CrownGate),
}

impl Interaction {
    pub fn initial(kind: DayKind, rng: &mut impl Rng) -> Self {
        match kind {
            DayKind::Rose => Interaction::Rose(RoseShower {
                roses: rose_shower(rng, ROSE_SHOWER_SIZE),
            }),
            DayKind::Propose => Interaction::Quiz(Quiz::new()),
            DayKind::Chocolate => Interaction::Chocolate(ChocolateGame::new()),
            DayKind::Teddy => Interaction::Teddy,
            DayKind::Promise => Interaction::Promise,
            DayKind::Hug => Interaction::Hugs(HugCarousel::new()),
            DayKind::Kiss => Interaction::Kiss(KissToggle::new()),
            DayKind::Valentine => Interaction::Crown(CrownGate::new()),
        }
    }

    /// Whether the modal's close control is enabled.
    pub fn can_close(&self) -> bool {
        match self {
            Interaction::Chocolate(game) => game.can_close(),
            _ => true,
        }
    }

    /// Whether tearing this interaction down must also stop the camera.
    pub fn holds_camera(&self) -> bool {
        matches!(self, Interaction::Crown(crown) if crown.camera_requested())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initial_matches_kind() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(Interaction::initial(DayKind::Rose, &mut rng), Interaction::Rose(r) if r.roses.len() == ROSE_SHOWER_SIZE));
        assert_eq!(Interaction::initial(DayKind::Propose, &mut rng), Interaction::Quiz(Quiz::new()));
        assert_eq!(
            Interaction::initial(DayKind::Chocolate, &mut rng),
            Interaction::Chocolate(ChocolateGame::new())
        );
        assert_eq!(Interaction::initial(DayKind::Hug, &mut rng), Interaction::Hugs(HugCarousel::new()));
        assert_eq!(Interaction::initial(DayKind::Kiss, &mut rng), Interaction::Kiss(KissToggle::new()));
        assert_eq!(Interaction::initial(DayKind::Valentine, &mut rng), Interaction::Crown(CrownGate::new()));
    }

    #[test]
    fn test_holds_camera_only_when_requested() {
        let mut crown = CrownGate::new();
        assert!(!Interaction::Crown(crown).holds_camera());
        crown.try_on();
        assert!(Interaction::Crown(crown).holds_camera());
        assert!(!Interaction::Teddy.holds_camera());
    }
}
