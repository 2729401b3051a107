//! The whole experience as one event-driven state machine.
//!
//! Events go in through [`Journey::handle`], which returns the effects the
//! runtime must carry out (timers, camera start/stop). [`Journey::view`]
//! renders a serializable snapshot, recomputing unlock state every call.

use crate::calendar::{CalendarDate, ClockSource, SessionClock};
use crate::checkpoint::{self, Checkpoint, DayKind};
use crate::effect::{Delay, Effect, Timer, TimerKind};
use crate::interaction::Interaction;
use crate::layout::{map_hearts, FloatingHeart, Point, Viewport};
use crate::proposal::{ProposalFlow, ProposalPhase};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

const MAP_HEARTS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyOptions {
    pub clock: ClockSource,
    /// Seed for every decorative layout; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for JourneyOptions {
    fn default() -> Self {
        Self {
            clock: ClockSource::LocalToday,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Hover, touch or click on the evasive "No" button.
    NoPressed { viewport: Viewport },
    YesPressed,
    /// Raw input from the date control.
    DateChanged(String),
    Select(u8),
    Close,
    QuizAnswer(String),
    ChocolateClick {
        close_button: Option<Point>,
        viewport: Viewport,
    },
    HugNext,
    HugBack,
    HugRestart,
    Kiss,
    CrownTryOn,
    CrownDismiss,
    TimerFired(Timer),
}

/// An open checkpoint modal and its interaction state.
#[derive(Debug, Clone)]
pub struct Modal {
    pub checkpoint: &'static Checkpoint,
    pub interaction: Interaction,
}

#[derive(Debug, Clone)]
enum Screen {
    Proposal(ProposalFlow),
    Map {
        hearts: Vec<FloatingHeart>,
        modal: Option<Modal>,
    },
}

pub struct Journey {
    screen: Screen,
    clock: SessionClock,
    rng: StdRng,
    /// Bumped whenever a modal opens or closes; timers from an older
    /// generation are dropped when they fire.
    generation: u64,
}

impl Journey {
    pub fn new(options: JourneyOptions) -> Self {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let clock = SessionClock::new(options.clock);
        tracing::info!(date = %clock.current(), "journey started");
        Self {
            screen: Screen::Proposal(ProposalFlow::new(&mut rng)),
            clock,
            rng,
            generation: 0,
        }
    }

    pub fn current_date(&self) -> CalendarDate {
        self.clock.current()
    }

    pub fn proposal(&self) -> Option<&ProposalFlow> {
        match &self.screen {
            Screen::Proposal(flow) => Some(flow),
            Screen::Map { .. } => None,
        }
    }

    pub fn is_on_map(&self) -> bool {
        matches!(self.screen, Screen::Map { .. })
    }

    pub fn modal(&self) -> Option<&Modal> {
        match &self.screen {
            Screen::Map { modal, .. } => modal.as_ref(),
            Screen::Proposal(_) => None,
        }
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let generation = self.generation;
        let stamp = |delays: Vec<Delay>| -> Vec<Effect> {
            delays
                .into_iter()
                .map(|d| Effect::Schedule {
                    timer: Timer {
                        kind: d.kind,
                        generation,
                    },
                    after: d.after,
                })
                .collect()
        };

        match event {
            Event::DateChanged(input) => {
                if let Err(e) = self.clock.set_from_str(&input) {
                    tracing::debug!(error = %e, "ignoring date input");
                } else {
                    tracing::info!(date = %self.clock.current(), "session date changed");
                }
                Vec::new()
            }
            Event::NoPressed { viewport } => {
                if let Screen::Proposal(flow) = &mut self.screen {
                    flow.flee(viewport, &mut self.rng);
                }
                Vec::new()
            }
            Event::YesPressed => match &mut self.screen {
                Screen::Proposal(flow) => stamp(flow.accept().into_iter().collect()),
                Screen::Map { .. } => Vec::new(),
            },
            Event::Select(day) => self.select(day),
            Event::Close => self.close(),
            Event::TimerFired(timer) => self.timer_fired(timer),
            event => {
                let Screen::Map { modal: Some(modal), .. } = &mut self.screen else {
                    return Vec::new();
                };
                match (event, &mut modal.interaction) {
                    (Event::QuizAnswer(answer), Interaction::Quiz(quiz)) => {
                        stamp(quiz.submit(&answer).into_iter().collect())
                    }
                    (Event::ChocolateClick { close_button, viewport }, Interaction::Chocolate(game)) => {
                        stamp(game.click(close_button, viewport, &mut self.rng))
                    }
                    (Event::HugNext, Interaction::Hugs(hugs)) => {
                        hugs.next();
                        Vec::new()
                    }
                    (Event::HugBack, Interaction::Hugs(hugs)) => {
                        hugs.back();
                        Vec::new()
                    }
                    (Event::HugRestart, Interaction::Hugs(hugs)) => {
                        hugs.restart();
                        Vec::new()
                    }
                    (Event::Kiss, Interaction::Kiss(kiss)) => stamp(kiss.activate().into_iter().collect()),
                    (Event::CrownTryOn, Interaction::Crown(crown)) => {
                        if crown.try_on() {
                            vec![Effect::StartCamera]
                        } else {
                            Vec::new()
                        }
                    }
                    (Event::CrownDismiss, Interaction::Crown(crown)) => {
                        if crown.dismiss() {
                            vec![Effect::StopCamera]
                        } else {
                            Vec::new()
                        }
                    }
                    (event, _) => {
                        tracing::debug!(?event, day = modal.checkpoint.day, "event does not apply to open checkpoint");
                        Vec::new()
                    }
                }
            }
        }
    }

    fn modal_mut(&mut self) -> Option<&mut Modal> {
        match &mut self.screen {
            Screen::Map { modal, .. } => modal.as_mut(),
            Screen::Proposal(_) => None,
        }
    }

    fn select(&mut self, day: u8) -> Vec<Effect> {
        if !self.is_on_map() {
            return Vec::new();
        }
        let Some(checkpoint) = checkpoint::checkpoint(day) else {
            tracing::debug!(day, "no such checkpoint");
            return Vec::new();
        };
        if !checkpoint.is_unlocked(self.clock.current()) {
            tracing::debug!(day, unlock = %checkpoint.unlock_date, "checkpoint still locked");
            return Vec::new();
        }
        if let Some(open) = self.modal().filter(|m| !m.interaction.can_close()) {
            tracing::debug!(day, open = open.checkpoint.day, "selection blocked while revealing");
            return Vec::new();
        }

        let effects = self.discard_modal();
        self.generation += 1;
        let interaction = Interaction::initial(checkpoint.kind, &mut self.rng);
        if let Screen::Map { modal, .. } = &mut self.screen {
            *modal = Some(Modal {
                checkpoint,
                interaction,
            });
        }
        tracing::info!(day, name = checkpoint.name, "checkpoint opened");
        effects
    }

    fn close(&mut self) -> Vec<Effect> {
        let Some(modal) = self.modal() else {
            return Vec::new();
        };
        if !modal.interaction.can_close() {
            tracing::debug!(day = modal.checkpoint.day, "close disabled while revealing");
            return Vec::new();
        }
        self.discard_modal()
    }

    /// Drop the open modal, if any, releasing the camera it holds.
    fn discard_modal(&mut self) -> Vec<Effect> {
        let Screen::Map { modal, .. } = &mut self.screen else {
            return Vec::new();
        };
        let Some(old) = modal.take() else {
            return Vec::new();
        };
        self.generation += 1;
        tracing::info!(day = old.checkpoint.day, "checkpoint closed");
        if old.interaction.holds_camera() {
            vec![Effect::StopCamera]
        } else {
            Vec::new()
        }
    }

    fn timer_fired(&mut self, timer: Timer) -> Vec<Effect> {
        if timer.kind == TimerKind::AcceptHandoff {
            let accepted = matches!(&self.screen, Screen::Proposal(flow) if flow.phase() == ProposalPhase::Accepted);
            if accepted {
                self.screen = Screen::Map {
                    hearts: map_hearts(&mut self.rng, MAP_HEARTS),
                    modal: None,
                };
                tracing::info!("entered checkpoint map");
            }
            return Vec::new();
        }

        if timer.generation != self.generation {
            tracing::debug!(?timer, current = self.generation, "dropping stale timer");
            return Vec::new();
        }
        let Some(modal) = self.modal_mut() else {
            return Vec::new();
        };
        match (timer.kind, &mut modal.interaction) {
            (TimerKind::QuizHint { seq }, Interaction::Quiz(quiz)) => quiz.hint_expired(seq),
            (TimerKind::ChocolateExpand, Interaction::Chocolate(game)) => game.expand(),
            (TimerKind::ChocolateReveal, Interaction::Chocolate(game)) => game.reveal(),
            (TimerKind::KissRevert, Interaction::Kiss(kiss)) => kiss.revert(),
            (kind, _) => tracing::debug!(?kind, "timer does not apply to open checkpoint"),
        }
        Vec::new()
    }

    pub fn view(&self) -> View {
        match &self.screen {
            Screen::Proposal(flow) => View::Proposal(ProposalView {
                phase: flow.phase(),
                attempts: flow.attempts(),
                no_offset: flow.offset(),
                no_scale: flow.no_scale(),
                yes_scale: flow.yes_scale(),
                no_label: flow.label().to_string(),
                hint: flow.hint(),
                hearts: flow.hearts().len(),
            }),
            Screen::Map { hearts, modal } => {
                let current = self.clock.current();
                View::Map(MapView {
                    current_date: current,
                    hearts: hearts.len(),
                    checkpoints: checkpoint::checkpoints()
                        .iter()
                        .map(|c| CheckpointView {
                            day: c.day,
                            name: c.name,
                            emoji: c.emoji,
                            date: c.unlock_date,
                            label: c.unlock_date.short_label(),
                            unlocked: c.is_unlocked(current),
                        })
                        .collect(),
                    modal: modal.as_ref().map(|m| ModalView {
                        day: m.checkpoint.day,
                        name: m.checkpoint.name,
                        kind: m.checkpoint.kind,
                        can_close: m.interaction.can_close(),
                        interaction: m.interaction.clone(),
                    }),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum View {
    Proposal(ProposalView),
    Map(MapView),
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalView {
    pub phase: ProposalPhase,
    pub attempts: u32,
    pub no_offset: Point,
    pub no_scale: f32,
    pub yes_scale: f32,
    pub no_label: String,
    pub hint: String,
    pub hearts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub current_date: CalendarDate,
    pub hearts: usize,
    pub checkpoints: Vec<CheckpointView>,
    pub modal: Option<ModalView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckpointView {
    pub day: u8,
    pub name: &'static str,
    pub emoji: &'static str,
    pub date: CalendarDate,
    pub label: String,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModalView {
    pub day: u8,
    pub name: &'static str,
    pub kind: DayKind,
    pub can_close: bool,
    pub interaction: Interaction,
}
