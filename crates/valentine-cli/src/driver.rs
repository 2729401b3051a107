//! Terminal runtime for the journey.
//!
//! Reads one command per line, feeds the matching event to the [`Journey`],
//! carries out the effects it returns (timers, the crown camera) and prints
//! the rendered view as one JSON line after every command and fired timer.

use crate::config::Config;
use crate::engine::{OverlaySession, SessionOptions, SessionStatus, Snapshot};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use valentine_core::{Assets, Effect, Event, Journey, Point, Timer, View, Viewport};
use valentine_hw::{CaptureDevice, V4lCapture};
use valentine_vision::{ModelLoader, ScrfdLoader};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    No,
    Yes,
    Date(String),
    Open(u8),
    Close,
    Answer(String),
    /// Click the chocolate; the optional point is the close button's centre.
    Click(Option<Point>),
    Next,
    Back,
    Restart,
    Kiss,
    Crown,
    Dismiss,
    Capture,
    Retake,
    Save(Option<PathBuf>),
    View,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{command}: expected {expected}")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();
        let usage = |command, expected| CommandError::Usage { command, expected };

        let command = match name.as_str() {
            "no" => Command::No,
            "yes" => Command::Yes,
            "date" => match args.as_slice() {
                [date] => Command::Date(date.to_string()),
                _ => return Err(usage("date", "YYYY-MM-DD")),
            },
            "open" => match args.as_slice() {
                [day] => Command::Open(day.parse().map_err(|_| usage("open", "a day number 1-8"))?),
                _ => return Err(usage("open", "a day number 1-8")),
            },
            "close" => Command::Close,
            "answer" if !args.is_empty() => Command::Answer(args.join(" ")),
            "answer" => return Err(usage("answer", "an option")),
            "click" => match args.as_slice() {
                [] => Command::Click(None),
                [x, y] => {
                    let coord = |v: &str| v.parse::<f32>().map_err(|_| usage("click", "X Y in pixels"));
                    Command::Click(Some(Point::new(coord(x)?, coord(y)?)))
                }
                _ => return Err(usage("click", "X Y in pixels")),
            },
            "next" => Command::Next,
            "back" => Command::Back,
            "restart" => Command::Restart,
            "kiss" => Command::Kiss,
            "crown" => Command::Crown,
            "dismiss" => Command::Dismiss,
            "capture" => Command::Capture,
            "retake" => Command::Retake,
            "save" => Command::Save(args.first().map(PathBuf::from)),
            "view" => Command::View,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(name)),
        };
        Ok(command)
    }
}

impl Command {
    /// The journey event this command stands for, if any.
    pub fn event(self, viewport: Viewport) -> Option<Event> {
        let event = match self {
            Command::No => Event::NoPressed { viewport },
            Command::Yes => Event::YesPressed,
            Command::Date(input) => Event::DateChanged(input),
            Command::Open(day) => Event::Select(day),
            Command::Close => Event::Close,
            Command::Answer(answer) => Event::QuizAnswer(answer),
            Command::Click(close_button) => Event::ChocolateClick { close_button, viewport },
            Command::Next => Event::HugNext,
            Command::Back => Event::HugBack,
            Command::Restart => Event::HugRestart,
            Command::Kiss => Event::Kiss,
            Command::Crown => Event::CrownTryOn,
            Command::Dismiss => Event::CrownDismiss,
            Command::Capture | Command::Retake | Command::Save(_) | Command::View | Command::Quit => return None,
        };
        Some(event)
    }
}

/// What the crown interaction opens when asked to.
#[derive(Clone)]
pub struct CameraBackend {
    pub device: Arc<dyn CaptureDevice>,
    pub loader: Arc<dyn ModelLoader>,
    pub options: SessionOptions,
}

impl CameraBackend {
    /// The system camera and the configured SCRFD model.
    pub fn system(config: &Config) -> Self {
        Self {
            device: Arc::new(V4lCapture),
            loader: Arc::new(ScrfdLoader::new(config.detector_model_path())),
            options: config.session_options(),
        }
    }

    pub fn start(&self) -> OverlaySession {
        OverlaySession::start(self.device.clone(), self.loader.clone(), self.options.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Serialize)]
struct Rendered<'a> {
    view: View,
    media: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    camera: Option<SessionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<SnapshotInfo<'a>>,
}

#[derive(Serialize)]
struct SnapshotInfo<'a> {
    width: u32,
    height: u32,
    bytes: usize,
    file_name: &'a str,
}

pub struct Driver<W: Write> {
    journey: Journey,
    assets: Assets,
    viewport: Viewport,
    camera: CameraBackend,
    session: Option<OverlaySession>,
    snapshot: Option<Snapshot>,
    timers: mpsc::UnboundedSender<Timer>,
    fired: Option<mpsc::UnboundedReceiver<Timer>>,
    pending_timers: usize,
    out: W,
}

impl<W: Write> Driver<W> {
    pub fn new(journey: Journey, assets: Assets, viewport: Viewport, camera: CameraBackend, out: W) -> Self {
        let (timers, fired) = mpsc::unbounded_channel();
        Self {
            journey,
            assets,
            viewport,
            camera,
            session: None,
            snapshot: None,
            timers,
            fired: Some(fired),
            pending_timers: 0,
            out,
        }
    }

    pub fn journey(&self) -> &Journey {
        &self.journey
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Process commands until `quit` or end of input. After end of input,
    /// timers already scheduled still fire and render.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> anyhow::Result<()> {
        let Some(mut fired) = self.fired.take() else {
            anyhow::bail!("driver has already run");
        };
        let mut lines = input.lines();
        let mut input_open = true;
        self.render()?;

        while input_open || self.pending_timers > 0 {
            tokio::select! {
                line = lines.next_line(), if input_open => match line? {
                    Some(line) => {
                        if self.dispatch(&line)? == Flow::Quit {
                            break;
                        }
                    }
                    None => input_open = false,
                },
                Some(timer) = fired.recv() => {
                    self.pending_timers = self.pending_timers.saturating_sub(1);
                    let effects = self.journey.handle(Event::TimerFired(timer));
                    self.apply(effects);
                    self.render()?;
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> anyhow::Result<Flow> {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(CommandError::Empty) => return Ok(Flow::Continue),
            Err(e) => {
                eprintln!("{e}");
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?command, "command");

        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::View => {}
            Command::Capture => self.capture(),
            Command::Retake => {
                if self.session.as_ref().is_some_and(OverlaySession::retake) {
                    self.snapshot = None;
                }
            }
            Command::Save(path) => self.save(path),
            command => {
                if let Some(event) = command.event(self.viewport) {
                    let effects = self.journey.handle(event);
                    self.apply(effects);
                }
            }
        }
        self.render()?;
        Ok(Flow::Continue)
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule { timer, after } => {
                    self.pending_timers += 1;
                    let timers = self.timers.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = timers.send(timer);
                    });
                }
                Effect::StartCamera => {
                    if self.session.is_none() {
                        self.session = Some(self.camera.start());
                    }
                }
                Effect::StopCamera => {
                    if let Some(mut session) = self.session.take() {
                        session.close();
                    }
                    self.snapshot = None;
                }
            }
        }
    }

    fn capture(&mut self) {
        let Some(session) = &self.session else {
            eprintln!("the crown camera is not running");
            return;
        };
        match session.capture() {
            Ok(snapshot) => self.snapshot = Some(snapshot),
            Err(e) => eprintln!("capture failed: {e}"),
        }
    }

    fn save(&self, path: Option<PathBuf>) {
        let Some(snapshot) = &self.snapshot else {
            eprintln!("nothing captured yet");
            return;
        };
        let path = path.unwrap_or_else(|| PathBuf::from(&self.assets.snapshot_file_name));
        if let Err(e) = snapshot.save(&path) {
            eprintln!("failed to save {}: {e}", path.display());
        }
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let media = match self.journey.modal() {
            Some(modal) => self.assets.media_for(&modal.interaction),
            None => self
                .journey
                .proposal()
                .and_then(|flow| self.assets.celebration_for(flow))
                .into_iter()
                .collect(),
        };
        let rendered = Rendered {
            view: self.journey.view(),
            media,
            camera: self.session.as_ref().map(OverlaySession::status),
            snapshot: self.snapshot.as_ref().map(|s| SnapshotInfo {
                width: s.width,
                height: s.height,
                bytes: s.png.len(),
                file_name: &self.assets.snapshot_file_name,
            }),
        };
        serde_json::to_writer(&mut self.out, &rendered)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}
