//! Crown overlay session: camera, detector and compositor driven by a
//! cancelable frame loop.
//!
//! Acquisition and model loading run as independent blocking tasks. The
//! loop starts once both are ready, handles one tick at a time and checks
//! the liveness flag after every await, so nothing completing after
//! teardown is drawn, stored or left running.

use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use valentine_hw::{CameraError, CaptureConstraints, CaptureDevice, Frame, VideoSource};
use valentine_vision::{Compositor, DetectorError, FaceDetect, ModelLoader, OverlayError};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub constraints: CaptureConstraints,
    pub model_load_timeout: Duration,
    pub frame_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            constraints: CaptureConstraints::default(),
            model_load_timeout: Duration::from_secs(20),
            frame_interval: Duration::from_millis(33),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SessionFailure {
    #[error("Could not access camera. Please allow camera permissions. ({0})")]
    CameraUnavailable(String),
    #[error("Face detection is unavailable: {0}")]
    ModelUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    Loading { camera_ready: bool, model_ready: bool },
    /// At least one frame has been composited.
    Live,
    Captured,
    Failed(SessionFailure),
    Closed,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("overlay is not live")]
    NotLive,
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

/// A captured overlay frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Snapshot {
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.png)?;
        tracing::info!(path = %path.display(), bytes = self.png.len(), "snapshot saved");
        Ok(())
    }
}

/// State shared between the session handle, its loop and blocking tasks.
struct Shared {
    active: AtomicBool,
    suspended: AtomicBool,
    source: Mutex<Option<Box<dyn VideoSource>>>,
    detector: Mutex<Option<Box<dyn FaceDetect>>>,
    compositor: Mutex<Compositor>,
    status: watch::Sender<SessionStatus>,
    resume: Notify,
    frames_drawn: AtomicU64,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn set_status(&self, status: SessionStatus) {
        if self.is_active() {
            self.status.send_replace(status);
        }
    }

    /// Store a freshly acquired stream, or stop it if the session has
    /// already been torn down.
    fn park_source(&self, mut source: Box<dyn VideoSource>) {
        let mut slot = lock(&self.source);
        if self.is_active() {
            *slot = Some(source);
        } else {
            drop(slot);
            tracing::debug!("session closed while camera was busy; stopping it");
            source.stop();
        }
    }

    fn park_detector(&self, detector: Box<dyn FaceDetect>) {
        let mut slot = lock(&self.detector);
        if self.is_active() {
            *slot = Some(detector);
        }
    }

    /// Stop the camera and release the model. Blocks while a frame read is
    /// in flight. Idempotent.
    fn release(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::info!(frames = self.frames_drawn.load(Ordering::SeqCst), "overlay session released");
        }
        self.resume.notify_one();
        if let Some(mut source) = lock(&self.source).take() {
            source.stop();
        }
        lock(&self.detector).take();
    }

    fn fail(&self, failure: SessionFailure) {
        tracing::warn!(error = %failure, "overlay session failed");
        self.set_status(SessionStatus::Failed(failure));
        self.release();
    }
}

/// Handle to a running crown overlay. Dropping it closes the session.
pub struct OverlaySession {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
    status: watch::Receiver<SessionStatus>,
}

impl OverlaySession {
    /// Start acquiring the camera and loading the model. Must be called
    /// from within a tokio runtime.
    pub fn start(device: Arc<dyn CaptureDevice>, loader: Arc<dyn ModelLoader>, options: SessionOptions) -> Self {
        let (status_tx, status) = watch::channel(SessionStatus::Loading {
            camera_ready: false,
            model_ready: false,
        });
        let shared = Arc::new(Shared {
            active: AtomicBool::new(true),
            suspended: AtomicBool::new(false),
            source: Mutex::new(None),
            detector: Mutex::new(None),
            compositor: Mutex::new(Compositor::new()),
            status: status_tx,
            resume: Notify::new(),
            frames_drawn: AtomicU64::new(0),
        });

        tracing::info!(device = ?options.constraints.device, "overlay session starting");
        let task = tokio::spawn(run(shared.clone(), device, loader, options));

        Self {
            shared,
            task: Some(task),
            status,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.shared.frames_drawn.load(Ordering::SeqCst)
    }

    /// Freeze the current overlay as a PNG and suspend the loop.
    pub fn capture(&self) -> Result<Snapshot, SessionError> {
        let compositor = lock(&self.shared.compositor);
        if self.status() != SessionStatus::Live {
            return Err(SessionError::NotLive);
        }
        let png = compositor.snapshot()?;
        let (width, height) = compositor.dimensions();
        self.shared.suspended.store(true, Ordering::SeqCst);
        self.shared.set_status(SessionStatus::Captured);
        tracing::info!(width, height, bytes = png.len(), "overlay captured");
        Ok(Snapshot { png, width, height })
    }

    /// Discard the capture and resume the live loop. Returns false when
    /// nothing was captured.
    pub fn retake(&self) -> bool {
        if self.status() != SessionStatus::Captured {
            return false;
        }
        self.shared.set_status(SessionStatus::Live);
        self.shared.suspended.store(false, Ordering::SeqCst);
        self.shared.resume.notify_one();
        tracing::info!("overlay resumed");
        true
    }

    /// Tear everything down. Safe to call any number of times; once it
    /// returns the camera is stopped and no further frame is drawn.
    pub fn close(&mut self) {
        let was_active = self.shared.is_active();
        if was_active {
            self.shared.status.send_replace(SessionStatus::Closed);
        }
        self.shared.release();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        // Wait out a composite that was already past its liveness check.
        drop(lock(&self.shared.compositor));
        if was_active {
            tracing::info!("overlay session closed");
        }
    }
}

impl Drop for OverlaySession {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run(shared: Arc<Shared>, device: Arc<dyn CaptureDevice>, loader: Arc<dyn ModelLoader>, options: SessionOptions) {
    let camera = {
        let shared = shared.clone();
        let constraints = options.constraints.clone();
        async move {
            let task_shared = shared.clone();
            let acquired = tokio::task::spawn_blocking(move || -> Result<(u32, u32), CameraError> {
                let source = device.acquire(&constraints)?;
                let resolution = source.resolution();
                task_shared.park_source(source);
                Ok(resolution)
            })
            .await;
            match acquired {
                Ok(Ok((width, height))) => {
                    tracing::info!(width, height, "camera ready");
                    mark_ready(&shared, true, false);
                    Ok(())
                }
                Ok(Err(e)) => Err(SessionFailure::CameraUnavailable(e.to_string())),
                Err(e) => Err(SessionFailure::CameraUnavailable(e.to_string())),
            }
        }
    };

    let model = {
        let shared = shared.clone();
        let timeout = options.model_load_timeout;
        async move {
            let loading = tokio::task::spawn_blocking(move || loader.load());
            match tokio::time::timeout(timeout, loading).await {
                Ok(Ok(Ok(detector))) => {
                    shared.park_detector(detector);
                    tracing::info!("face detection model ready");
                    mark_ready(&shared, false, true);
                    Ok(())
                }
                Ok(Ok(Err(e))) => Err(SessionFailure::ModelUnavailable(e.to_string())),
                Ok(Err(e)) => Err(SessionFailure::ModelUnavailable(e.to_string())),
                Err(_) => Err(SessionFailure::ModelUnavailable(
                    DetectorError::LoadTimedOut(timeout).to_string(),
                )),
            }
        }
    };

    if let Err(failure) = tokio::try_join!(camera, model) {
        if shared.is_active() {
            shared.fail(failure);
        }
        return;
    }
    if !shared.is_active() {
        return;
    }

    tracing::info!(interval_ms = options.frame_interval.as_millis() as u64, "overlay loop started");
    let mut live = false;

    let mut ticker = tokio::time::interval(options.frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !shared.is_active() {
            break;
        }
        if shared.suspended.load(Ordering::SeqCst) {
            shared.resume.notified().await;
            continue;
        }

        let tick_shared = shared.clone();
        let outcome = tokio::task::spawn_blocking(move || tick(&tick_shared)).await;
        if !shared.is_active() {
            break;
        }
        match outcome {
            Ok(Ok(TickOutcome::Drawn { faces })) => {
                if !live {
                    live = true;
                    shared.set_status(SessionStatus::Live);
                    tracing::info!("first frame drawn, overlay live");
                }
                tracing::trace!(faces, "frame drawn");
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                shared.fail(SessionFailure::CameraUnavailable(e.to_string()));
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "overlay tick panicked");
                shared.fail(SessionFailure::CameraUnavailable(e.to_string()));
                break;
            }
        }
    }
}

fn mark_ready(shared: &Shared, camera: bool, model: bool) {
    if !shared.is_active() {
        return;
    }
    shared.status.send_modify(|status| {
        if let SessionStatus::Loading {
            camera_ready,
            model_ready,
        } = status
        {
            *camera_ready |= camera;
            *model_ready |= model;
        }
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Drawn { faces: usize },
    NotReady,
    Discarded,
}

/// One frame: read, detect, composite. Runs on the blocking pool.
fn tick(shared: &Shared) -> Result<TickOutcome, CameraError> {
    let Some(frame) = read_frame(shared)? else {
        return Ok(TickOutcome::NotReady);
    };
    if !shared.is_active() {
        return Ok(TickOutcome::Discarded);
    }

    let detector = lock(&shared.detector).take();
    let faces = match detector {
        Some(mut detector) => {
            let detected = detector.detect(&frame.data, frame.width, frame.height);
            shared.park_detector(detector);
            detected.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "face detection failed; drawing frame without crowns");
                Vec::new()
            })
        }
        None => return Ok(TickOutcome::Discarded),
    };

    let mut compositor = lock(&shared.compositor);
    if !shared.is_active() || shared.suspended.load(Ordering::SeqCst) {
        return Ok(TickOutcome::Discarded);
    }
    if let Err(e) = compositor.composite(&frame.data, frame.width, frame.height, &faces) {
        tracing::warn!(error = %e, "dropping frame");
        return Ok(TickOutcome::NotReady);
    }
    shared.frames_drawn.fetch_add(1, Ordering::SeqCst);
    Ok(TickOutcome::Drawn { faces: faces.len() })
}

/// The source stays in its slot while reading, so `release` waits for an
/// in-flight dequeue and then stops the device itself.
fn read_frame(shared: &Shared) -> Result<Option<Frame>, CameraError> {
    let mut slot = lock(&shared.source);
    if !shared.is_active() {
        return Ok(None);
    }
    match slot.as_mut() {
        Some(source) => source.read_frame(),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use valentine_vision::FaceBox;

    const W: u32 = 64;
    const H: u32 = 48;

    /// Release/entered pair that holds a read open until the test says so.
    type Gate = (mpsc::Receiver<()>, mpsc::Sender<()>);

    struct FakeSource {
        stops: Arc<AtomicUsize>,
        sequence: u32,
        gate: Option<Gate>,
    }

    impl VideoSource for FakeSource {
        fn resolution(&self) -> (u32, u32) {
            (W, H)
        }

        fn read_frame(&mut self) -> Result<Option<Frame>, CameraError> {
            if let Some((release, entered)) = &self.gate {
                let _ = entered.send(());
                let _ = release.recv();
            }
            self.sequence += 1;
            if self.sequence == 1 {
                // First buffer is not decoded yet.
                return Ok(None);
            }
            Ok(Some(Frame::new(vec![40; (W * H * 3) as usize], W, H, self.sequence).unwrap()))
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeDevice {
        stops: Arc<AtomicUsize>,
        deny: bool,
        delay: Duration,
        read_gate: Mutex<Option<Gate>>,
    }

    impl CaptureDevice for FakeDevice {
        fn acquire(&self, _: &CaptureConstraints) -> Result<Box<dyn VideoSource>, CameraError> {
            std::thread::sleep(self.delay);
            if self.deny {
                return Err(CameraError::PermissionDenied("/dev/video0".into()));
            }
            Ok(Box::new(FakeSource {
                stops: self.stops.clone(),
                sequence: 0,
                gate: lock(&self.read_gate).take(),
            }))
        }
    }

    struct FakeDetector {
        gate: Option<Mutex<mpsc::Receiver<()>>>,
        entered: Option<Mutex<mpsc::Sender<()>>>,
    }

    impl FaceDetect for FakeDetector {
        fn detect(&mut self, _: &[u8], _: u32, _: u32) -> Result<Vec<FaceBox>, DetectorError> {
            if let Some(entered) = &self.entered {
                let _ = lock(entered).send(());
            }
            if let Some(gate) = &self.gate {
                let _ = lock(gate).recv();
            }
            Ok(vec![FaceBox::new((16.0, 24.0), (48.0, 46.0), 0.9)])
        }
    }

    #[derive(Default)]
    struct FakeLoader {
        delay: Duration,
        fail: bool,
        gate: Mutex<Option<(mpsc::Receiver<()>, mpsc::Sender<()>)>>,
    }

    impl ModelLoader for FakeLoader {
        fn load(&self) -> Result<Box<dyn FaceDetect>, DetectorError> {
            std::thread::sleep(self.delay);
            if self.fail {
                return Err(DetectorError::ModelNotFound("det_500m.onnx".into()));
            }
            let (gate, entered) = match lock(&self.gate).take() {
                Some((gate, entered)) => (Some(Mutex::new(gate)), Some(Mutex::new(entered))),
                None => (None, None),
            };
            Ok(Box::new(FakeDetector { gate, entered }))
        }
    }

    fn options() -> SessionOptions {
        SessionOptions {
            constraints: CaptureConstraints::default(),
            model_load_timeout: Duration::from_secs(5),
            frame_interval: Duration::from_millis(5),
        }
    }

    async fn wait_for_status(session: &OverlaySession, mut pred: impl FnMut(&SessionStatus) -> bool) {
        let mut rx = session.subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| pred(s)))
            .await
            .expect("timed out waiting for status")
            .expect("status channel closed");
    }

    async fn wait_for_frames(session: &OverlaySession, at_least: u64) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while session.frames_drawn() < at_least {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("timed out waiting for frames");
    }

    #[tokio::test]
    async fn test_goes_live_and_close_stops_camera_once() {
        let device = Arc::new(FakeDevice::default());
        let stops = device.stops.clone();
        let mut session = OverlaySession::start(device, Arc::new(FakeLoader::default()), options());

        wait_for_status(&session, |s| *s == SessionStatus::Live).await;
        wait_for_frames(&session, 2).await;

        session.close();
        session.close();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(session.status(), SessionStatus::Closed);

        let drawn = session.frames_drawn();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(session.frames_drawn(), drawn);
    }

    #[tokio::test]
    async fn test_close_waits_for_in_flight_read_then_stops_camera() {
        let (release_tx, release_rx) = mpsc::channel();
        let (entered_tx, entered_rx) = mpsc::channel();
        let device = Arc::new(FakeDevice {
            read_gate: Mutex::new(Some((release_rx, entered_tx))),
            ..FakeDevice::default()
        });
        let stops = device.stops.clone();
        let mut session = OverlaySession::start(device, Arc::new(FakeLoader::default()), options());

        let entered = tokio::task::spawn_blocking(move || entered_rx.recv_timeout(Duration::from_secs(5)));
        entered.await.unwrap().expect("read never started");

        let closing = tokio::task::spawn_blocking(move || {
            session.close();
            let stopped_on_return = stops.load(Ordering::SeqCst);
            (session, stops, stopped_on_return)
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!closing.is_finished(), "close returned while a read was in flight");

        release_tx.send(()).unwrap();
        let (session, stops, stopped_on_return) = closing.await.unwrap();
        assert_eq!(stopped_on_return, 1);
        assert_eq!(session.status(), SessionStatus::Closed);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(session.frames_drawn(), 0);
    }

    #[tokio::test]
    async fn test_live_only_after_first_frame_is_drawn() {
        let session = OverlaySession::start(
            Arc::new(FakeDevice::default()),
            Arc::new(FakeLoader::default()),
            options(),
        );
        wait_for_status(&session, |s| *s == SessionStatus::Live).await;
        assert!(session.frames_drawn() >= 1);
        let snapshot = session.capture().unwrap();
        assert_eq!((snapshot.width, snapshot.height), (W, H));
    }

    #[test]
    fn test_model_timeout_message_names_the_limit() {
        let detail = DetectorError::LoadTimedOut(Duration::from_secs(20)).to_string();
        assert_eq!(detail, "model load timed out after 20s");
    }

    #[tokio::test]
    async fn test_reports_both_readiness_flags_while_loading() {
        let device = Arc::new(FakeDevice::default());
        let loader = Arc::new(FakeLoader {
            delay: Duration::from_millis(100),
            ..FakeLoader::default()
        });
        let session = OverlaySession::start(device, loader, options());

        wait_for_status(&session, |s| {
            *s == SessionStatus::Loading {
                camera_ready: true,
                model_ready: false,
            }
        })
        .await;
        wait_for_status(&session, |s| *s == SessionStatus::Live).await;
    }

    #[tokio::test]
    async fn test_camera_denied_fails_without_retry() {
        let device = Arc::new(FakeDevice {
            deny: true,
            ..FakeDevice::default()
        });
        let session = OverlaySession::start(device, Arc::new(FakeLoader::default()), options());

        wait_for_status(&session, |s| matches!(s, SessionStatus::Failed(_))).await;
        let SessionStatus::Failed(failure) = session.status() else {
            unreachable!()
        };
        assert!(matches!(failure, SessionFailure::CameraUnavailable(_)));
        assert!(failure.to_string().starts_with("Could not access camera"));
        assert_eq!(session.frames_drawn(), 0);
    }

    #[tokio::test]
    async fn test_model_timeout_fails_and_releases_camera() {
        let device = Arc::new(FakeDevice::default());
        let stops = device.stops.clone();
        let loader = Arc::new(FakeLoader {
            delay: Duration::from_millis(300),
            ..FakeLoader::default()
        });
        let session = OverlaySession::start(
            device,
            loader,
            SessionOptions {
                model_load_timeout: Duration::from_millis(30),
                ..options()
            },
        );

        wait_for_status(&session, |s| matches!(s, SessionStatus::Failed(SessionFailure::ModelUnavailable(_)))).await;
        tokio::time::timeout(Duration::from_secs(5), async {
            while stops.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("camera never stopped");
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_load_error_is_reported() {
        let loader = Arc::new(FakeLoader {
            fail: true,
            ..FakeLoader::default()
        });
        let session = OverlaySession::start(Arc::new(FakeDevice::default()), loader, options());
        wait_for_status(&session, |s| matches!(s, SessionStatus::Failed(SessionFailure::ModelUnavailable(_)))).await;
    }

    #[tokio::test]
    async fn test_camera_acquired_after_close_is_stopped() {
        let device = Arc::new(FakeDevice {
            delay: Duration::from_millis(50),
            ..FakeDevice::default()
        });
        let stops = device.stops.clone();
        let mut session = OverlaySession::start(device, Arc::new(FakeLoader::default()), options());

        // Let acquisition begin, then close while it is still blocked.
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.close();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(session.status(), SessionStatus::Closed);
        assert_eq!(session.frames_drawn(), 0);
    }

    #[tokio::test]
    async fn test_no_draw_after_close_with_detection_in_flight() {
        let (release_tx, release_rx) = mpsc::channel();
        let (entered_tx, entered_rx) = mpsc::channel();
        let loader = Arc::new(FakeLoader {
            gate: Mutex::new(Some((release_rx, entered_tx))),
            ..FakeLoader::default()
        });
        let device = Arc::new(FakeDevice::default());
        let stops = device.stops.clone();
        let mut session = OverlaySession::start(device, loader, options());

        let entered = tokio::task::spawn_blocking(move || entered_rx.recv_timeout(Duration::from_secs(5)));
        entered.await.unwrap().expect("detection never started");

        session.close();
        release_tx.send(()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(session.frames_drawn(), 0);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_capture_suspends_and_retake_resumes() {
        let mut session = OverlaySession::start(
            Arc::new(FakeDevice::default()),
            Arc::new(FakeLoader::default()),
            options(),
        );
        assert!(matches!(session.capture(), Err(SessionError::NotLive)));
        assert!(!session.retake());

        wait_for_status(&session, |s| *s == SessionStatus::Live).await;
        wait_for_frames(&session, 1).await;

        let snapshot = session.capture().unwrap();
        assert_eq!((snapshot.width, snapshot.height), (W, H));
        assert_eq!(&snapshot.png[..4], b"\x89PNG");
        assert_eq!(session.status(), SessionStatus::Captured);

        let frozen = session.frames_drawn();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(session.frames_drawn(), frozen);

        assert!(session.retake());
        assert_eq!(session.status(), SessionStatus::Live);
        wait_for_frames(&session, frozen + 1).await;
        session.close();
    }

    #[test]
    fn test_snapshot_save_writes_png_bytes() {
        let snapshot = Snapshot {
            png: b"\x89PNG\r\n\x1a\nrest".to_vec(),
            width: 1,
            height: 1,
        };
        let path = std::env::temp_dir().join(format!("valentine-snapshot-{}.png", std::process::id()));
        snapshot.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), snapshot.png);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let json = serde_json::to_value(SessionStatus::Loading {
            camera_ready: true,
            model_ready: false,
        })
        .unwrap();
        assert_eq!(json["state"], "loading");
        assert_eq!(json["camera_ready"], true);

        let failed = serde_json::to_value(SessionStatus::Failed(SessionFailure::ModelUnavailable("gone".into()))).unwrap();
        assert_eq!(failed["state"], "failed");
        assert_eq!(failed["reason"], "model_unavailable");
        assert_eq!(failed["detail"], "gone");
    }
}
