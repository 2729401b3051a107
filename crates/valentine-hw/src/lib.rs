//! valentine-hw — Camera capture for the crown overlay.
//!
//! Provides V4L2-based camera access behind the [`CaptureDevice`] and
//! [`VideoSource`] seams, delivering RGB24 frames.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, CaptureConstraints, CaptureDevice, PixelFormat, V4lCapture, VideoSource};
pub use frame::Frame;
