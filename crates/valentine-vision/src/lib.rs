//! valentine-vision — face detection and the Valentine's Day crown overlay.
//!
//! Detection uses SCRFD running via ONNX Runtime on the CPU. The overlay
//! composites a camera frame, a crown above every detected face and a
//! two-line caption, and encodes the result as PNG.

pub mod detector;
pub mod overlay;
pub mod types;

use std::path::PathBuf;

pub use detector::{DetectorError, FaceDetector, ScrfdLoader};
pub use overlay::{crown_placement, Compositor, CrownPlacement, OverlayError};
pub use types::{FaceBox, FaceDetect, ModelLoader};

/// Default model directory: `$XDG_DATA_HOME/valentine/models`, falling back
/// to `~/.local/share/valentine/models`.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("valentine")
        .join("models")
}
