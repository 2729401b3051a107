use crate::detector::DetectorError;
use serde::{Deserialize, Serialize};

/// A detected face in source-frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub top_left: (f32, f32),
    pub bottom_right: (f32, f32),
    pub confidence: f32,
}

impl FaceBox {
    pub fn new(top_left: (f32, f32), bottom_right: (f32, f32), confidence: f32) -> Self {
        Self {
            top_left,
            bottom_right,
            confidence,
        }
    }

    pub fn width(&self) -> f32 {
        self.bottom_right.0 - self.top_left.0
    }

    pub fn height(&self) -> f32 {
        self.bottom_right.1 - self.top_left.1
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }
}

/// A loaded detection model.
pub trait FaceDetect: Send {
    /// Detect faces in a packed RGB24 frame, best first.
    fn detect(&mut self, rgb: &[u8], width: u32, height: u32) -> Result<Vec<FaceBox>, DetectorError>;
}

/// Produces a detection model. Loading may be slow and may fail.
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Box<dyn FaceDetect>, DetectorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_box_dimensions() {
        let face = FaceBox::new((10.0, 20.0), (110.0, 170.0), 0.9);
        assert_eq!(face.width(), 100.0);
        assert_eq!(face.height(), 150.0);
        assert_eq!(face.area(), 15_000.0);
    }

    #[test]
    fn test_inverted_box_has_no_area() {
        let face = FaceBox::new((50.0, 50.0), (40.0, 60.0), 0.9);
        assert_eq!(face.area(), 0.0);
    }
}
