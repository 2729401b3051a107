//! Valentine's Day crown prompt, gating the camera overlay.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrownGate {
    camera_requested: bool,
}

impl CrownGate {
    pub fn new() -> Self {
        Self {
            camera_requested: false,
        }
    }

    pub fn camera_requested(&self) -> bool {
        self.camera_requested
    }

    /// Returns true if the camera should start.
    pub fn try_on(&mut self) -> bool {
        !std::mem::replace(&mut self.camera_requested, true)
    }

    /// Returns true if a running camera should stop.
    pub fn dismiss(&mut self) -> bool {
        std::mem::replace(&mut self.camera_requested, false)
    }
}

impl Default for CrownGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_on_and_dismiss_are_edge_triggered() {
        let mut crown = CrownGate::new();
        assert!(crown.try_on());
        assert!(!crown.try_on());
        assert!(crown.camera_requested());
        assert!(crown.dismiss());
        assert!(!crown.dismiss());
        assert!(!crown.camera_requested());
    }
}
