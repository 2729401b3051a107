use crate::engine::SessionOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use valentine_core::{Assets, CalendarDate, ClockSource, JourneyOptions, Viewport};
use valentine_hw::CaptureConstraints;

/// Runtime configuration, loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// V4L2 device path; `None` opens the first capture device.
    pub camera_device: Option<String>,
    /// Requested capture resolution. A hint; the driver may pick another.
    pub camera_width: u32,
    pub camera_height: u32,
    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,
    /// SCRFD model file name inside `model_dir`.
    pub detector_model: String,
    /// How long the model may take to load before the session fails.
    pub model_load_timeout_secs: u64,
    pub frame_interval_ms: u64,
    /// Fixed reference date; `None` follows the local calendar.
    pub reference_date: Option<CalendarDate>,
    pub seed: Option<u64>,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// TOML file overriding asset locations.
    pub assets_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `VALENTINE_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = &lookup as &dyn Fn(&str) -> Option<String>;

        let reference_date = lookup("VALENTINE_REFERENCE_DATE").and_then(|raw| match raw.trim().parse::<CalendarDate>() {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!(value = %raw, error = %e, "ignoring VALENTINE_REFERENCE_DATE; using local date");
                None
            }
        });

        Self {
            camera_device: lookup("VALENTINE_CAMERA_DEVICE").filter(|d| !d.trim().is_empty()),
            camera_width: env_parse::<u32>(lookup, "VALENTINE_CAMERA_WIDTH").unwrap_or(1280),
            camera_height: env_parse::<u32>(lookup, "VALENTINE_CAMERA_HEIGHT").unwrap_or(960),
            model_dir: lookup("VALENTINE_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(valentine_vision::default_model_dir),
            detector_model: lookup("VALENTINE_DETECTOR_MODEL").unwrap_or_else(|| "det_500m.onnx".to_string()),
            model_load_timeout_secs: env_parse::<u64>(lookup, "VALENTINE_MODEL_LOAD_TIMEOUT_SECS").unwrap_or(20),
            frame_interval_ms: env_parse::<u64>(lookup, "VALENTINE_FRAME_INTERVAL_MS").filter(|&ms| ms > 0).unwrap_or(33),
            reference_date,
            seed: env_parse::<u64>(lookup, "VALENTINE_SEED"),
            viewport_width: env_parse::<f32>(lookup, "VALENTINE_VIEWPORT_WIDTH").unwrap_or(1280.0),
            viewport_height: env_parse::<f32>(lookup, "VALENTINE_VIEWPORT_HEIGHT").unwrap_or(800.0),
            assets_path: lookup("VALENTINE_ASSETS").map(PathBuf::from),
        }
    }

    /// Path to the SCRFD detection model.
    pub fn detector_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.detector_model)
    }

    pub fn capture_constraints(&self) -> CaptureConstraints {
        CaptureConstraints {
            device: self.camera_device.clone(),
            ideal_width: self.camera_width,
            ideal_height: self.camera_height,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            constraints: self.capture_constraints(),
            model_load_timeout: Duration::from_secs(self.model_load_timeout_secs),
            frame_interval: Duration::from_millis(self.frame_interval_ms),
        }
    }

    pub fn journey_options(&self) -> JourneyOptions {
        JourneyOptions {
            clock: self.reference_date.map_or(ClockSource::LocalToday, ClockSource::Fixed),
            seed: self.seed,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    /// The configured asset table, or the built-in one.
    pub fn assets(&self) -> anyhow::Result<Assets> {
        match &self.assets_path {
            Some(path) => Ok(Assets::load(path)?),
            None => Ok(Assets::default()),
        }
    }
}

fn env_parse<T: FromStr>(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]);
        assert_eq!(c.camera_device, None);
        assert_eq!((c.camera_width, c.camera_height), (1280, 960));
        assert_eq!(c.model_load_timeout_secs, 20);
        assert_eq!(c.frame_interval_ms, 33);
        assert_eq!(c.reference_date, None);
        assert_eq!(c.journey_options().clock, ClockSource::LocalToday);
        assert!(c.detector_model_path().ends_with("det_500m.onnx"));
        assert_eq!(c.assets().unwrap(), Assets::default());
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("VALENTINE_CAMERA_DEVICE", "/dev/video4"),
            ("VALENTINE_CAMERA_WIDTH", "640"),
            ("VALENTINE_MODEL_DIR", "/opt/models"),
            ("VALENTINE_DETECTOR_MODEL", "det_10g.onnx"),
            ("VALENTINE_REFERENCE_DATE", "2026-02-10"),
            ("VALENTINE_SEED", "7"),
            ("VALENTINE_VIEWPORT_WIDTH", "375"),
        ]);
        assert_eq!(c.capture_constraints().device.as_deref(), Some("/dev/video4"));
        assert_eq!(c.capture_constraints().ideal_width, 640);
        assert_eq!(c.detector_model_path(), PathBuf::from("/opt/models/det_10g.onnx"));
        let date: CalendarDate = "2026-02-10".parse().unwrap();
        assert_eq!(c.journey_options().clock, ClockSource::Fixed(date));
        assert_eq!(c.journey_options().seed, Some(7));
        assert!(c.viewport().is_mobile());
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let c = config(&[
            ("VALENTINE_CAMERA_WIDTH", "wide"),
            ("VALENTINE_FRAME_INTERVAL_MS", "0"),
            ("VALENTINE_REFERENCE_DATE", "Feb 10"),
            ("VALENTINE_CAMERA_DEVICE", ""),
        ]);
        assert_eq!(c.camera_width, 1280);
        assert_eq!(c.frame_interval_ms, 33);
        assert_eq!(c.reference_date, None);
        assert_eq!(c.camera_device, None);
    }

    #[test]
    fn test_session_options_durations() {
        let c = config(&[("VALENTINE_MODEL_LOAD_TIMEOUT_SECS", "3"), ("VALENTINE_FRAME_INTERVAL_MS", "50")]);
        let options = c.session_options();
        assert_eq!(options.model_load_timeout, Duration::from_secs(3));
        assert_eq!(options.frame_interval, Duration::from_millis(50));
    }
}
