//! V4L2 camera capture via the `v4l` crate.

use crate::frame::{self, Frame, FrameError};
use std::path::Path;
use thiserror::Error;
use v4l::buffer::Type as BufType;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

/// Number of V4L2 device nodes probed when no device is configured.
const MAX_PROBED_DEVICES: u32 = 16;
const STREAM_BUFFERS: u32 = 4;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("device busy")]
    DeviceBusy,
    #[error("format negotiation failed: {0}")]
    FormatNegotiationFailed(String),
    #[error("streaming not supported")]
    StreamingNotSupported,
    #[error("camera already stopped")]
    Stopped,
}

/// What the caller asks of the camera. The resolution is a hint; the
/// driver may negotiate something else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConstraints {
    /// Device node to open; `None` picks the first capture device, which on
    /// laptops is the integrated user-facing camera.
    pub device: Option<String>,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            device: None,
            ideal_width: 1280,
            ideal_height: 960,
        }
    }
}

/// A live stream of frames.
pub trait VideoSource: Send {
    /// Negotiated resolution.
    fn resolution(&self) -> (u32, u32);

    /// Wait for the next frame. `Ok(None)` means the stream produced a buffer
    /// that is not a complete frame yet.
    fn read_frame(&mut self) -> Result<Option<Frame>, CameraError>;

    /// Stop streaming and release the device. Safe to call repeatedly.
    fn stop(&mut self);
}

/// Something that can hand out a [`VideoSource`].
pub trait CaptureDevice: Send + Sync {
    fn acquire(&self, constraints: &CaptureConstraints) -> Result<Box<dyn VideoSource>, CameraError>;
}

/// Info about a discovered V4L2 device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
    pub driver: String,
    pub bus: String,
}

/// Negotiated pixel format for the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// YUYV 4:2:2 packed (2 bytes/pixel).
    Yuyv,
    /// Motion JPEG, one JPEG image per buffer.
    Mjpg,
    /// Packed 24-bit RGB.
    Rgb3,
    /// 8-bit grayscale.
    Grey,
}

impl PixelFormat {
    fn from_fourcc(fourcc: FourCC) -> Option<Self> {
        match &fourcc.repr {
            b"YUYV" => Some(PixelFormat::Yuyv),
            b"MJPG" => Some(PixelFormat::Mjpg),
            b"RGB3" => Some(PixelFormat::Rgb3),
            b"GREY" => Some(PixelFormat::Grey),
            _ => None,
        }
    }

    /// Convert one raw buffer in this format to RGB24.
    pub fn to_rgb(self, buf: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
        match self {
            PixelFormat::Yuyv => frame::yuyv_to_rgb(buf, width, height),
            PixelFormat::Mjpg => frame::mjpeg_to_rgb(buf, width, height),
            PixelFormat::Rgb3 => frame::rgb3_to_rgb(buf, width, height),
            PixelFormat::Grey => frame::grey_to_rgb(buf, width, height),
        }
    }
}

/// V4L2 camera device handle with an open capture stream.
pub struct Camera {
    /// Dropping the stream issues STREAMOFF and unmaps the buffers.
    stream: Option<MmapStream<'static>>,
    device: Option<Device>,
    pub width: u32,
    pub height: u32,
    pub device_path: String,
    pub fourcc: FourCC,
    pixel_format: PixelFormat,
}

impl Camera {
    /// Open a camera, negotiate a format near the requested resolution and
    /// start streaming.
    pub fn open(constraints: &CaptureConstraints) -> Result<Self, CameraError> {
        let device_path = match &constraints.device {
            Some(path) => path.clone(),
            None => Self::list_devices()
                .into_iter()
                .next()
                .map(|d| d.path)
                .ok_or_else(|| CameraError::DeviceNotFound("no video capture device".into()))?,
        };

        if !Path::new(&device_path).exists() {
            return Err(CameraError::DeviceNotFound(device_path));
        }

        let device = Device::with_path(&device_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => CameraError::PermissionDenied(format!("{device_path}: {e}")),
            _ if e.to_string().contains("busy") || e.to_string().contains("EBUSY") => CameraError::DeviceBusy,
            _ => CameraError::DeviceNotFound(format!("{device_path}: {e}")),
        })?;

        let caps = device.query_caps().map_err(|e| {
            CameraError::CaptureFailed(format!("failed to query capabilities: {e}"))
        })?;

        tracing::info!(
            device = %device_path,
            driver = %caps.driver,
            card = %caps.card,
            "opened camera"
        );

        if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
            return Err(CameraError::StreamingNotSupported);
        }

        // Ask for YUYV at the ideal size; accept whatever supported format
        // and size the driver negotiates instead.
        let mut fmt = device.format().map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to get format: {e}"))
        })?;
        fmt.fourcc = FourCC::new(b"YUYV");
        fmt.width = constraints.ideal_width;
        fmt.height = constraints.ideal_height;

        let negotiated = device.set_format(&fmt).map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
        })?;

        let fourcc = negotiated.fourcc;
        let pixel_format = PixelFormat::from_fourcc(fourcc).ok_or_else(|| {
            CameraError::FormatNegotiationFailed(format!(
                "unsupported pixel format: {fourcc:?} (need YUYV, MJPG, RGB3 or GREY)"
            ))
        })?;

        tracing::info!(
            width = negotiated.width,
            height = negotiated.height,
            requested_width = constraints.ideal_width,
            requested_height = constraints.ideal_height,
            fourcc = ?fourcc,
            "negotiated format"
        );

        let stream = MmapStream::with_buffers(&device, BufType::VideoCapture, STREAM_BUFFERS)
            .map_err(|e| CameraError::CaptureFailed(format!("failed to create mmap stream: {e}")))?;

        Ok(Self {
            stream: Some(stream),
            device: Some(device),
            width: negotiated.width,
            height: negotiated.height,
            device_path,
            fourcc,
            pixel_format,
        })
    }

    /// List available V4L2 video capture devices.
    pub fn list_devices() -> Vec<DeviceInfo> {
        let mut devices = Vec::new();

        for i in 0..MAX_PROBED_DEVICES {
            let path = format!("/dev/video{i}");
            if !Path::new(&path).exists() {
                continue;
            }
            let Ok(dev) = Device::with_path(&path) else {
                continue;
            };
            let Ok(caps) = dev.query_caps() else {
                continue;
            };
            if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
                continue;
            }
            devices.push(DeviceInfo {
                path,
                name: caps.card.clone(),
                driver: caps.driver.clone(),
                bus: caps.bus.clone(),
            });
        }

        devices
    }
}

impl VideoSource for Camera {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::Stopped)?;
        let (buf, meta) = stream
            .next()
            .map_err(|e| CameraError::CaptureFailed(format!("failed to dequeue buffer: {e}")))?;

        let rgb = match self.pixel_format.to_rgb(buf, self.width, self.height) {
            Ok(rgb) => rgb,
            Err(e) => {
                tracing::debug!(seq = meta.sequence, error = %e, "incomplete frame");
                return Ok(None);
            }
        };

        Frame::new(rgb, self.width, self.height, meta.sequence)
            .map(Some)
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::info!(device = %self.device_path, "camera stopped");
        }
        self.device = None;
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The system's V4L2 cameras.
#[derive(Debug, Clone, Copy, Default)]
pub struct V4lCapture;

impl CaptureDevice for V4lCapture {
    fn acquire(&self, constraints: &CaptureConstraints) -> Result<Box<dyn VideoSource>, CameraError> {
        Ok(Box::new(Camera::open(constraints)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_from_fourcc() {
        assert_eq!(PixelFormat::from_fourcc(FourCC::new(b"YUYV")), Some(PixelFormat::Yuyv));
        assert_eq!(PixelFormat::from_fourcc(FourCC::new(b"MJPG")), Some(PixelFormat::Mjpg));
        assert_eq!(PixelFormat::from_fourcc(FourCC::new(b"GREY")), Some(PixelFormat::Grey));
        assert_eq!(PixelFormat::from_fourcc(FourCC::new(b"NV12")), None);
    }

    #[test]
    fn test_pixel_format_dispatch() {
        let rgb = PixelFormat::Grey.to_rgb(&[7, 9], 2, 1).unwrap();
        assert_eq!(rgb, vec![7, 7, 7, 9, 9, 9]);
        assert!(PixelFormat::Yuyv.to_rgb(&[0; 3], 2, 1).is_err());
    }

    #[test]
    fn test_missing_device_is_reported() {
        let constraints = CaptureConstraints {
            device: Some("/dev/does-not-exist-video".into()),
            ..CaptureConstraints::default()
        };
        assert!(matches!(
            V4lCapture.acquire(&constraints),
            Err(CameraError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_default_constraints_are_a_hint_for_1280x960() {
        let c = CaptureConstraints::default();
        assert_eq!((c.ideal_width, c.ideal_height), (1280, 960));
        assert!(c.device.is_none());
    }
}
