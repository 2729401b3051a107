//! Frame type and pixel conversion — YUYV, MJPG, GREY and RGB3 to RGB24.

/// A captured RGB24 camera frame.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB pixel data (width * height * 3 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u32) -> Result<Self, FrameError> {
        let expected = rgb_len(width, height);
        if data.len() != expected {
            return Err(FrameError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp: std::time::Instant::now(),
            sequence,
        })
    }
}

fn rgb_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

/// Clamp-convert one BT.601 YCbCr sample to RGB.
fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as f32;
    let cb = cb as f32 - 128.0;
    let cr = cr as f32 - 128.0;
    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;
    [
        r.round().clamp(0.0, 255.0) as u8,
        g.round().clamp(0.0, 255.0) as u8,
        b.round().clamp(0.0, 255.0) as u8,
    ]
}

/// Convert packed YUYV (4:2:2) to RGB24.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]; both pixels share
/// the chroma pair.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = width as usize * height as usize * 2;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }
    let mut rgb = Vec::with_capacity(rgb_len(width, height));
    for quad in yuyv[..expected].chunks_exact(4) {
        let (y0, u, y1, v) = (quad[0], quad[1], quad[2], quad[3]);
        rgb.extend_from_slice(&ycbcr_to_rgb(y0, u, v));
        rgb.extend_from_slice(&ycbcr_to_rgb(y1, u, v));
    }
    Ok(rgb)
}

/// Expand 8-bit grayscale to RGB24.
pub fn grey_to_rgb(grey: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let pixels = width as usize * height as usize;
    if grey.len() < pixels {
        return Err(FrameError::InvalidLength {
            expected: pixels,
            actual: grey.len(),
        });
    }
    Ok(grey[..pixels].iter().flat_map(|&p| [p, p, p]).collect())
}

/// Copy a packed RGB3 buffer, trimming driver padding.
pub fn rgb3_to_rgb(buf: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = rgb_len(width, height);
    if buf.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: buf.len(),
        });
    }
    Ok(buf[..expected].to_vec())
}

/// Decode one motion-JPEG frame to RGB24, checking it matches the
/// negotiated resolution.
pub fn mjpeg_to_rgb(jpeg: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let decoded = image::load_from_memory_with_format(jpeg, image::ImageFormat::Jpeg)
        .map_err(|e| FrameError::Decode(e.to_string()))?
        .to_rgb8();
    if decoded.dimensions() != (width, height) {
        return Err(FrameError::UnexpectedSize {
            expected: (width, height),
            actual: decoded.dimensions(),
        });
    }
    Ok(decoded.into_raw())
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid buffer length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("frame decode failed: {0}")]
    Decode(String),
    #[error("decoded frame is {actual:?}, expected {expected:?}")]
    UnexpectedSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}
