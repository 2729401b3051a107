//! SCRFD face detector via ONNX Runtime.
//!
//! Letterboxes the RGB frame to the model input, decodes the three
//! anchor-free stride levels and suppresses overlapping boxes.

use crate::types::{FaceBox, FaceDetect, ModelLoader};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const SCRFD_INPUT_SIZE: usize = 640;
const SCRFD_MEAN: f32 = 127.5;
const SCRFD_STD: f32 = 128.0;
const SCRFD_CONFIDENCE_THRESHOLD: f32 = 0.5;
const SCRFD_NMS_THRESHOLD: f32 = 0.4;
const SCRFD_STRIDES: [usize; 3] = [8, 16, 32];
const SCRFD_ANCHORS_PER_CELL: usize = 2;
const SCRFD_MIN_OUTPUTS: usize = 6;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("model load timed out after {0:?}")]
    LoadTimedOut(Duration),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("frame is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    FrameSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Metadata for mapping letterboxed coordinates back to the frame.
struct LetterboxInfo {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

/// Output tensor indices for one stride: (score_idx, bbox_idx).
type StrideOutputIndices = (usize, usize);

/// SCRFD-based face detector.
pub struct FaceDetector {
    session: Session,
    input_height: usize,
    input_width: usize,
    /// Per-stride (score, bbox) output indices for strides [8, 16, 32].
    stride_indices: [StrideOutputIndices; 3],
}

impl FaceDetector {
    /// Load the SCRFD ONNX model from the given path.
    pub fn load(model_path: &Path) -> Result<Self, DetectorError> {
        if !model_path.exists() {
            return Err(DetectorError::ModelNotFound(model_path.display().to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();
        let num_outputs = output_names.len();

        tracing::info!(
            path = %model_path.display(),
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?output_names,
            "loaded SCRFD model"
        );

        if num_outputs < SCRFD_MIN_OUTPUTS {
            return Err(DetectorError::InferenceFailed(format!(
                "SCRFD model requires at least {SCRFD_MIN_OUTPUTS} outputs (3 strides × score/bbox), got {num_outputs}"
            )));
        }

        let stride_indices = discover_output_indices(&output_names);
        tracing::debug!(?stride_indices, "SCRFD output tensor mapping");

        Ok(Self {
            session,
            input_height: SCRFD_INPUT_SIZE,
            input_width: SCRFD_INPUT_SIZE,
            stride_indices,
        })
    }

    /// Letterbox an RGB24 frame into a normalized NCHW tensor.
    fn preprocess(&self, rgb: &[u8], width: usize, height: usize) -> (Array4<f32>, LetterboxInfo) {
        let letterbox = letterbox_for(width, height, self.input_width, self.input_height);
        let new_w = ((width as f32 * letterbox.scale).round() as usize).min(self.input_width);
        let new_h = ((height as f32 * letterbox.scale).round() as usize).min(self.input_height);
        let pad_x_start = letterbox.pad_x.floor() as usize;
        let pad_y_start = letterbox.pad_y.floor() as usize;

        let resized = resize_bilinear_rgb(rgb, width, height, new_w, new_h);

        // Padding stays at zero, which is SCRFD_MEAN after normalization.
        let mut tensor = Array4::<f32>::zeros((1, 3, self.input_height, self.input_width));
        for y in 0..new_h {
            let ty = y + pad_y_start;
            if ty >= self.input_height {
                break;
            }
            for x in 0..new_w {
                let tx = x + pad_x_start;
                if tx >= self.input_width {
                    break;
                }
                let src = (y * new_w + x) * 3;
                for c in 0..3 {
                    tensor[[0, c, ty, tx]] = (resized[src + c] as f32 - SCRFD_MEAN) / SCRFD_STD;
                }
            }
        }

        (tensor, letterbox)
    }
}

impl FaceDetect for FaceDetector {
    fn detect(&mut self, rgb: &[u8], width: u32, height: u32) -> Result<Vec<FaceBox>, DetectorError> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected || width == 0 || height == 0 {
            return Err(DetectorError::FrameSize {
                width,
                height,
                expected,
                actual: rgb.len(),
            });
        }

        let (input, letterbox) = self.preprocess(rgb, width as usize, height as usize);
        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut all_detections = Vec::new();
        for (stride_pos, &stride) in SCRFD_STRIDES.iter().enumerate() {
            let (score_idx, bbox_idx) = self.stride_indices[stride_pos];

            let (_, scores) = outputs[score_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("scores stride {stride}: {e}")))?;
            let (_, bboxes) = outputs[bbox_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("bboxes stride {stride}: {e}")))?;

            all_detections.extend(decode_stride(
                scores,
                bboxes,
                stride,
                self.input_width,
                self.input_height,
                &letterbox,
                SCRFD_CONFIDENCE_THRESHOLD,
            ));
        }

        Ok(nms(all_detections, SCRFD_NMS_THRESHOLD))
    }
}

/// Loads [`FaceDetector`] from an ONNX file.
#[derive(Debug, Clone)]
pub struct ScrfdLoader {
    pub path: PathBuf,
}

impl ScrfdLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for ScrfdLoader {
    fn load(&self) -> Result<Box<dyn FaceDetect>, DetectorError> {
        Ok(Box::new(FaceDetector::load(&self.path)?))
    }
}

fn letterbox_for(width: usize, height: usize, input_width: usize, input_height: usize) -> LetterboxInfo {
    let scale = (input_width as f32 / width as f32).min(input_height as f32 / height as f32);
    let new_w = (width as f32 * scale).round();
    let new_h = (height as f32 * scale).round();
    LetterboxInfo {
        scale,
        pad_x: ((input_width as f32 - new_w) / 2.0).max(0.0),
        pad_y: ((input_height as f32 - new_h) / 2.0).max(0.0),
    }
}

/// Bilinear resize of packed RGB24.
fn resize_bilinear_rgb(rgb: &[u8], width: usize, height: usize, new_w: usize, new_h: usize) -> Vec<u8> {
    let inv_scale_x = width as f32 / new_w.max(1) as f32;
    let inv_scale_y = height as f32 / new_h.max(1) as f32;
    let mut resized = vec![0u8; new_w * new_h * 3];

    for y in 0..new_h {
        let src_y = (y as f32 + 0.5) * inv_scale_y - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, height as i32 - 1) as usize;
        let y1 = (y0 + 1).min(height - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..new_w {
            let src_x = (x as f32 + 0.5) * inv_scale_x - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, width as i32 - 1) as usize;
            let x1 = (x0 + 1).min(width - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            for c in 0..3 {
                let tl = rgb[(y0 * width + x0) * 3 + c] as f32;
                let tr = rgb[(y0 * width + x1) * 3 + c] as f32;
                let bl = rgb[(y1 * width + x0) * 3 + c] as f32;
                let br = rgb[(y1 * width + x1) * 3 + c] as f32;

                let val = tl * (1.0 - fx) * (1.0 - fy)
                    + tr * fx * (1.0 - fy)
                    + bl * (1.0 - fx) * fy
                    + br * fx * fy;

                resized[(y * new_w + x) * 3 + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    resized
}

/// Map output tensors to stride slots by name ("score_8", "bbox_16", ...),
/// falling back to positional ordering [scores 8/16/32, bboxes 8/16/32].
fn discover_output_indices(names: &[String]) -> [StrideOutputIndices; 3] {
    let find = |prefix: &str, stride: usize| -> Option<usize> {
        let target = format!("{prefix}_{stride}");
        names.iter().position(|n| n == &target)
    };

    let mut named = [(0, 0); 3];
    for (slot, &stride) in SCRFD_STRIDES.iter().enumerate() {
        match (find("score", stride), find("bbox", stride)) {
            (Some(score), Some(bbox)) => named[slot] = (score, bbox),
            _ => {
                tracing::info!(
                    ?names,
                    "SCRFD: output names not recognized, using positional mapping [0-2]=scores, [3-5]=bboxes"
                );
                return [(0, 3), (1, 4), (2, 5)];
            }
        }
    }

    tracing::info!("SCRFD: using name-based output tensor mapping");
    named
}

/// Decode detections for a single stride level.
fn decode_stride(
    scores: &[f32],
    bboxes: &[f32],
    stride: usize,
    input_width: usize,
    input_height: usize,
    letterbox: &LetterboxInfo,
    threshold: f32,
) -> Vec<FaceBox> {
    let grid_w = input_width / stride;
    let num_anchors = (input_height / stride) * grid_w * SCRFD_ANCHORS_PER_CELL;
    let stride_f = stride as f32;

    let unmap_x = |x: f32| (x - letterbox.pad_x) / letterbox.scale;
    let unmap_y = |y: f32| (y - letterbox.pad_y) / letterbox.scale;

    let mut detections = Vec::new();
    for idx in 0..num_anchors {
        let score = scores.get(idx).copied().unwrap_or(0.0);
        if score <= threshold {
            continue;
        }

        let bbox_off = idx * 4;
        if bbox_off + 3 >= bboxes.len() {
            continue;
        }

        let anchor_idx = idx / SCRFD_ANCHORS_PER_CELL;
        let anchor_cx = (anchor_idx % grid_w) as f32 * stride_f;
        let anchor_cy = (anchor_idx / grid_w) as f32 * stride_f;

        // Distances to each edge, in stride units.
        let x1 = anchor_cx - bboxes[bbox_off] * stride_f;
        let y1 = anchor_cy - bboxes[bbox_off + 1] * stride_f;
        let x2 = anchor_cx + bboxes[bbox_off + 2] * stride_f;
        let y2 = anchor_cy + bboxes[bbox_off + 3] * stride_f;

        detections.push(FaceBox::new(
            (unmap_x(x1), unmap_y(y1)),
            (unmap_x(x2), unmap_y(y2)),
            score,
        ));
    }

    detections
}

/// Non-maximum suppression; the result is sorted by confidence, best first.
fn nms(mut detections: Vec<FaceBox>, iou_threshold: f32) -> Vec<FaceBox> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<FaceBox> = Vec::new();
    for candidate in detections {
        if keep.iter().all(|kept| iou(kept, &candidate) <= iou_threshold) {
            keep.push(candidate);
        }
    }
    keep
}

/// Intersection-over-union of two boxes.
fn iou(a: &FaceBox, b: &FaceBox) -> f32 {
    let x1 = a.top_left.0.max(b.top_left.0);
    let y1 = a.top_left.1.max(b.top_left.1);
    let x2 = a.bottom_right.0.min(b.bottom_right.0);
    let y2 = a.bottom_right.1.min(b.bottom_right.1);

    let inter_area = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union_area = a.area() + b.area() - inter_area;

    if union_area > 0.0 {
        inter_area / union_area
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x: f32, y: f32, w: f32, h: f32, conf: f32) -> FaceBox {
        FaceBox::new((x, y), (x + w, y + h), conf)
    }

    #[test]
    fn test_iou_identical() {
        let a = face(0.0, 0.0, 100.0, 100.0, 1.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = face(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = face(20.0, 20.0, 10.0, 10.0, 1.0);
        assert!(iou(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_iou_partial() {
        let a = face(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = face(5.0, 0.0, 10.0, 10.0, 1.0);
        // Overlap 5x10 = 50, union 100 + 100 - 50 = 150.
        assert!((iou(&a, &b) - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_nms_suppresses_overlapping_and_sorts() {
        let detections = vec![
            face(200.0, 200.0, 50.0, 50.0, 0.7),
            face(5.0, 5.0, 100.0, 100.0, 0.8),
            face(0.0, 0.0, 100.0, 100.0, 0.9),
        ];
        let result = nms(detections, SCRFD_NMS_THRESHOLD);
        assert_eq!(result.len(), 2);
        assert!((result[0].confidence - 0.9).abs() < 1e-6);
        assert!((result[1].confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_nms_empty() {
        assert!(nms(vec![], SCRFD_NMS_THRESHOLD).is_empty());
    }

    #[test]
    fn test_letterbox_landscape_pads_vertically() {
        let lb = letterbox_for(1280, 960, 640, 640);
        assert!((lb.scale - 0.5).abs() < 1e-6);
        assert_eq!(lb.pad_x, 0.0);
        assert!((lb.pad_y - 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_maps_back_to_frame_space() {
        // 1280x960 frame: scale 0.5, pad_y 80.
        let lb = letterbox_for(1280, 960, 640, 640);
        let stride = 32;
        let grid_w = 640 / stride;
        let anchors = grid_w * grid_w * SCRFD_ANCHORS_PER_CELL;

        // Anchor cell (x=5, y=6) -> letterboxed centre (160, 192).
        let idx = (6 * grid_w + 5) * SCRFD_ANCHORS_PER_CELL;
        let mut scores = vec![0.0; anchors];
        scores[idx] = 0.95;
        let mut bboxes = vec![0.0; anchors * 4];
        bboxes[idx * 4..idx * 4 + 4].copy_from_slice(&[1.0, 1.0, 1.0, 2.0]);

        let dets = decode_stride(&scores, &bboxes, stride, 640, 640, &lb, SCRFD_CONFIDENCE_THRESHOLD);
        assert_eq!(dets.len(), 1);
        let d = dets[0];
        // x: (160 - 32) / 0.5 = 256, (160 + 32) / 0.5 = 384
        assert!((d.top_left.0 - 256.0).abs() < 1e-3);
        assert!((d.bottom_right.0 - 384.0).abs() < 1e-3);
        // y: (192 - 32 - 80) / 0.5 = 160, (192 + 64 - 80) / 0.5 = 352
        assert!((d.top_left.1 - 160.0).abs() < 1e-3);
        assert!((d.bottom_right.1 - 352.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_skips_low_scores() {
        let lb = letterbox_for(640, 640, 640, 640);
        let anchors = 20 * 20 * SCRFD_ANCHORS_PER_CELL;
        let scores = vec![0.5; anchors];
        let bboxes = vec![1.0; anchors * 4];
        assert!(decode_stride(&scores, &bboxes, 32, 640, 640, &lb, 0.5).is_empty());
    }

    #[test]
    fn test_discover_output_indices_named() {
        let names: Vec<String> = [
            "score_8", "score_16", "score_32",
            "bbox_8", "bbox_16", "bbox_32",
            "kps_8", "kps_16", "kps_32",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(discover_output_indices(&names), [(0, 3), (1, 4), (2, 5)]);
    }

    #[test]
    fn test_discover_output_indices_shuffled_named() {
        let names: Vec<String> = [
            "bbox_8", "kps_8", "score_8",
            "bbox_16", "kps_16", "score_16",
            "bbox_32", "kps_32", "score_32",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(discover_output_indices(&names), [(2, 0), (5, 3), (8, 6)]);
    }

    #[test]
    fn test_discover_output_indices_positional_fallback() {
        let names: Vec<String> = (0..9).map(|i: usize| i.to_string()).collect();
        assert_eq!(discover_output_indices(&names), [(0, 3), (1, 4), (2, 5)]);
    }

    #[test]
    fn test_resize_keeps_uniform_color() {
        let rgb: Vec<u8> = [10u8, 120, 250].repeat(8 * 6);
        let resized = resize_bilinear_rgb(&rgb, 8, 6, 16, 12);
        assert_eq!(resized.len(), 16 * 12 * 3);
        assert!(resized.chunks_exact(3).all(|p| p == [10, 120, 250]));
    }

    #[test]
    fn test_missing_model_is_reported() {
        let loader = ScrfdLoader::new("/nonexistent/det_500m.onnx");
        assert!(matches!(loader.load(), Err(DetectorError::ModelNotFound(_))));
    }
}
