//! Pose detector configuration and the ONNX Runtime backed implementation.
//!
//! The detector is an opaque external collaborator: this module configures
//! it, runs it once per image, and unpacks the returned tensor into
//! [`Detection`] values. Pose estimation itself happens inside the model.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{OverlayError, Result};
use crate::keypoint::{Detection, Keypoint, Part, Pose};

/// Values per detected person in the multi-pose output tensor:
/// 17 x (y, x, score) + 4 box coordinates + 1 pose score.
const PERSON_STRIDE: usize = Part::COUNT * 3 + 5;

/// Position of the pose score inside a person slice.
const POSE_SCORE_INDEX: usize = PERSON_STRIDE - 1;

/// Network architecture preset.
///
/// Both variants are first-class; the choice is made at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// Lightweight architecture tuned for lower-end hardware.
    MobileNetV1,
    /// Heavier architecture with higher accuracy at lower input resolution.
    ResNet50,
}

impl Architecture {
    /// Returns the canonical configuration preset for this architecture.
    #[must_use]
    pub const fn preset(self) -> DetectorConfig {
        match self {
            Self::MobileNetV1 => DetectorConfig {
                architecture: self,
                output_stride: 16,
                input_resolution: 500,
                multiplier: 0.75,
                quant_bytes: 2,
            },
            Self::ResNet50 => DetectorConfig {
                architecture: self,
                output_stride: 32,
                input_resolution: 250,
                multiplier: 1.0,
                quant_bytes: 2,
            },
        }
    }

    /// Short name used in model file names and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MobileNetV1 => "mobilenet",
            Self::ResNet50 => "resnet50",
        }
    }
}

/// Immutable detector configuration, fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Network architecture.
    pub architecture: Architecture,
    /// Output stride of the backbone.
    pub output_stride: u32,
    /// Square input resolution the image is resized to.
    pub input_resolution: u32,
    /// Depth multiplier of the backbone.
    pub multiplier: f32,
    /// Weight quantization byte-width.
    pub quant_bytes: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Architecture::MobileNetV1.preset()
    }
}

impl DetectorConfig {
    /// Configuration preset for an architecture.
    #[must_use]
    pub const fn new(architecture: Architecture) -> Self {
        architecture.preset()
    }

    /// Override the input resolution.
    #[must_use]
    pub const fn with_input_resolution(mut self, resolution: u32) -> Self {
        self.input_resolution = resolution;
        self
    }

    /// Override the output stride.
    #[must_use]
    pub const fn with_output_stride(mut self, stride: u32) -> Self {
        self.output_stride = stride;
        self
    }

    /// Model variant slug, e.g. `mobilenet-0.75-s16-q2`.
    #[must_use]
    pub fn model_slug(&self) -> String {
        format!(
            "{}-{}-s{}-q{}",
            self.architecture.as_str(),
            self.multiplier,
            self.output_stride,
            self.quant_bytes
        )
    }
}

/// Options for a single estimation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateOptions {
    /// Mirror keypoint x coordinates, for camera-style mirrored input.
    pub flip_horizontal: bool,
    /// Maximum number of poses returned.
    pub max_detections: usize,
    /// Poses scoring below this are dropped at decode time.
    pub score_threshold: f32,
    /// Non-max-suppression radius in pixels between pose centers.
    pub nms_radius: f32,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            flip_horizontal: false,
            max_detections: 5,
            score_threshold: 0.1,
            nms_radius: 30.0,
        }
    }
}

impl EstimateOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal-flip flag.
    #[must_use]
    pub const fn with_flip_horizontal(mut self, flip: bool) -> Self {
        self.flip_horizontal = flip;
        self
    }

    /// Set the maximum number of poses returned.
    #[must_use]
    pub const fn with_max_detections(mut self, max: usize) -> Self {
        self.max_detections = max;
        self
    }

    /// Set the decode-time score threshold.
    #[must_use]
    pub const fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the non-max-suppression radius.
    #[must_use]
    pub const fn with_nms_radius(mut self, radius: f32) -> Self {
        self.nms_radius = radius;
        self
    }
}

/// Pose detector handle, injected into the pipeline as a dependency.
pub trait PoseDetector {
    /// Run one estimation pass over an image.
    ///
    /// Returns poses ordered by descending score.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails; there is no retry.
    fn estimate(&mut self, image: &DynamicImage, options: &EstimateOptions) -> Result<Detection>;
}

/// Detector backed by an ONNX Runtime session running a multi-pose model.
pub struct OnnxPoseDetector {
    session: Session,
    input_name: String,
    output_name: String,
    config: DetectorConfig,
}

impl OnnxPoseDetector {
    /// Asynchronously load the model and initialize the runtime session.
    ///
    /// Session construction is blocking work, so it runs on the blocking
    /// thread pool; everything downstream of the pipeline awaits this single
    /// suspension point.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file is missing or the session cannot
    /// be created.
    pub async fn load<P: AsRef<Path>>(path: P, config: DetectorConfig) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(OverlayError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = tokio::task::spawn_blocking(move || -> Result<Session> {
            Session::builder()
                .map_err(|e| {
                    OverlayError::ModelLoadError(format!("Failed to create session builder: {e}"))
                })?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| {
                    OverlayError::ModelLoadError(format!("Failed to set optimization level: {e}"))
                })?
                .commit_from_file(&path)
                .map_err(|e| OverlayError::ModelLoadError(format!("Failed to load model: {e}")))
        })
        .await
        .map_err(|e| OverlayError::ModelLoadError(format!("Model load task failed: {e}")))??;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "output_0".to_string());

        Ok(Self {
            session,
            input_name,
            output_name,
            config,
        })
    }

    /// The configuration this detector was constructed with.
    #[must_use]
    pub const fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Resize to the configured square input resolution and lay out as an
    /// NHWC f32 tensor with 0..255 values.
    fn preprocess(&self, image: &DynamicImage) -> Array4<f32> {
        let res = self.config.input_resolution;
        let resized = image
            .resize_exact(res, res, FilterType::Triangle)
            .to_rgb8();

        let mut input = Array4::<f32>::zeros((1, res as usize, res as usize, 3));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                input[[0, y as usize, x as usize, c]] = f32::from(pixel[c]);
            }
        }
        input
    }
}

impl PoseDetector for OnnxPoseDetector {
    fn estimate(&mut self, image: &DynamicImage, options: &EstimateOptions) -> Result<Detection> {
        let input = self.preprocess(image);
        let input_tensor = Tensor::from_array(input)
            .map_err(|e| OverlayError::EstimationError(format!("Failed to build input: {e}")))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| OverlayError::EstimationError(format!("Inference failed: {e}")))?;

        let output: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .map_err(|e| {
                OverlayError::EstimationError(format!("Failed to extract output tensor: {e}"))
            })?;

        decode_multipose(&output, (image.width(), image.height()), options)
    }
}

/// Unpack a `[1, N, 56]` multi-pose output tensor into pixel-space poses.
///
/// Coordinates arrive normalized as `(y, x, score)` triples per part followed
/// by a box and the pose score. Poses below the score threshold are dropped,
/// overlapping poses are suppressed within the NMS radius, and the result is
/// capped at `max_detections`, ordered by descending score.
pub fn decode_multipose(
    output: &ndarray::ArrayViewD<f32>,
    image_size: (u32, u32),
    options: &EstimateOptions,
) -> Result<Detection> {
    let shape = output.shape();
    if shape.len() != 3 || shape[0] == 0 || shape[2] != PERSON_STRIDE {
        return Err(OverlayError::EstimationError(format!(
            "Unexpected output shape {shape:?}, expected [1, N, {PERSON_STRIDE}]"
        )));
    }

    let (width, height) = (image_size.0 as f32, image_size.1 as f32);
    let mut poses = Vec::new();

    for p in 0..shape[1] {
        let score = output[[0, p, POSE_SCORE_INDEX]];
        if score < options.score_threshold {
            continue;
        }

        let keypoints = Part::ALL
            .iter()
            .enumerate()
            .map(|(k, &part)| {
                let y = output[[0, p, 3 * k]];
                let x = output[[0, p, 3 * k + 1]];
                let kp_score = output[[0, p, 3 * k + 2]];
                let x_px = if options.flip_horizontal {
                    (1.0 - x) * width
                } else {
                    x * width
                };
                Keypoint::new(part, x_px, y * height, kp_score)
            })
            .collect();

        poses.push(Pose::new(score, keypoints));
    }

    poses.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut poses = suppress_overlapping(poses, options.nms_radius);
    poses.truncate(options.max_detections);
    Ok(Detection::new(poses))
}

/// Greedy non-max suppression over pose centers.
///
/// Input must be sorted by descending score; a pose is dropped when its
/// center lies within `radius` pixels of an already kept pose.
fn suppress_overlapping(poses: Vec<Pose>, radius: f32) -> Vec<Pose> {
    let mut kept: Vec<Pose> = Vec::with_capacity(poses.len());
    for pose in poses {
        let (cx, cy) = pose.center();
        let overlaps = kept.iter().any(|k| {
            let (kx, ky) = k.center();
            (cx - kx).hypot(cy - ky) < radius
        });
        if !overlaps {
            kept.push(pose);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Build a `[1, n, 56]` tensor with each pose's keypoints at a uniform
    /// normalized position.
    fn synthetic_output(entries: &[(f32, f32, f32)]) -> Array3<f32> {
        let mut out = Array3::<f32>::zeros((1, entries.len(), PERSON_STRIDE));
        for (p, &(x, y, score)) in entries.iter().enumerate() {
            for k in 0..Part::COUNT {
                out[[0, p, 3 * k]] = y;
                out[[0, p, 3 * k + 1]] = x;
                out[[0, p, 3 * k + 2]] = 0.9;
            }
            out[[0, p, POSE_SCORE_INDEX]] = score;
        }
        out
    }

    #[test]
    fn test_decode_scales_to_pixels() {
        let out = synthetic_output(&[(0.25, 0.5, 0.8)]);
        let out = out.into_dyn();
        let detection =
            decode_multipose(&out.view(), (640, 480), &EstimateOptions::default()).unwrap();

        assert_eq!(detection.len(), 1);
        let nose = detection.poses[0].get(Part::Nose);
        assert!((nose.x - 160.0).abs() < 1e-3);
        assert!((nose.y - 240.0).abs() < 1e-3);
        assert!((detection.poses[0].score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_decode_flip_horizontal() {
        let out = synthetic_output(&[(0.25, 0.5, 0.8)]);
        let out = out.into_dyn();
        let options = EstimateOptions::default().with_flip_horizontal(true);
        let detection = decode_multipose(&out.view(), (640, 480), &options).unwrap();

        let nose = detection.poses[0].get(Part::Nose);
        assert!((nose.x - 480.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_drops_below_threshold() {
        let out = synthetic_output(&[(0.2, 0.2, 0.8), (0.8, 0.8, 0.05)]);
        let out = out.into_dyn();
        let detection =
            decode_multipose(&out.view(), (100, 100), &EstimateOptions::default()).unwrap();
        assert_eq!(detection.len(), 1);
    }

    #[test]
    fn test_decode_orders_by_score() {
        let out = synthetic_output(&[(0.2, 0.2, 0.3), (0.8, 0.8, 0.9)]);
        let out = out.into_dyn();
        let detection =
            decode_multipose(&out.view(), (100, 100), &EstimateOptions::default()).unwrap();
        assert!(detection.poses[0].score > detection.poses[1].score);
    }

    #[test]
    fn test_decode_rejects_bad_shape() {
        let out = Array3::<f32>::zeros((1, 2, 10)).into_dyn();
        let result = decode_multipose(&out.view(), (100, 100), &EstimateOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_empty_batch() {
        let out = Array3::<f32>::zeros((0, 2, PERSON_STRIDE)).into_dyn();
        let result = decode_multipose(&out.view(), (100, 100), &EstimateOptions::default());
        assert!(matches!(result, Err(OverlayError::EstimationError(_))));
    }

    #[test]
    fn test_nms_suppresses_nearby_pose() {
        // Two poses 14px apart at 100x100 resolution, one far away.
        let out = synthetic_output(&[(0.2, 0.2, 0.9), (0.3, 0.3, 0.5), (0.8, 0.8, 0.7)]);
        let out = out.into_dyn();
        let options = EstimateOptions::default().with_nms_radius(30.0);
        let detection = decode_multipose(&out.view(), (100, 100), &options).unwrap();

        assert_eq!(detection.len(), 2);
        assert!((detection.poses[0].score - 0.9).abs() < f32::EPSILON);
        assert!((detection.poses[1].score - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_max_detections_cap() {
        let out = synthetic_output(&[
            (0.1, 0.1, 0.9),
            (0.5, 0.5, 0.8),
            (0.9, 0.9, 0.7),
        ]);
        let out = out.into_dyn();
        let options = EstimateOptions::default().with_max_detections(2);
        let detection = decode_multipose(&out.view(), (1000, 1000), &options).unwrap();
        assert_eq!(detection.len(), 2);
    }

    #[test]
    fn test_architecture_presets() {
        let mobilenet = Architecture::MobileNetV1.preset();
        assert_eq!(mobilenet.output_stride, 16);
        assert_eq!(mobilenet.input_resolution, 500);
        assert!((mobilenet.multiplier - 0.75).abs() < f32::EPSILON);

        let resnet = Architecture::ResNet50.preset();
        assert_eq!(resnet.output_stride, 32);
        assert_eq!(resnet.input_resolution, 250);
        assert!((resnet.multiplier - 1.0).abs() < f32::EPSILON);

        assert_eq!(mobilenet.model_slug(), "mobilenet-0.75-s16-q2");
    }

    #[test]
    fn test_estimate_options_builder() {
        let options = EstimateOptions::new()
            .with_flip_horizontal(true)
            .with_max_detections(3)
            .with_score_threshold(0.2)
            .with_nms_radius(15.0);

        assert!(options.flip_horizontal);
        assert_eq!(options.max_detections, 3);
        assert!((options.score_threshold - 0.2).abs() < f32::EPSILON);
        assert!((options.nms_radius - 15.0).abs() < f32::EPSILON);
    }
}
