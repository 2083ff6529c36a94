//! Comparison orchestrator: one detector pass, one composed overlay frame.
//!
//! The pipeline moves through three states: uninitialized, ready (detector
//! load resolved), rendered (detection resolved and composed). Detector
//! loading is the single asynchronous suspension point; everything after it
//! runs sequentially in the continuation. There are no retries: any failure
//! propagates to the caller and halts the pass.

use std::path::Path;

use image::{DynamicImage, RgbaImage};

use crate::detector::{DetectorConfig, EstimateOptions, OnnxPoseDetector, PoseDetector};
use crate::error::{OverlayError, Result};
use crate::geometry::blit_scaled;
use crate::instructor::{instructor_pose, INSTRUCTOR_CANVAS_SIZE};
use crate::keypoint::Detection;
use crate::render::{self, ImageSurface, OverlaySettings};
use crate::verbose;

/// Placement of the pre-rendered instructor layer on the output surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstructorOverlay {
    /// Selector into the instructor pose table.
    pub index: usize,
    /// Downscale divisor applied to instructor-canvas coordinates.
    pub scale: f32,
    /// Placement offset `(dx, dy)` on the destination surface.
    pub offset: (i64, i64),
}

impl Default for InstructorOverlay {
    fn default() -> Self {
        Self {
            index: 2,
            scale: 3.0,
            offset: (10, -40),
        }
    }
}

/// Immutable pipeline configuration, fixed at construction time.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Detector architecture preset.
    pub detector: DetectorConfig,
    /// Options for the single estimation pass.
    pub estimate: EstimateOptions,
    /// Pose-level confidence threshold applied before rendering a pose.
    pub min_pose_confidence: f32,
    /// Part-level confidence threshold applied per keypoint.
    pub min_part_confidence: f32,
    /// Which overlay elements to draw for detected poses.
    pub overlay: OverlaySettings,
    /// Instructor layer placement.
    pub instructor: InstructorOverlay,
    /// Whether the instructor layer is composited. Toggling only affects
    /// future compose calls; an already-rendered frame is not touched.
    pub show_instructor: bool,
    /// Stem of the output artifact, e.g. `output` -> `output.png`.
    pub output_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::mirrored()
    }
}

impl PipelineConfig {
    /// Preset for mirrored (selfie-style) input: keypoint x coordinates are
    /// flipped so the overlay matches what the subject sees.
    #[must_use]
    pub fn mirrored() -> Self {
        Self {
            detector: DetectorConfig::default(),
            estimate: EstimateOptions::default()
                .with_flip_horizontal(true)
                .with_max_detections(5)
                .with_score_threshold(0.1)
                .with_nms_radius(30.0),
            min_pose_confidence: 0.15,
            min_part_confidence: 0.1,
            overlay: OverlaySettings::default(),
            instructor: InstructorOverlay::default(),
            show_instructor: true,
            output_name: "output".to_string(),
        }
    }

    /// Preset for unmirrored input, identical except for the flip flag and
    /// the output name.
    #[must_use]
    pub fn unmirrored() -> Self {
        let mirrored = Self::mirrored();
        Self {
            estimate: mirrored.estimate.with_flip_horizontal(false),
            output_name: "output-raw".to_string(),
            ..mirrored
        }
    }
}

/// One-shot comparison pipeline.
///
/// Holds an injected detector handle and a pre-rendered instructor layer;
/// [`ComparePipeline::compose`] runs one detection pass and produces the
/// final frame.
pub struct ComparePipeline {
    config: PipelineConfig,
    detector: Box<dyn PoseDetector>,
    instructor_layer: Option<RgbaImage>,
}

impl ComparePipeline {
    /// Build a pipeline around an already-loaded detector.
    ///
    /// The instructor layer is rendered once here, at the configured scale;
    /// composing only blits it.
    ///
    /// # Errors
    ///
    /// Returns a config error when the instructor index is out of range or
    /// the instructor scale is degenerate.
    pub fn new(detector: Box<dyn PoseDetector>, config: PipelineConfig) -> Result<Self> {
        if config.instructor.scale <= 0.0 {
            return Err(OverlayError::ConfigError(format!(
                "Invalid instructor scale {}",
                config.instructor.scale
            )));
        }
        let pose = instructor_pose(config.instructor.index).ok_or_else(|| {
            OverlayError::ConfigError(format!(
                "Instructor pose index {} out of range",
                config.instructor.index
            ))
        })?;

        let (src_w, src_h) = INSTRUCTOR_CANVAS_SIZE;
        let scale = 1.0 / config.instructor.scale;
        let size = (
            (src_w as f32 * scale).ceil() as u32,
            (src_h as f32 * scale).ceil() as u32,
        );
        let instructor_layer = Some(render::render_instructor(
            pose,
            config.min_part_confidence,
            size,
            scale,
        ));

        Ok(Self {
            config,
            detector,
            instructor_layer,
        })
    }

    /// Whether the instructor layer is currently composited.
    #[must_use]
    pub const fn show_instructor(&self) -> bool {
        self.config.show_instructor
    }

    /// Toggle the instructor layer for future compose calls.
    ///
    /// An already-composed frame is unaffected; callers redraw to reflect
    /// the change.
    pub fn set_show_instructor(&mut self, show: bool) {
        self.config.show_instructor = show;
    }

    /// The pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one detection pass over `image` and compose the overlay frame.
    ///
    /// # Errors
    ///
    /// Propagates detector failures; there is no recovery path.
    pub fn compose(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        let detection = self.detector.estimate(image, &self.config.estimate)?;
        verbose!("Detected {}", detection.verbose());
        Ok(self.render_frame(image, &detection))
    }

    /// Compose a frame from an existing detection, in fixed order: base
    /// image, optional instructor layer, detected overlays.
    #[must_use]
    pub fn render_frame(&self, image: &DynamicImage, detection: &Detection) -> RgbaImage {
        let (width, height) = (image.width(), image.height());
        let base = image.to_rgba8();

        let mut surface = if self.config.overlay.show_bounding_box {
            ImageSurface::from_image(RgbaImage::new(width, height)).with_font()
        } else {
            ImageSurface::from_image(RgbaImage::new(width, height))
        };

        blit_scaled(&base, surface.image_mut(), (0, 0), (width, height));

        if self.config.show_instructor {
            if let Some(ref layer) = self.instructor_layer {
                blit_scaled(
                    layer,
                    surface.image_mut(),
                    self.config.instructor.offset,
                    layer.dimensions(),
                );
            }
        }

        render::draw_detection(
            &detection.poses,
            self.config.min_pose_confidence,
            self.config.min_part_confidence,
            &self.config.overlay,
            &mut surface,
        );

        surface.into_image()
    }

    /// One-shot run: load the detector, estimate once, compose the frame.
    ///
    /// The `await` on the detector load is the single suspension point of
    /// the whole pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first failure of image loading, detector loading, or
    /// estimation; all are terminal for the pass.
    pub async fn run<P: AsRef<Path>>(
        model_path: P,
        image_path: P,
        config: PipelineConfig,
    ) -> Result<RgbaImage> {
        // Startup precondition: the input photograph must exist.
        let image = crate::utils::load_image(image_path.as_ref())?;
        verbose!(
            "Loaded input image {} ({}x{})",
            image_path.as_ref().display(),
            image.width(),
            image.height()
        );

        let detector = OnnxPoseDetector::load(model_path.as_ref(), config.detector).await?;
        verbose!("Detector ready ({})", config.detector.model_slug());

        let mut pipeline = Self::new(Box::new(detector), config)?;
        pipeline.compose(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::{Keypoint, Part, Pose};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Detector double returning a fixed detection.
    struct FakeDetector {
        detection: Detection,
        calls: Rc<Cell<usize>>,
    }

    impl FakeDetector {
        fn new(detection: Detection) -> Self {
            Self {
                detection,
                calls: Rc::new(Cell::new(0)),
            }
        }
    }

    impl PoseDetector for FakeDetector {
        fn estimate(
            &mut self,
            _image: &DynamicImage,
            _options: &EstimateOptions,
        ) -> Result<Detection> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.detection.clone())
        }
    }

    fn centered_pose(score: f32) -> Pose {
        let keypoints = Part::ALL
            .iter()
            .enumerate()
            .map(|(i, &part)| {
                Keypoint::new(part, 100.0 + i as f32 * 5.0, 60.0 + i as f32 * 8.0, 0.9)
            })
            .collect();
        Pose::new(score, keypoints)
    }

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            320,
            240,
            image::Rgba([40, 40, 40, 255]),
        ))
    }

    #[test]
    fn test_instructor_index_out_of_range_is_config_error() {
        let detector = FakeDetector::new(Detection::default());
        let config = PipelineConfig {
            instructor: InstructorOverlay {
                index: 99,
                ..InstructorOverlay::default()
            },
            ..PipelineConfig::default()
        };
        let result = ComparePipeline::new(Box::new(detector), config);
        assert!(matches!(result, Err(OverlayError::ConfigError(_))));
    }

    #[test]
    fn test_toggle_omits_instructor_on_redraw() {
        let detector = FakeDetector::new(Detection::default());
        let mut pipeline =
            ComparePipeline::new(Box::new(detector), PipelineConfig::default()).unwrap();
        let image = test_image();

        let with_instructor = pipeline.compose(&image).unwrap();
        pipeline.set_show_instructor(false);
        let without_instructor = pipeline.compose(&image).unwrap();

        assert_ne!(with_instructor, without_instructor);
        // A fresh redraw without the instructor equals the plain base image.
        assert_eq!(without_instructor, image.to_rgba8());
    }

    #[test]
    fn test_compose_draws_qualifying_poses_only() {
        let detection = Detection::new(vec![centered_pose(0.2), centered_pose(0.1)]);
        let detector = FakeDetector::new(detection.clone());
        let mut config = PipelineConfig::default();
        config.show_instructor = false;
        let pipeline = ComparePipeline::new(Box::new(detector), config.clone()).unwrap();
        let image = test_image();

        // A detection holding only the qualifying pose renders identically:
        // the 0.1-score pose contributes zero draw calls.
        let both = pipeline.render_frame(&image, &detection);
        let first_only = pipeline.render_frame(&image, &Detection::new(vec![centered_pose(0.2)]));
        assert_eq!(both, first_only);

        // And the qualifying pose did draw something.
        assert_ne!(both, image.to_rgba8());
    }

    #[test]
    fn test_compose_runs_exactly_one_estimation() {
        let detector = FakeDetector::new(Detection::default());
        let calls = Rc::clone(&detector.calls);
        let mut pipeline =
            ComparePipeline::new(Box::new(detector), PipelineConfig::default()).unwrap();

        pipeline.compose(&test_image()).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_presets_differ_only_in_flip_and_output() {
        let mirrored = PipelineConfig::mirrored();
        let unmirrored = PipelineConfig::unmirrored();

        assert!(mirrored.estimate.flip_horizontal);
        assert!(!unmirrored.estimate.flip_horizontal);
        assert_ne!(mirrored.output_name, unmirrored.output_name);
        assert_eq!(mirrored.min_pose_confidence, unmirrored.min_pose_confidence);
        assert_eq!(mirrored.min_part_confidence, unmirrored.min_part_confidence);
        assert_eq!(mirrored.instructor, unmirrored.instructor);
    }
}
