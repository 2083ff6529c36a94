#![allow(clippy::multiple_crate_versions)]

//! # pose-compare
//!
//! Pose overlay renderer: draws detected keypoints, skeleton connectors, and
//! bounding boxes on a still image, and optionally composites a static
//! "instructor" reference pose for visual comparison.
//!
//! Pose estimation itself is delegated to an external multi-pose model run
//! through ONNX Runtime; this crate configures the detector, invokes it once
//! per image, and draws the returned coordinates onto a 2D surface.
//!
//! ## Quick start
//!
//! ```no_run
//! use pose_compare::pipeline::{ComparePipeline, PipelineConfig};
//!
//! # async fn demo() -> pose_compare::Result<()> {
//! let frame = ComparePipeline::run(
//!     std::path::Path::new("movenet-multipose-lightning.onnx"),
//!     std::path::Path::new("photo.jpg"),
//!     PipelineConfig::mirrored(),
//! )
//! .await?;
//! frame.save("output.png").ok();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`keypoint`] | [`Keypoint`], [`Pose`], and [`Detection`] data types |
//! | [`skeleton`] | Static limb topology connecting keypoints |
//! | [`geometry`] | Keypoint-set transforms and image placement |
//! | [`instructor`] | Static reference pose table |
//! | [`detector`] | Detector configuration and the ONNX-backed detector |
//! | [`render`] | Overlay renderer and the [`Surface`] drawing seam |
//! | [`pipeline`] | One-shot comparison orchestrator |
//! | [`download`] | Default-model resolution |
//! | [`error`] | Error types ([`OverlayError`], [`Result`]) |
//!
//! ## Feature flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `visualize` | Real-time window display of the composed frame |

// Modules
pub mod cli;
pub mod detector;
pub mod download;
pub mod error;
pub mod geometry;
pub mod instructor;
pub mod keypoint;
pub mod pipeline;
pub mod render;
pub mod skeleton;
pub mod utils;
pub mod visualizer;

// Re-export main types for convenience
pub use detector::{Architecture, DetectorConfig, EstimateOptions, OnnxPoseDetector, PoseDetector};
pub use error::{OverlayError, Result};
pub use geometry::Transform;
pub use keypoint::{Detection, Keypoint, Part, Pose};
pub use pipeline::{ComparePipeline, InstructorOverlay, PipelineConfig};
pub use render::{ImageSurface, OverlaySettings, Surface};
pub use skeleton::SKELETON;
pub use visualizer::Color;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pose-compare");
    }
}
