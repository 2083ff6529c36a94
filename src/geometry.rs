//! Geometry helpers: keypoint-set transforms and image placement.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::keypoint::{Keypoint, Pose};

/// Uniform scale followed by a translation, applied to points in pixel space.
///
/// `p' = p * scale + offset`. Invertible for any non-zero scale; applying a
/// transform and then its inverse returns the original coordinates within
/// floating-point tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Uniform scale factor.
    pub scale: f32,
    /// Translation `(dx, dy)` applied after scaling.
    pub offset: (f32, f32),
}

impl Transform {
    /// Create a new transform.
    #[must_use]
    pub const fn new(scale: f32, offset: (f32, f32)) -> Self {
        Self { scale, offset }
    }

    /// Identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(1.0, (0.0, 0.0))
    }

    /// Apply the transform to a single point.
    #[must_use]
    pub fn apply(&self, point: (f32, f32)) -> (f32, f32) {
        (
            point.0 * self.scale + self.offset.0,
            point.1 * self.scale + self.offset.1,
        )
    }

    /// The inverse transform, or `None` for a degenerate (zero) scale.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        if self.scale == 0.0 {
            return None;
        }
        let inv = 1.0 / self.scale;
        Some(Self::new(inv, (-self.offset.0 * inv, -self.offset.1 * inv)))
    }

    /// Transform a keypoint set, preserving parts and per-point scores.
    #[must_use]
    pub fn apply_keypoints(&self, keypoints: &[Keypoint]) -> Vec<Keypoint> {
        keypoints
            .iter()
            .map(|kp| {
                let (x, y) = self.apply((kp.x, kp.y));
                Keypoint::new(kp.part, x, y, kp.score)
            })
            .collect()
    }

    /// Transform a whole pose, preserving its overall score.
    #[must_use]
    pub fn apply_pose(&self, pose: &Pose) -> Pose {
        Pose::new(pose.score, self.apply_keypoints(&pose.keypoints))
    }
}

/// Render `src` scaled to `size`, positioned at `offset` on `dest`.
///
/// A zero-area target rectangle is treated as a no-op. Negative offsets clip
/// against the destination bounds. Alpha is blended, so transparent layers
/// composite over the existing content.
pub fn blit_scaled(src: &RgbaImage, dest: &mut RgbaImage, offset: (i64, i64), size: (u32, u32)) {
    let (width, height) = size;
    if width == 0 || height == 0 {
        return;
    }

    if (width, height) == src.dimensions() {
        imageops::overlay(dest, src, offset.0, offset.1);
    } else {
        let scaled = imageops::resize(src, width, height, FilterType::Triangle);
        imageops::overlay(dest, &scaled, offset.0, offset.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::Part;
    use image::Rgba;

    #[test]
    fn test_transform_round_trip() {
        let transform = Transform::new(1.0 / 3.0, (10.0, -40.0));
        let inverse = transform.inverse().unwrap();

        let keypoints: Vec<Keypoint> = Part::ALL
            .iter()
            .enumerate()
            .map(|(i, &part)| Keypoint::new(part, 30.0 + i as f32 * 7.5, 120.0 + i as f32 * 11.0, 0.9))
            .collect();

        let forward = transform.apply_keypoints(&keypoints);
        let back = inverse.apply_keypoints(&forward);

        for (orig, restored) in keypoints.iter().zip(&back) {
            assert_eq!(orig.part, restored.part);
            assert!((orig.x - restored.x).abs() < 1e-3);
            assert!((orig.y - restored.y).abs() < 1e-3);
            assert!((orig.score - restored.score).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_transform_degenerate_scale() {
        assert!(Transform::new(0.0, (5.0, 5.0)).inverse().is_none());
    }

    #[test]
    fn test_transform_preserves_score() {
        let pose = Pose::new(
            0.5,
            Part::ALL
                .iter()
                .map(|&part| Keypoint::new(part, 1.0, 2.0, 0.33))
                .collect(),
        );
        let moved = Transform::new(2.0, (1.0, 1.0)).apply_pose(&pose);
        assert!((moved.score - 0.5).abs() < f32::EPSILON);
        for kp in &moved.keypoints {
            assert!((kp.score - 0.33).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_blit_zero_area_is_noop() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let mut dest = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        let before = dest.clone();

        blit_scaled(&src, &mut dest, (0, 0), (0, 4));
        blit_scaled(&src, &mut dest, (0, 0), (4, 0));
        assert_eq!(dest, before);
    }

    #[test]
    fn test_blit_negative_offset_clips() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let mut dest = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));

        blit_scaled(&src, &mut dest, (-2, -2), (4, 4));
        // Top-left quadrant of the source landed at the origin.
        assert_eq!(dest.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(dest.get_pixel(4, 4), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_blit_scales_to_rect() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));
        let mut dest = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));

        blit_scaled(&src, &mut dest, (0, 0), (8, 8));
        assert_eq!(dest.get_pixel(7, 7), &Rgba([0, 255, 0, 255]));
    }
}
