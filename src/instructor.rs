//! Static instructor (reference) pose table.
//!
//! The table is built once at first access and never mutated. Coordinates are
//! in the fixed instructor canvas space ([`INSTRUCTOR_CANVAS_SIZE`]); callers
//! scale and translate them into the destination surface with a
//! [`crate::geometry::Transform`].

use std::sync::LazyLock;

use crate::keypoint::{Keypoint, Part, Pose};

/// Size of the source canvas the instructor poses were authored in.
pub const INSTRUCTOR_CANVAS_SIZE: (u32, u32) = (600, 800);

/// `(x, y, score)` per part, in part-index order.
type PoseTable = [(f32, f32, f32); Part::COUNT];

/// Neutral standing pose, arms at the sides.
const STANDING: PoseTable = [
    (300.0, 180.0, 0.98), // nose
    (315.0, 170.0, 0.97), // leftEye
    (285.0, 170.0, 0.97), // rightEye
    (330.0, 180.0, 0.84), // leftEar
    (270.0, 180.0, 0.84), // rightEar
    (360.0, 260.0, 0.96), // leftShoulder
    (240.0, 260.0, 0.96), // rightShoulder
    (375.0, 360.0, 0.93), // leftElbow
    (225.0, 360.0, 0.93), // rightElbow
    (380.0, 450.0, 0.90), // leftWrist
    (220.0, 450.0, 0.90), // rightWrist
    (340.0, 460.0, 0.95), // leftHip
    (260.0, 460.0, 0.95), // rightHip
    (335.0, 600.0, 0.92), // leftKnee
    (265.0, 600.0, 0.92), // rightKnee
    (330.0, 740.0, 0.88), // leftAnkle
    (270.0, 740.0, 0.88), // rightAnkle
];

/// T-pose, both arms extended horizontally.
const T_POSE: PoseTable = [
    (300.0, 170.0, 0.98),
    (315.0, 160.0, 0.97),
    (285.0, 160.0, 0.97),
    (330.0, 170.0, 0.82),
    (270.0, 170.0, 0.82),
    (365.0, 250.0, 0.96),
    (235.0, 250.0, 0.96),
    (460.0, 250.0, 0.94),
    (140.0, 250.0, 0.94),
    (555.0, 250.0, 0.91),
    (45.0, 250.0, 0.91),
    (340.0, 455.0, 0.95),
    (260.0, 455.0, 0.95),
    (335.0, 600.0, 0.92),
    (265.0, 600.0, 0.92),
    (330.0, 745.0, 0.87),
    (270.0, 745.0, 0.87),
];

/// Arms raised above shoulder height.
const ARMS_RAISED: PoseTable = [
    (300.0, 200.0, 0.98),
    (315.0, 190.0, 0.97),
    (285.0, 190.0, 0.97),
    (330.0, 200.0, 0.83),
    (270.0, 200.0, 0.83),
    (360.0, 275.0, 0.96),
    (240.0, 275.0, 0.96),
    (400.0, 190.0, 0.94),
    (200.0, 190.0, 0.94),
    (425.0, 130.0, 0.92),
    (175.0, 130.0, 0.92),
    (340.0, 470.0, 0.95),
    (260.0, 470.0, 0.95),
    (345.0, 610.0, 0.92),
    (255.0, 610.0, 0.92),
    (350.0, 755.0, 0.88),
    (250.0, 755.0, 0.88),
];

fn pose_from_table(table: &PoseTable, score: f32) -> Pose {
    let keypoints = Part::ALL
        .iter()
        .zip(table)
        .map(|(&part, &(x, y, s))| Keypoint::new(part, x, y, s))
        .collect();
    Pose::new(score, keypoints)
}

static INSTRUCTOR_POSES: LazyLock<Vec<Pose>> = LazyLock::new(|| {
    vec![
        pose_from_table(&STANDING, 0.97),
        pose_from_table(&T_POSE, 0.96),
        pose_from_table(&ARMS_RAISED, 0.96),
    ]
});

/// All instructor poses, in selector order.
#[must_use]
pub fn instructor_poses() -> &'static [Pose] {
    &INSTRUCTOR_POSES
}

/// Look up one instructor pose by selector index.
#[must_use]
pub fn instructor_pose(index: usize) -> Option<&'static Pose> {
    INSTRUCTOR_POSES.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        let poses = instructor_poses();
        assert_eq!(poses.len(), 3);
        for pose in poses {
            assert_eq!(pose.keypoints.len(), Part::COUNT);
            assert!(pose.score > 0.0 && pose.score <= 1.0);
        }
    }

    #[test]
    fn test_keypoints_inside_canvas() {
        let (w, h) = INSTRUCTOR_CANVAS_SIZE;
        for pose in instructor_poses() {
            for kp in &pose.keypoints {
                assert!(kp.x >= 0.0 && kp.x < w as f32, "{} x out of canvas", kp.part);
                assert!(kp.y >= 0.0 && kp.y < h as f32, "{} y out of canvas", kp.part);
                assert!(kp.score > 0.0 && kp.score <= 1.0);
            }
        }
    }

    #[test]
    fn test_parts_in_taxonomy_order() {
        for pose in instructor_poses() {
            for (i, kp) in pose.keypoints.iter().enumerate() {
                assert_eq!(kp.part as usize, i);
            }
        }
    }

    #[test]
    fn test_lookup_out_of_range() {
        assert!(instructor_pose(2).is_some());
        assert!(instructor_pose(3).is_none());
    }
}
