//! Static skeleton topology connecting keypoints into limbs.

use crate::keypoint::Part;

/// Part pairs defining which keypoints connect to form the pose skeleton.
///
/// This is the PoseNet adjacency list: limbs and torso only, no facial edges.
/// Independent of any single pose instance.
pub const SKELETON: [(Part, Part); 12] = [
    (Part::LeftHip, Part::LeftShoulder),
    (Part::LeftElbow, Part::LeftShoulder),
    (Part::LeftElbow, Part::LeftWrist),
    (Part::LeftHip, Part::LeftKnee),
    (Part::LeftKnee, Part::LeftAnkle),
    (Part::RightHip, Part::RightShoulder),
    (Part::RightElbow, Part::RightShoulder),
    (Part::RightElbow, Part::RightWrist),
    (Part::RightHip, Part::RightKnee),
    (Part::RightKnee, Part::RightAnkle),
    (Part::LeftShoulder, Part::RightShoulder),
    (Part::LeftHip, Part::RightHip),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_skeleton_edges_are_distinct() {
        let mut seen = HashSet::new();
        for (a, b) in SKELETON {
            assert_ne!(a, b, "degenerate edge {a}-{b}");
            // Order-insensitive uniqueness.
            let key = if (a as usize) < (b as usize) {
                (a as usize, b as usize)
            } else {
                (b as usize, a as usize)
            };
            assert!(seen.insert(key), "duplicate edge {a}-{b}");
        }
        assert_eq!(seen.len(), SKELETON.len());
    }

    #[test]
    fn test_skeleton_excludes_face() {
        for (a, b) in SKELETON {
            for part in [a, b] {
                assert!(
                    (part as usize) >= Part::LeftShoulder as usize,
                    "facial part {part} in skeleton"
                );
            }
        }
    }
}
