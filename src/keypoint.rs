//! Keypoint, pose, and detection data types.
//!
//! A [`Pose`] is a fixed set of 17 named [`Keypoint`]s (the COCO/PoseNet part
//! taxonomy) plus an overall confidence score. A [`Detection`] is the ordered
//! sequence of poses returned by a single detector invocation.

use std::fmt;
use std::str::FromStr;

/// The 17 body parts of the COCO/PoseNet keypoint taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Part {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Part {
    /// Number of parts in the taxonomy.
    pub const COUNT: usize = 17;

    /// All parts in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Look up a part by its taxonomy index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Canonical camelCase part name as used by pose-estimation libraries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "leftEye",
            Self::RightEye => "rightEye",
            Self::LeftEar => "leftEar",
            Self::RightEar => "rightEar",
            Self::LeftShoulder => "leftShoulder",
            Self::RightShoulder => "rightShoulder",
            Self::LeftElbow => "leftElbow",
            Self::RightElbow => "rightElbow",
            Self::LeftWrist => "leftWrist",
            Self::RightWrist => "rightWrist",
            Self::LeftHip => "leftHip",
            Self::RightHip => "rightHip",
            Self::LeftKnee => "leftKnee",
            Self::RightKnee => "rightKnee",
            Self::LeftAnkle => "leftAnkle",
            Self::RightAnkle => "rightAnkle",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Part {
    type Err = PartParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| PartParseError(s.to_string()))
    }
}

/// Error returned when parsing an invalid part name.
#[derive(Debug, Clone)]
pub struct PartParseError(String);

impl fmt::Display for PartParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown body part '{}'", self.0)
    }
}

impl std::error::Error for PartParseError {}

/// A named anatomical landmark with 2D position and confidence.
///
/// Positions are in image-pixel space; scores are in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Body part this keypoint belongs to.
    pub part: Part,
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
    /// Confidence score in [0, 1].
    pub score: f32,
}

impl Keypoint {
    /// Create a new keypoint.
    #[must_use]
    pub const fn new(part: Part, x: f32, y: f32, score: f32) -> Self {
        Self { part, x, y, score }
    }

    /// Whether this keypoint meets a confidence threshold.
    #[must_use]
    pub fn qualifies(&self, threshold: f32) -> bool {
        self.score >= threshold
    }

    /// Position as an `(x, y)` tuple.
    #[must_use]
    pub const fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// A full set of keypoints for one detected person.
///
/// Invariant: `keypoints` holds exactly [`Part::COUNT`] entries in part-index
/// order. Construction from malformed data is a precondition violation and is
/// not defended at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// Overall confidence score in [0, 1].
    pub score: f32,
    /// One keypoint per part, in part-index order.
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    /// Create a new pose.
    #[must_use]
    pub fn new(score: f32, keypoints: Vec<Keypoint>) -> Self {
        debug_assert_eq!(keypoints.len(), Part::COUNT);
        Self { score, keypoints }
    }

    /// Get the keypoint for a given part.
    #[must_use]
    pub fn get(&self, part: Part) -> &Keypoint {
        &self.keypoints[part as usize]
    }

    /// Axis-aligned bounding box `(min_x, min_y, max_x, max_y)` enclosing all
    /// keypoints whose score meets `threshold`, or `None` if no keypoint
    /// qualifies.
    #[must_use]
    pub fn bounding_box(&self, threshold: f32) -> Option<(f32, f32, f32, f32)> {
        bounding_box(&self.keypoints, threshold)
    }

    /// Centroid of all keypoints, ignoring confidence.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        let n = self.keypoints.len() as f32;
        let (sx, sy) = self
            .keypoints
            .iter()
            .fold((0.0, 0.0), |(sx, sy), kp| (sx + kp.x, sy + kp.y));
        (sx / n, sy / n)
    }
}

/// Axis-aligned bounding box `(min_x, min_y, max_x, max_y)` enclosing all
/// keypoints in the slice whose score meets `threshold`, or `None` if no
/// keypoint qualifies.
#[must_use]
pub fn bounding_box(keypoints: &[Keypoint], threshold: f32) -> Option<(f32, f32, f32, f32)> {
    let mut bounds: Option<(f32, f32, f32, f32)> = None;
    for kp in keypoints.iter().filter(|kp| kp.qualifies(threshold)) {
        bounds = Some(match bounds {
            None => (kp.x, kp.y, kp.x, kp.y),
            Some((min_x, min_y, max_x, max_y)) => (
                min_x.min(kp.x),
                min_y.min(kp.y),
                max_x.max(kp.x),
                max_y.max(kp.y),
            ),
        });
    }
    bounds
}

/// Ordered sequence of poses returned by one detector invocation.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Detected poses, highest score first.
    pub poses: Vec<Pose>,
}

impl Detection {
    /// Create a detection from a list of poses.
    #[must_use]
    pub fn new(poses: Vec<Pose>) -> Self {
        Self { poses }
    }

    /// Number of detected poses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Whether no poses were detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Iterate over the detected poses in score order.
    pub fn iter(&self) -> std::slice::Iter<'_, Pose> {
        self.poses.iter()
    }

    /// One-line log summary, e.g. `"2 poses (best 0.87), "`.
    #[must_use]
    pub fn verbose(&self) -> String {
        if self.poses.is_empty() {
            return "(no poses), ".to_string();
        }
        let suffix = if self.poses.len() > 1 { "s" } else { "" };
        format!(
            "{} pose{} (best {:.2}), ",
            self.poses.len(),
            suffix,
            self.poses[0].score
        )
    }
}

impl<'a> IntoIterator for &'a Detection {
    type Item = &'a Pose;
    type IntoIter = std::slice::Iter<'a, Pose>;

    fn into_iter(self) -> Self::IntoIter {
        self.poses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_pose(score: f32, kp_score: f32) -> Pose {
        let keypoints = Part::ALL
            .iter()
            .enumerate()
            .map(|(i, &part)| Keypoint::new(part, i as f32 * 10.0, i as f32 * 5.0, kp_score))
            .collect();
        Pose::new(score, keypoints)
    }

    #[test]
    fn test_part_index_round_trip() {
        for (i, part) in Part::ALL.iter().enumerate() {
            assert_eq!(Part::from_index(i), Some(*part));
            assert_eq!(*part as usize, i);
        }
        assert_eq!(Part::from_index(Part::COUNT), None);
    }

    #[test]
    fn test_part_name_round_trip() {
        for part in Part::ALL {
            assert_eq!(part.as_str().parse::<Part>().unwrap(), part);
        }
        assert!("noSuchPart".parse::<Part>().is_err());
    }

    #[test]
    fn test_keypoint_qualifies() {
        let kp = Keypoint::new(Part::Nose, 1.0, 2.0, 0.7);
        assert!(kp.qualifies(0.7));
        assert!(kp.qualifies(0.5));
        assert!(!kp.qualifies(0.71));
    }

    #[test]
    fn test_pose_get() {
        let pose = uniform_pose(0.9, 0.8);
        let wrist = pose.get(Part::RightWrist);
        assert_eq!(wrist.part, Part::RightWrist);
        assert!((wrist.x - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bounding_box_threshold() {
        let mut pose = uniform_pose(0.9, 0.9);
        // Only the nose qualifies once the rest drop below threshold.
        for kp in pose.keypoints.iter_mut().skip(1) {
            kp.score = 0.1;
        }
        let bbox = pose.bounding_box(0.5).unwrap();
        assert_eq!(bbox, (0.0, 0.0, 0.0, 0.0));

        // No keypoint qualifies.
        assert!(pose.bounding_box(0.95).is_none());
    }

    #[test]
    fn test_detection_verbose() {
        let det = Detection::default();
        assert_eq!(det.verbose(), "(no poses), ");

        let det = Detection::new(vec![uniform_pose(0.87, 0.9)]);
        assert_eq!(det.verbose(), "1 pose (best 0.87), ");
    }
}
