// Keypoint records — per-image pose detections
//
// Each person image has a JSON companion produced by the pose detector:
//
//   { "people": [ { "pose_keypoints": [x0, y0, c0, x1, y1, c1, ...] } ] }
//
// Newer detector versions name the list "pose_keypoints_2d"; both are read.
// Only the first person is used. Points follow the 18-joint COCO ordering of
// `PoseJoint`; an undetected joint is written as (0, 0, 0).

use std::path::Path;

use serde::Deserialize;

use tryon_core::{Error, Result};

/// Coordinates at or below this value mark an undetected joint.
pub const VALIDITY_THRESHOLD: f64 = 1.0;

/// The 18 joints of the COCO body model, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PoseJoint {
    Nose = 0,
    Neck = 1,
    RightShoulder = 2,
    RightElbow = 3,
    RightWrist = 4,
    LeftShoulder = 5,
    LeftElbow = 6,
    LeftWrist = 7,
    RightHip = 8,
    RightKnee = 9,
    RightAnkle = 10,
    LeftHip = 11,
    LeftKnee = 12,
    LeftAnkle = 13,
    RightEye = 14,
    LeftEye = 15,
    RightEar = 16,
    LeftEar = 17,
}

impl PoseJoint {
    pub const COUNT: usize = 18;

    pub const ALL: [PoseJoint; Self::COUNT] = [
        Self::Nose,
        Self::Neck,
        Self::RightShoulder,
        Self::RightElbow,
        Self::RightWrist,
        Self::LeftShoulder,
        Self::LeftElbow,
        Self::LeftWrist,
        Self::RightHip,
        Self::RightKnee,
        Self::RightAnkle,
        Self::LeftHip,
        Self::LeftKnee,
        Self::LeftAnkle,
        Self::RightEye,
        Self::LeftEye,
        Self::RightEar,
        Self::LeftEar,
    ];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Heatmap channel of this joint.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One detected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointDetection {
    pub x: f64,
    pub y: f64,
    /// Detector confidence. Carried along but not used for rendering.
    pub confidence: f64,
}

impl KeypointDetection {
    /// Both coordinates above [`VALIDITY_THRESHOLD`].
    pub fn is_valid(&self) -> bool {
        self.x > VALIDITY_THRESHOLD && self.y > VALIDITY_THRESHOLD
    }
}

#[derive(Debug, Deserialize)]
struct RecordFile {
    people: Vec<PersonRecord>,
}

#[derive(Debug, Deserialize)]
struct PersonRecord {
    #[serde(alias = "pose_keypoints_2d")]
    pose_keypoints: Vec<f64>,
}

/// Keypoints of the first person in a record, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseKeypoints {
    points: Vec<KeypointDetection>,
}

impl PoseKeypoints {
    pub fn new(points: Vec<KeypointDetection>) -> Self {
        Self { points }
    }

    /// Read a keypoint record from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        Self::parse(&text).map_err(|reason| Error::malformed(path, reason))
    }

    /// Parse record JSON. The error string describes what is missing.
    pub fn parse(json: &str) -> std::result::Result<Self, String> {
        let record: RecordFile = serde_json::from_str(json).map_err(|e| e.to_string())?;
        let person = record
            .people
            .into_iter()
            .next()
            .ok_or_else(|| "record lists no people".to_string())?;
        let flat = person.pose_keypoints;
        if flat.len() % 3 != 0 {
            return Err(format!(
                "keypoint list length {} is not a multiple of 3",
                flat.len()
            ));
        }
        let points = flat
            .chunks_exact(3)
            .map(|c| KeypointDetection {
                x: c[0],
                y: c[1],
                confidence: c[2],
            })
            .collect();
        Ok(Self { points })
    }

    /// Number of points in the record (may differ from 18).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[KeypointDetection] {
        &self.points
    }

    /// The detection for a joint, if the record has that many points.
    pub fn joint(&self, joint: PoseJoint) -> Option<&KeypointDetection> {
        self.points.get(joint.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_triples() {
        let kp = PoseKeypoints::parse(
            r#"{"version": 1.0, "people": [{"pose_keypoints": [10, 20, 0.9, 0, 0, 0]}]}"#,
        )
        .unwrap();
        assert_eq!(kp.len(), 2);
        let nose = kp.joint(PoseJoint::Nose).unwrap();
        assert_eq!((nose.x, nose.y, nose.confidence), (10.0, 20.0, 0.9));
        assert!(nose.is_valid());
        assert!(!kp.joint(PoseJoint::Neck).unwrap().is_valid());
        assert!(kp.joint(PoseJoint::LeftEar).is_none());
    }

    #[test]
    fn test_parse_2d_alias() {
        let kp = PoseKeypoints::parse(r#"{"people": [{"pose_keypoints_2d": [5, 6, 1]}]}"#)
            .unwrap();
        assert_eq!(kp.len(), 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let p = KeypointDetection {
            x: 1.0,
            y: 50.0,
            confidence: 1.0,
        };
        assert!(!p.is_valid());
        let q = KeypointDetection { x: 1.5, ..p };
        assert!(q.is_valid());
    }

    #[test]
    fn test_parse_errors() {
        assert!(PoseKeypoints::parse(r#"{"persons": []}"#).is_err());
        assert!(PoseKeypoints::parse(r#"{"people": []}"#).is_err());
        assert!(PoseKeypoints::parse(r#"{"people": [{"pose_keypoints": [1, 2]}]}"#).is_err());
        assert!(PoseKeypoints::parse(r#"{"people": [{}]}"#).is_err());
        assert!(PoseKeypoints::parse("not json").is_err());
    }

    #[test]
    fn test_joint_order() {
        assert_eq!(PoseJoint::ALL.len(), PoseJoint::COUNT);
        for (i, j) in PoseJoint::ALL.iter().enumerate() {
            assert_eq!(j.index(), i);
            assert_eq!(PoseJoint::from_index(i), Some(*j));
        }
        assert_eq!(PoseJoint::from_index(18), None);
    }
}
