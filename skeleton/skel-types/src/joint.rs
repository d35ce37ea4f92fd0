//! Skeletal joints.
//!
//! Joint identifiers follow the OpenNI skeleton enumeration: 24 joints
//! numbered 1 (head) to 24 (right foot). Not every joint is reported by
//! every tracker, and a joint present in one frame may be missing in the
//! next.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::Point3;

use crate::error::{FrameError, FrameResult};

/// Identifier of a skeletal joint.
///
/// # Example
///
/// ```
/// use skel_types::JointId;
///
/// assert_eq!(JointId::NECK.get(), 2);
/// assert_eq!(JointId::NECK.name(), "neck");
/// assert!(JointId::new(25).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct JointId(u32);

/// Names of the schema joints, indexed by `id - 1`.
const JOINT_NAMES: [&str; 24] = [
    "head",
    "neck",
    "torso",
    "waist",
    "left_collar",
    "left_shoulder",
    "left_elbow",
    "left_wrist",
    "left_hand",
    "left_fingertip",
    "right_collar",
    "right_shoulder",
    "right_elbow",
    "right_wrist",
    "right_hand",
    "right_fingertip",
    "left_hip",
    "left_knee",
    "left_ankle",
    "left_foot",
    "right_hip",
    "right_knee",
    "right_ankle",
    "right_foot",
];

impl JointId {
    /// Head.
    pub const HEAD: Self = Self(1);
    /// Neck.
    pub const NECK: Self = Self(2);
    /// Torso.
    pub const TORSO: Self = Self(3);
    /// Waist.
    pub const WAIST: Self = Self(4);
    /// Left collar.
    pub const LEFT_COLLAR: Self = Self(5);
    /// Left shoulder.
    pub const LEFT_SHOULDER: Self = Self(6);
    /// Left elbow.
    pub const LEFT_ELBOW: Self = Self(7);
    /// Left wrist.
    pub const LEFT_WRIST: Self = Self(8);
    /// Left hand.
    pub const LEFT_HAND: Self = Self(9);
    /// Left fingertip.
    pub const LEFT_FINGERTIP: Self = Self(10);
    /// Right collar.
    pub const RIGHT_COLLAR: Self = Self(11);
    /// Right shoulder.
    pub const RIGHT_SHOULDER: Self = Self(12);
    /// Right elbow.
    pub const RIGHT_ELBOW: Self = Self(13);
    /// Right wrist.
    pub const RIGHT_WRIST: Self = Self(14);
    /// Right hand.
    pub const RIGHT_HAND: Self = Self(15);
    /// Right fingertip.
    pub const RIGHT_FINGERTIP: Self = Self(16);
    /// Left hip.
    pub const LEFT_HIP: Self = Self(17);
    /// Left knee.
    pub const LEFT_KNEE: Self = Self(18);
    /// Left ankle.
    pub const LEFT_ANKLE: Self = Self(19);
    /// Left foot.
    pub const LEFT_FOOT: Self = Self(20);
    /// Right hip.
    pub const RIGHT_HIP: Self = Self(21);
    /// Right knee.
    pub const RIGHT_KNEE: Self = Self(22);
    /// Right ankle.
    pub const RIGHT_ANKLE: Self = Self(23);
    /// Right foot.
    pub const RIGHT_FOOT: Self = Self(24);

    /// Number of joints in the schema.
    pub const COUNT: u32 = 24;

    /// Creates a joint id, checking it against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownJoint`] if `id` is not in `1..=24`.
    pub const fn new(id: u32) -> FrameResult<Self> {
        if id == 0 || id > Self::COUNT {
            return Err(FrameError::UnknownJoint(id));
        }
        Ok(Self(id))
    }

    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Human-readable joint name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        JOINT_NAMES[(self.0 - 1) as usize]
    }

    /// All schema joints in id order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=Self::COUNT).map(Self)
    }
}

impl TryFrom<u32> for JointId {
    type Error = FrameError;

    fn try_from(id: u32) -> FrameResult<Self> {
        Self::new(id)
    }
}

impl From<JointId> for u32 {
    fn from(id: JointId) -> Self {
        id.0
    }
}

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A tracked skeletal landmark.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Joint {
    /// Which joint this is.
    pub id: JointId,

    /// Tracker confidence in `[0, 1]`.
    pub confidence: f32,

    /// Real-world position, in the same units as the frame point cloud.
    pub position: Point3<f64>,

    /// Projective position `(u, v, w)`: image column, image row, depth.
    #[cfg_attr(feature = "serde", serde(default))]
    pub projective: Option<Point3<f64>>,
}

impl Joint {
    /// Creates a fully confident joint at `position`.
    ///
    /// # Example
    ///
    /// ```
    /// use skel_types::{Joint, JointId};
    /// use nalgebra::Point3;
    ///
    /// let head = Joint::new(JointId::HEAD, Point3::new(0.0, 800.0, 2000.0));
    /// assert!((head.confidence - 1.0).abs() < f32::EPSILON);
    /// assert!(head.projective.is_none());
    /// ```
    #[must_use]
    pub const fn new(id: JointId, position: Point3<f64>) -> Self {
        Self {
            id,
            confidence: 1.0,
            position,
            projective: None,
        }
    }
}
