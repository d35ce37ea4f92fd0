//! Tracked users.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use nalgebra::Point3;

use crate::joint::{Joint, JointId};

/// Skeleton tracker state for a user at the time of capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrackingState {
    /// Skeleton is being tracked; joints are reported.
    Tracking,
    /// Tracker is calibrating against the user's pose.
    Calibrating,
    /// User is segmented but no skeleton is available.
    #[default]
    Looking,
}

/// A user segmented by the sensor in one frame.
///
/// `id` matches the values written into the frame's label grid.
///
/// # Example
///
/// ```
/// use skel_types::{Joint, JointId, User};
/// use nalgebra::Point3;
///
/// let bare = User::new(1);
/// assert!(!bare.has_skeleton());
///
/// let tracked = User::with_joints(2, vec![
///     Joint::new(JointId::HEAD, Point3::new(0.0, 1.0, 2.0)),
/// ]);
/// assert!(tracked.has_skeleton());
/// assert!(tracked.joint_map().contains_key(&JointId::HEAD));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct User {
    /// User identifier, as used in the label grid.
    pub id: u16,

    /// Tracker state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: TrackingState,

    /// Joints reported for this user, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub joints: Option<Vec<Joint>>,
}

impl User {
    /// Creates a user with no skeleton data.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self {
            id,
            state: TrackingState::Looking,
            joints: None,
        }
    }

    /// Creates a tracked user with the given joints.
    #[must_use]
    pub const fn with_joints(id: u16, joints: Vec<Joint>) -> Self {
        Self {
            id,
            state: TrackingState::Tracking,
            joints: Some(joints),
        }
    }

    /// Joints as a slice; empty when absent.
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        self.joints.as_deref().unwrap_or_default()
    }

    /// Returns `true` if at least one joint is reported.
    #[must_use]
    pub fn has_skeleton(&self) -> bool {
        !self.joints().is_empty()
    }

    /// Joint id → real-world position.
    ///
    /// If a joint id is repeated, the last entry wins.
    #[must_use]
    pub fn joint_map(&self) -> HashMap<JointId, Point3<f64>> {
        self.joints()
            .iter()
            .map(|joint| (joint.id, joint.position))
            .collect()
    }
}
