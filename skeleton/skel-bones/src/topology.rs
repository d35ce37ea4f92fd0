//! Skeletal bone topology.
//!
//! A bone is a named pair of joints. The topology is fixed configuration:
//! it is built once (usually [`BoneTopology::openni`]) and only read
//! afterwards. Bones are always iterated in lexicographic name order, which
//! fixes the meaning of each classifier label.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use nalgebra::Point3;
use skel_types::JointId;

use crate::error::{BoneError, BoneResult};

/// A named bone between two joints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoneSpec {
    /// Bone name.
    pub name: Cow<'static, str>,
    /// First joint (segment start).
    pub from: JointId,
    /// Second joint (segment end).
    pub to: JointId,
}

impl BoneSpec {
    /// Creates a bone from a static name.
    #[must_use]
    pub const fn new(name: &'static str, from: JointId, to: JointId) -> Self {
        Self {
            name: Cow::Borrowed(name),
            from,
            to,
        }
    }

    /// Creates a bone from raw joint ids, checking them against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`BoneError::Frame`] wrapping `UnknownJoint` if either id is
    /// outside the joint schema.
    pub fn from_raw(name: impl Into<String>, from: u32, to: u32) -> BoneResult<Self> {
        Ok(Self {
            name: Cow::Owned(name.into()),
            from: JointId::new(from)?,
            to: JointId::new(to)?,
        })
    }
}

/// Default OpenNI bone table.
const OPENNI_BONES: [BoneSpec; 13] = [
    BoneSpec::new("neck", JointId::HEAD, JointId::NECK),
    BoneSpec::new("left_forearm", JointId::LEFT_HAND, JointId::LEFT_ELBOW),
    BoneSpec::new("left_arm", JointId::LEFT_ELBOW, JointId::LEFT_SHOULDER),
    BoneSpec::new("right_forearm", JointId::RIGHT_ELBOW, JointId::RIGHT_HAND),
    BoneSpec::new("right_arm", JointId::RIGHT_SHOULDER, JointId::RIGHT_ELBOW),
    BoneSpec::new("left_chest", JointId::LEFT_SHOULDER, JointId::LEFT_HIP),
    BoneSpec::new("right_chest", JointId::RIGHT_SHOULDER, JointId::RIGHT_HIP),
    BoneSpec::new("left_thigh", JointId::LEFT_HIP, JointId::LEFT_KNEE),
    BoneSpec::new("left_calf", JointId::LEFT_KNEE, JointId::LEFT_FOOT),
    BoneSpec::new("right_thigh", JointId::RIGHT_HIP, JointId::RIGHT_KNEE),
    BoneSpec::new("right_calf", JointId::RIGHT_KNEE, JointId::RIGHT_FOOT),
    BoneSpec::new("left_collar", JointId::NECK, JointId::LEFT_SHOULDER),
    BoneSpec::new("right_collar", JointId::LEFT_SHOULDER, JointId::RIGHT_SHOULDER),
];

/// A validated bone table, sorted by bone name.
///
/// # Example
///
/// ```
/// use skel_bones::BoneTopology;
///
/// let topology = BoneTopology::openni();
/// let names: Vec<_> = topology.iter().map(|b| &*b.name).collect();
///
/// assert_eq!(topology.len(), 13);
/// assert_eq!(names[0], "left_arm");
/// assert!(names.windows(2).all(|w| w[0] < w[1]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoneTopology {
    bones: Vec<BoneSpec>,
}

/// A bone whose joints both resolved in the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBone<'a> {
    /// The bone definition.
    pub spec: &'a BoneSpec,
    /// Position of the `from` joint.
    pub p1: Point3<f64>,
    /// Position of the `to` joint.
    pub p2: Point3<f64>,
}

impl BoneTopology {
    /// Builds a topology from a bone table.
    ///
    /// # Errors
    ///
    /// Returns [`BoneError::InvalidTopology`] if two bones share a name, a
    /// bone joins a joint to itself, or the table has more bones than a
    /// label can index.
    pub fn new(bones: impl IntoIterator<Item = BoneSpec>) -> BoneResult<Self> {
        let mut bones: Vec<BoneSpec> = bones.into_iter().collect();

        if bones.len() >= usize::from(u16::MAX) {
            return Err(BoneError::invalid_topology(format!(
                "{} bones exceed the label range",
                bones.len()
            )));
        }

        let mut seen = HashSet::new();
        for bone in &bones {
            if !seen.insert(bone.name.clone()) {
                return Err(BoneError::invalid_topology(format!(
                    "duplicate bone {}",
                    bone.name
                )));
            }
            if bone.from == bone.to {
                return Err(BoneError::invalid_topology(format!(
                    "bone {} joins {} to itself",
                    bone.name, bone.from
                )));
            }
        }

        bones.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { bones })
    }

    /// The default OpenNI skeleton topology.
    #[must_use]
    pub fn openni() -> Self {
        let mut bones = OPENNI_BONES.to_vec();
        bones.sort_by(|a, b| a.name.cmp(&b.name));
        Self { bones }
    }

    /// Number of bones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bones in name order.
    pub fn iter(&self) -> std::slice::Iter<'_, BoneSpec> {
        self.bones.iter()
    }

    /// Looks up a bone by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoneSpec> {
        self.bones
            .binary_search_by(|b| (*b.name).cmp(name))
            .ok()
            .map(|i| &self.bones[i])
    }

    /// Bones whose joints are both present in `joints`, in name order.
    ///
    /// Unresolved bones are dropped, not reported.
    #[must_use]
    pub fn resolve(&self, joints: &HashMap<JointId, Point3<f64>>) -> Vec<ResolvedBone<'_>> {
        self.bones
            .iter()
            .filter_map(|spec| {
                let p1 = joints.get(&spec.from)?;
                let p2 = joints.get(&spec.to)?;
                Some(ResolvedBone {
                    spec,
                    p1: *p1,
                    p2: *p2,
                })
            })
            .collect()
    }
}

impl Default for BoneTopology {
    fn default() -> Self {
        Self::openni()
    }
}

impl<'a> IntoIterator for &'a BoneTopology {
    type Item = &'a BoneSpec;
    type IntoIter = std::slice::Iter<'a, BoneSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.bones.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_openni_table() {
        let topology = BoneTopology::openni();
        assert_eq!(topology.len(), 13);

        let neck = topology.get("neck").unwrap();
        assert_eq!((neck.from, neck.to), (JointId::HEAD, JointId::NECK));

        let right_collar = topology.get("right_collar").unwrap();
        assert_eq!(right_collar.from.get(), 6);
        assert_eq!(right_collar.to.get(), 12);

        assert!(topology.get("chest").is_none());
    }

    #[test]
    fn test_name_order() {
        let names: Vec<String> = BoneTopology::openni()
            .iter()
            .map(|b| b.name.to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.first().map(String::as_str), Some("left_arm"));
        assert_eq!(names.last().map(String::as_str), Some("right_thigh"));
    }

    #[test]
    fn test_custom_table_sorted() {
        let topology = BoneTopology::new([
            BoneSpec::new("zeta", JointId::HEAD, JointId::NECK),
            BoneSpec::new("alpha", JointId::NECK, JointId::TORSO),
        ])
        .unwrap();
        let names: Vec<_> = topology.iter().map(|b| &*b.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = BoneTopology::new([
            BoneSpec::new("neck", JointId::HEAD, JointId::NECK),
            BoneSpec::new("neck", JointId::NECK, JointId::TORSO),
        ])
        .unwrap_err();
        assert!(matches!(err, BoneError::InvalidTopology(_)));
    }

    #[test]
    fn test_self_loop_rejected() {
        let err = BoneTopology::new([BoneSpec::new("loop", JointId::HEAD, JointId::HEAD)])
            .unwrap_err();
        assert!(matches!(err, BoneError::InvalidTopology(_)));
    }

    #[test]
    fn test_unknown_joint_rejected() {
        assert!(BoneSpec::from_raw("tail", 3, 31).is_err());
        let spec = BoneSpec::from_raw("spine", 2, 3).unwrap();
        assert_eq!(spec.to, JointId::TORSO);
    }

    #[test]
    fn test_resolve_drops_missing_joints() {
        let topology = BoneTopology::openni();
        let mut joints = HashMap::new();
        joints.insert(JointId::HEAD, Point3::new(0.0, 1.0, 0.0));
        joints.insert(JointId::NECK, Point3::new(0.0, 0.0, 0.0));
        joints.insert(JointId::LEFT_SHOULDER, Point3::new(1.0, 0.0, 0.0));

        let resolved = topology.resolve(&joints);
        let names: Vec<_> = resolved.iter().map(|b| &*b.spec.name).collect();
        assert_eq!(names, vec!["left_collar", "neck"]);
    }

    #[test]
    fn test_resolve_no_joints() {
        let topology = BoneTopology::openni();
        assert!(topology.resolve(&HashMap::new()).is_empty());
    }
}
