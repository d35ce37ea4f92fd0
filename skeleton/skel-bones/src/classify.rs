//! Nearest-bone classification.
//!
//! Each point of a user is assigned the 1-based index of its nearest bone,
//! where bones are the topology entries whose joints both resolved in the
//! current frame, taken in name order. Label 0 is reserved for background
//! and for users with no usable skeleton.

// Bone counts are bounded by the topology, which rejects tables that
// overflow a u16 label.
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashMap;

use nalgebra::Point3;
use rayon::prelude::*;
use skel_types::{Frame, Grid, JointId, LabelGrid, User};
use tracing::{debug, warn};

use crate::error::{BoneError, BoneResult};
use crate::segment::Segment;
use crate::topology::BoneTopology;

/// Parameters for bone classification.
///
/// # Example
///
/// ```
/// use skel_bones::ClassifyParams;
///
/// let params = ClassifyParams::default();
/// assert!(params.skip_degenerate);
///
/// let strict = ClassifyParams::strict();
/// assert!(!strict.skip_degenerate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyParams {
    /// Drop bones whose joints coincide instead of failing.
    ///
    /// A dropped bone is logged and excluded from the distance table.
    pub skip_degenerate: bool,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            skip_degenerate: true,
        }
    }
}

impl ClassifyParams {
    /// Fail on the first degenerate bone.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            skip_degenerate: false,
        }
    }

    /// Set whether degenerate bones are skipped.
    #[must_use]
    pub const fn skip_degenerate(mut self, skip: bool) -> Self {
        self.skip_degenerate = skip;
        self
    }
}

/// A bone defined for the current frame: named, with a usable segment.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinedBone {
    /// Bone name.
    pub name: String,
    /// Segment between the bone's joints.
    pub segment: Segment,
}

/// Builds the bones defined for one user in one frame, in name order.
///
/// Bones whose joints are not both present are dropped.
///
/// # Errors
///
/// Returns [`BoneError::DegenerateBone`] if a bone's joints coincide and
/// `params.skip_degenerate` is `false`.
pub fn define_bones(
    topology: &BoneTopology,
    joints: &HashMap<JointId, Point3<f64>>,
    params: &ClassifyParams,
) -> BoneResult<Vec<DefinedBone>> {
    let mut defined = Vec::new();
    for bone in topology.resolve(joints) {
        match Segment::new(bone.p1, bone.p2) {
            Ok(segment) => defined.push(DefinedBone {
                name: bone.spec.name.to_string(),
                segment,
            }),
            Err(err) if err.is_per_bone() && params.skip_degenerate => {
                warn!(bone = %bone.spec.name, "Dropping degenerate bone");
            }
            Err(_) => {
                return Err(BoneError::DegenerateBone {
                    bone: bone.spec.name.to_string(),
                });
            }
        }
    }
    Ok(defined)
}

/// Distance from every point to every defined bone.
///
/// Stored one column per bone, in the order the bones were given.
///
/// # Example
///
/// ```
/// use skel_bones::{BoneDistanceTable, DefinedBone, Segment};
/// use nalgebra::Point3;
///
/// let bones = vec![
///     DefinedBone {
///         name: "a".into(),
///         segment: Segment::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap(),
///     },
///     DefinedBone {
///         name: "b".into(),
///         segment: Segment::new(Point3::new(0.0, 5.0, 0.0), Point3::new(1.0, 5.0, 0.0)).unwrap(),
///     },
/// ];
/// let points = [Point3::new(0.5, 1.0, 0.0), Point3::new(0.5, 4.0, 0.0)];
///
/// let table = BoneDistanceTable::compute(&points, &bones);
/// assert_eq!(table.labels(), vec![1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BoneDistanceTable {
    bone_names: Vec<String>,
    columns: Vec<Vec<f64>>,
    point_count: usize,
}

impl BoneDistanceTable {
    /// Computes the table. Columns are evaluated in parallel.
    #[must_use]
    pub fn compute(points: &[Point3<f64>], bones: &[DefinedBone]) -> Self {
        let columns = bones
            .par_iter()
            .map(|bone| points.iter().map(|p| bone.segment.distance(p)).collect())
            .collect();
        Self {
            bone_names: bones.iter().map(|b| b.name.clone()).collect(),
            columns,
            point_count: points.len(),
        }
    }

    /// Number of bone columns.
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of point rows.
    #[must_use]
    pub const fn point_count(&self) -> usize {
        self.point_count
    }

    /// Bone names, one per column.
    #[must_use]
    pub fn bone_names(&self) -> &[String] {
        &self.bone_names
    }

    /// Distances to one bone, one per point.
    #[must_use]
    pub fn column(&self, bone: usize) -> Option<&[f64]> {
        self.columns.get(bone).map(Vec::as_slice)
    }

    /// Distance from a point to a bone.
    #[must_use]
    pub fn distance(&self, point: usize, bone: usize) -> Option<f64> {
        self.columns.get(bone)?.get(point).copied()
    }

    /// Column index of the bone nearest to `point`.
    ///
    /// Ties go to the earliest column. Returns `None` when there are no
    /// bones, `point` is out of range, or every distance is `NaN`.
    #[must_use]
    pub fn nearest(&self, point: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (bone, column) in self.columns.iter().enumerate() {
            let d = *column.get(point)?;
            match best {
                Some((_, best_d)) if d >= best_d || d.is_nan() => {}
                None if d.is_nan() => {}
                _ => best = Some((bone, d)),
            }
        }
        best.map(|(bone, _)| bone)
    }

    /// Per-point labels: nearest column index + 1, or 0 if none.
    #[must_use]
    pub fn labels(&self) -> Vec<u16> {
        (0..self.point_count)
            .map(|point| self.nearest(point).map_or(0, |bone| bone as u16 + 1))
            .collect()
    }
}

/// Labels each point with its nearest bone.
///
/// Returns one label per point in `1..=B`, where `B` is the number of bones
/// defined by `joints`; every label is 0 if no bone is defined.
///
/// # Errors
///
/// Propagates [`define_bones`] errors.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use skel_bones::{BoneTopology, ClassifyParams, classify_points};
/// use skel_types::JointId;
/// use nalgebra::Point3;
///
/// let mut joints = HashMap::new();
/// joints.insert(JointId::HEAD, Point3::new(0.0, 10.0, 0.0));
/// joints.insert(JointId::NECK, Point3::new(0.0, 0.0, 0.0));
///
/// let points = [Point3::new(1.0, 5.0, 0.0), Point3::new(-3.0, 2.0, 1.0)];
/// let labels = classify_points(
///     &points,
///     &joints,
///     &BoneTopology::openni(),
///     &ClassifyParams::default(),
/// ).unwrap();
///
/// assert_eq!(labels, vec![1, 1]);
/// ```
pub fn classify_points(
    points: &[Point3<f64>],
    joints: &HashMap<JointId, Point3<f64>>,
    topology: &BoneTopology,
    params: &ClassifyParams,
) -> BoneResult<Vec<u16>> {
    let bones = define_bones(topology, joints, params)?;
    if bones.is_empty() {
        return Ok(vec![0; points.len()]);
    }
    Ok(BoneDistanceTable::compute(points, &bones).labels())
}

/// Bone label grid for one user of a frame.
///
/// Pixels of that user receive their nearest-bone label; every other pixel
/// is 0.
///
/// # Errors
///
/// Returns [`BoneError::Frame`] if the frame is structurally invalid, or
/// propagates [`define_bones`] errors.
pub fn label_user(
    frame: &Frame,
    user: &User,
    topology: &BoneTopology,
    params: &ClassifyParams,
) -> BoneResult<LabelGrid> {
    frame.validate()?;

    let mut out = Grid::new(frame.width(), frame.height(), 0u16);
    let user_points = frame.user_points(user.id);
    let labels = classify_points(&user_points.points, &user.joint_map(), topology, params)?;

    debug!(
        frame = frame.index,
        user = user.id,
        points = user_points.len(),
        joints = user.joints().len(),
        "Labelled user points by nearest bone"
    );

    let source = frame.label.as_slice();
    let cells = out.as_mut_slice();
    for (&pixel, &label) in user_points.pixels.iter().zip(&labels) {
        if source[pixel] == user.id {
            cells[pixel] = label;
        }
    }
    Ok(out)
}

/// Bone label grid for a frame.
///
/// Labels the frame's skeleton user (see [`Frame::skeleton_user`]). When
/// no user has a skeleton the frame's user label grid is returned
/// unchanged.
///
/// # Errors
///
/// See [`label_user`].
pub fn label_frame(
    frame: &Frame,
    topology: &BoneTopology,
    params: &ClassifyParams,
) -> BoneResult<LabelGrid> {
    match frame.skeleton_user() {
        Some(user) => label_user(frame, user, topology, params),
        None => {
            frame.validate()?;
            Ok(frame.label.clone())
        }
    }
}
