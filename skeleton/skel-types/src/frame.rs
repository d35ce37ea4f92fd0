//! Recorded depth-camera frames.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::{Point3, Vector3};

use crate::error::{FrameError, FrameResult};
use crate::grid::{DepthGrid, Grid, LabelGrid, Mask, VectorField};
use crate::user::User;

/// One snapshot from the depth sensor.
///
/// # Invariants
///
/// - `depth` and `label` share a shape.
/// - `points` has one entry per nonzero depth pixel, in row-major pixel
///   order.
/// - `point_labels` has the same length and ordering as `points`.
///
/// [`Frame::new`] and [`Frame::validate`] check these.
///
/// # Example
///
/// ```
/// use skel_types::{Frame, Grid, User};
/// use nalgebra::Point3;
///
/// let depth = Grid::from_vec(2, 1, vec![0u16, 1500]).unwrap();
/// let label = Grid::from_vec(2, 1, vec![0u16, 1]).unwrap();
/// let frame = Frame::new(
///     0,
///     depth,
///     label,
///     vec![Point3::new(10.0, 20.0, 1500.0)],
///     vec![1],
///     vec![User::new(1)],
/// ).unwrap();
///
/// assert_eq!(frame.valid_pixel_indices(), vec![1]);
/// assert_eq!(frame.user_mask(1).count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Frame index within the log.
    pub index: u64,

    /// Raw depth, `0` where invalid.
    pub depth: DepthGrid,

    /// Per-pixel user id, `0` where no user.
    pub label: LabelGrid,

    /// Real-world position of each valid depth pixel.
    pub points: Vec<Point3<f64>>,

    /// User id of each point.
    pub point_labels: Vec<u16>,

    /// Users segmented in this frame.
    #[cfg_attr(feature = "serde", serde(default))]
    pub users: Vec<User>,
}

/// Points belonging to one user, with the pixel each came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPoints {
    /// Row-major pixel index of each point.
    pub pixels: Vec<usize>,
    /// Real-world positions.
    pub points: Vec<Point3<f64>>,
}

impl UserPoints {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the user has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Frame {
    /// Creates a frame and checks its invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] if the grids disagree in shape or the point
    /// arrays are inconsistent with the depth grid.
    pub fn new(
        index: u64,
        depth: DepthGrid,
        label: LabelGrid,
        points: Vec<Point3<f64>>,
        point_labels: Vec<u16>,
        users: Vec<User>,
    ) -> FrameResult<Self> {
        let frame = Self {
            index,
            depth,
            label,
            points,
            point_labels,
            users,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Creates a frame with no valid pixels and no users.
    #[must_use]
    pub fn empty(index: u64, width: usize, height: usize) -> Self {
        Self {
            index,
            depth: Grid::new(width, height, 0),
            label: Grid::new(width, height, 0),
            points: Vec::new(),
            point_labels: Vec::new(),
            users: Vec::new(),
        }
    }

    /// Checks the frame invariants.
    ///
    /// # Errors
    ///
    /// - [`FrameError::BufferSizeMismatch`] if a grid buffer disagrees with
    ///   its shape.
    /// - [`FrameError::ShapeMismatch`] if depth and label grids differ in shape.
    /// - [`FrameError::PointCountMismatch`] if the point count is not the
    ///   number of nonzero depth pixels.
    /// - [`FrameError::PointLabelMismatch`] if point labels and points differ
    ///   in length.
    pub fn validate(&self) -> FrameResult<()> {
        // Deserialized grids may carry a buffer that disagrees with their shape.
        for grid in [&self.depth, &self.label] {
            let expected = grid.width() * grid.height();
            if grid.len() != expected {
                return Err(FrameError::buffer_mismatch(expected, grid.len()));
            }
        }

        if !self.depth.same_shape(&self.label) {
            return Err(FrameError::shape_mismatch(
                "label grid",
                self.depth.shape(),
                self.label.shape(),
            ));
        }

        let valid_pixels = self.depth.iter().filter(|&&d| d != 0).count();
        if self.points.len() != valid_pixels {
            return Err(FrameError::PointCountMismatch {
                points: self.points.len(),
                valid_pixels,
            });
        }

        if self.point_labels.len() != self.points.len() {
            return Err(FrameError::PointLabelMismatch {
                labels: self.point_labels.len(),
                points: self.points.len(),
            });
        }

        Ok(())
    }

    /// Image width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.depth.width()
    }

    /// Image height.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.depth.height()
    }

    /// Validity mask: `true` where depth is nonzero.
    #[must_use]
    pub fn valid_mask(&self) -> Mask {
        self.depth.map(|&d| d != 0)
    }

    /// Row-major pixel index of each point in the cloud.
    #[must_use]
    pub fn valid_pixel_indices(&self) -> Vec<usize> {
        self.depth
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| (d != 0).then_some(i))
            .collect()
    }

    /// Scatters the point cloud into an H×W point field, zero at invalid
    /// pixels.
    #[must_use]
    pub fn point_map(&self) -> VectorField {
        let mut field = Grid::new(self.width(), self.height(), Vector3::zeros());
        let cells = field.as_mut_slice();
        for (pixel, point) in self.valid_pixel_indices().into_iter().zip(&self.points) {
            cells[pixel] = point.coords;
        }
        field
    }

    /// Mask of pixels labelled `user_id` that also carry a depth reading.
    #[must_use]
    pub fn user_mask(&self, user_id: u16) -> Mask {
        Grid::from_fn(self.width(), self.height(), |row, col| {
            self.label[(row, col)] == user_id && self.depth[(row, col)] != 0
        })
    }

    /// The points labelled `user_id`, in cloud order.
    #[must_use]
    pub fn user_points(&self, user_id: u16) -> UserPoints {
        let mut out = UserPoints::default();
        let pixels = self.valid_pixel_indices();
        for ((pixel, point), &label) in pixels.into_iter().zip(&self.points).zip(&self.point_labels)
        {
            if label == user_id {
                out.pixels.push(pixel);
                out.points.push(*point);
            }
        }
        out
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn user(&self, user_id: u16) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    /// The user whose skeleton drives bone labelling: the last user, in
    /// frame order, with a non-empty joint set.
    #[must_use]
    pub fn skeleton_user(&self) -> Option<&User> {
        self.users.iter().rev().find(|user| user.has_skeleton())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::joint::{Joint, JointId};

    fn sample_frame() -> Frame {
        // 3x2 image:
        //   depth  [0, 1000, 1100]   label [0, 1, 1]
        //          [900, 0, 1200]          [2, 1, 1]
        let depth = Grid::from_vec(3, 2, vec![0, 1000, 1100, 900, 0, 1200]).unwrap();
        let label = Grid::from_vec(3, 2, vec![0, 1, 1, 2, 1, 1]).unwrap();
        let points = vec![
            Point3::new(1.0, 0.0, 1000.0),
            Point3::new(2.0, 0.0, 1100.0),
            Point3::new(0.0, -1.0, 900.0),
            Point3::new(2.0, -1.0, 1200.0),
        ];
        Frame::new(
            7,
            depth,
            label,
            points,
            vec![1, 1, 2, 1],
            vec![User::new(1), User::new(2)],
        )
        .unwrap()
    }

    #[test]
    fn frame_valid_pixels() {
        let frame = sample_frame();
        assert_eq!(frame.valid_pixel_indices(), vec![1, 2, 3, 5]);
        assert_eq!(frame.valid_mask().count(), 4);
    }

    #[test]
    fn frame_point_map() {
        let frame = sample_frame();
        let map = frame.point_map();
        assert_eq!(map[(0, 0)], Vector3::zeros());
        assert!((map[(0, 1)].z - 1000.0).abs() < f64::EPSILON);
        assert!((map[(1, 0)].z - 900.0).abs() < f64::EPSILON);
        assert!((map[(1, 2)].z - 1200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn frame_user_mask_excludes_invalid_depth() {
        let frame = sample_frame();
        let mask = frame.user_mask(1);
        // (1, 1) is labelled 1 but has no depth.
        assert!(!mask[(1, 1)]);
        assert_eq!(mask.count(), 3);
        assert_eq!(frame.user_mask(2).count(), 1);
        assert!(frame.user_mask(9).none());
    }

    #[test]
    fn frame_user_points() {
        let frame = sample_frame();
        let pts = frame.user_points(1);
        assert_eq!(pts.pixels, vec![1, 2, 5]);
        assert_eq!(pts.len(), 3);
        assert!(frame.user_points(5).is_empty());
    }

    #[test]
    fn frame_point_count_mismatch() {
        let mut frame = sample_frame();
        frame.points.pop();
        assert!(matches!(
            frame.validate(),
            Err(FrameError::PointCountMismatch {
                points: 3,
                valid_pixels: 4
            })
        ));
    }

    #[test]
    fn frame_point_label_mismatch() {
        let mut frame = sample_frame();
        frame.point_labels.push(1);
        assert!(matches!(
            frame.validate(),
            Err(FrameError::PointLabelMismatch { .. })
        ));
    }

    #[test]
    fn frame_shape_mismatch() {
        let mut frame = sample_frame();
        frame.label = Grid::new(2, 3, 0);
        assert!(matches!(
            frame.validate(),
            Err(FrameError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn frame_skeleton_user_is_last_with_joints() {
        let mut frame = sample_frame();
        assert!(frame.skeleton_user().is_none());

        let joint = Joint::new(JointId::HEAD, Point3::origin());
        frame.users = vec![
            User::with_joints(1, vec![joint.clone()]),
            User::with_joints(2, vec![joint]),
            User::with_joints(3, Vec::new()),
        ];
        assert_eq!(frame.skeleton_user().map(|u| u.id), Some(2));
        assert_eq!(frame.user(3).map(|u| u.id), Some(3));
    }

    #[test]
    fn empty_frame_is_valid() {
        let frame = Frame::empty(0, 4, 3);
        assert!(frame.validate().is_ok());
        assert!(frame.valid_pixel_indices().is_empty());
        assert!(frame.skeleton_user().is_none());
    }
}
