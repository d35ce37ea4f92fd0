//! Surface-normal estimation for point and depth fields.
//!
//! Both modes run the same pipeline: fill invalid pixels from their valid
//! neighbours, smooth with a Gaussian, differentiate along rows and
//! columns, cross the two tangents and normalise. They differ only in how
//! holes are filled and how tangents are built.
//!
//! Normals point towards the camera: a fronto-parallel plane yields
//! `(0, 0, -1)` in either mode.

use nalgebra::Vector3;
use rayon::prelude::*;
use skel_types::{Frame, FrameError, FrameResult, Grid, Mask, NormalField, ScalarField, VectorField};
use tracing::debug;

use crate::error::{NormalError, NormalResult};
use crate::filter::{Axis, gaussian_filter, gradient, masked_grow, max_filter, select};
use crate::params::{NormalMode, NormalParams};

/// Input surface for a single estimate.
#[derive(Debug, Clone, Copy)]
pub enum SurfaceInput<'a> {
    /// Per-pixel 3D positions.
    Points(&'a VectorField),
    /// Per-pixel depth.
    Depth(&'a ScalarField),
}

impl SurfaceInput<'_> {
    /// The estimation mode this input belongs to.
    #[must_use]
    pub const fn mode(&self) -> NormalMode {
        match self {
            Self::Points(_) => NormalMode::Point,
            Self::Depth(_) => NormalMode::Depth,
        }
    }

    /// Returns `(width, height)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        match self {
            Self::Points(field) => field.shape(),
            Self::Depth(field) => field.shape(),
        }
    }
}

/// Estimates per-pixel surface normals with fixed parameters.
///
/// # Example
///
/// ```
/// use skel_normals::{NormalEstimator, NormalParams, SurfaceInput};
/// use skel_types::Grid;
///
/// let depth = Grid::new(16, 16, 1000.0);
/// let mask = Grid::new(16, 16, true);
///
/// let estimator = NormalEstimator::new(NormalParams::depth()).unwrap();
/// let normals = estimator.estimate(SurfaceInput::Depth(&depth), &mask).unwrap();
///
/// let n = normals[(8, 8)];
/// assert!((n.z + 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct NormalEstimator {
    params: NormalParams,
}

impl NormalEstimator {
    /// Creates an estimator.
    ///
    /// # Errors
    ///
    /// Returns [`NormalError::InvalidParams`] if `params` fail validation.
    pub fn new(params: NormalParams) -> NormalResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The estimator parameters.
    #[must_use]
    pub const fn params(&self) -> &NormalParams {
        &self.params
    }

    /// Estimates normals over `mask`.
    ///
    /// The result has the input's shape. Every entry is either unit length
    /// or exactly zero, and is zero wherever `mask` is `false`.
    ///
    /// # Errors
    ///
    /// - [`NormalError::ModeMismatch`] if the input kind differs from the
    ///   configured mode
    /// - [`NormalError::Frame`] if the mask shape differs from the input
    pub fn estimate(&self, input: SurfaceInput<'_>, mask: &Mask) -> NormalResult<NormalField> {
        if input.mode() != self.params.mode {
            return Err(NormalError::ModeMismatch {
                expected: self.params.mode,
                actual: input.mode(),
            });
        }
        let (width, height) = input.shape();
        if (width, height) != mask.shape() {
            return Err(FrameError::shape_mismatch("mask", input.shape(), mask.shape()).into());
        }
        if mask.none() {
            return Ok(Grid::new(width, height, Vector3::zeros()));
        }

        let (a, b) = match input {
            SurfaceInput::Points(points) => self.point_tangents(points, mask)?,
            SurfaceInput::Depth(depth) => self.depth_tangents(depth, mask)?,
        };

        let normals = a.zip_map(&b, |a, b| unit_or_zero(a.cross(b)))?;
        Ok(normals.zip_map(mask, |&n, &m| if m { n } else { Vector3::zeros() })?)
    }

    /// Row and negated column tangents of the smoothed point field.
    fn point_tangents(
        &self,
        points: &VectorField,
        mask: &Mask,
    ) -> NormalResult<(VectorField, VectorField)> {
        let p = &self.params;
        let derivatives = (0..3)
            .into_par_iter()
            .map(|axis| {
                let channel = points.map(|v| v[axis]);
                let floor = channel.iter().copied().fold(f64::INFINITY, f64::min);
                let seeded = channel.zip_map(mask, |&v, &m| if m { v } else { floor })?;
                let grown = masked_grow(&seeded, mask, p.fill_size, p.fill_iterations)?;
                let smooth = gaussian_filter(&grown, p.sigma, p.truncate);
                Ok((
                    gradient(&smooth, Axis::Vertical),
                    gradient(&smooth, Axis::Horizontal),
                ))
            })
            .collect::<FrameResult<Vec<_>>>()?;

        let (width, height) = points.shape();
        let along_rows = Grid::from_fn(width, height, |r, c| {
            Vector3::from_fn(|axis, _| derivatives[axis].0[(r, c)])
        });
        let along_cols = Grid::from_fn(width, height, |r, c| {
            -Vector3::from_fn(|axis, _| derivatives[axis].1[(r, c)])
        });
        Ok((along_rows, along_cols))
    }

    /// Pseudo-tangents of the smoothed depth field, scaled by depth.
    fn depth_tangents(
        &self,
        depth: &ScalarField,
        mask: &Mask,
    ) -> NormalResult<(VectorField, VectorField)> {
        let p = &self.params;
        let valid = depth.zip_map(mask, |&d, &m| if m { d } else { 0.0 })?;
        let dilated = max_filter(&valid, p.dilation_size);
        let filled = select(&valid, mask, &dilated)?;
        let z = gaussian_filter(&filled, p.sigma, p.truncate);
        let dz_row = gradient(&z, Axis::Vertical);
        let dz_col = gradient(&z, Axis::Horizontal);

        let k = p.pixel_scale;
        let (width, height) = depth.shape();
        let along_cols = Grid::from_fn(width, height, |r, c| {
            Vector3::new(k * z[(r, c)], 0.0, dz_col[(r, c)])
        });
        let along_rows = Grid::from_fn(width, height, |r, c| {
            Vector3::new(0.0, -k * z[(r, c)], dz_row[(r, c)])
        });
        Ok((along_cols, along_rows))
    }
}

/// `v / |v|`, or zero if `|v|` is zero or not finite.
fn unit_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    let len = v.norm();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        Vector3::zeros()
    }
}

/// Estimates normals with `params`.
///
/// Convenience wrapper around [`NormalEstimator`].
///
/// # Errors
///
/// See [`NormalEstimator::new`] and [`NormalEstimator::estimate`].
pub fn estimate_normals(
    input: SurfaceInput<'_>,
    mask: &Mask,
    params: &NormalParams,
) -> NormalResult<NormalField> {
    NormalEstimator::new(params.clone())?.estimate(input, mask)
}

/// Frame-wide input, built once and masked per user.
enum FrameSurface {
    Points(VectorField),
    Depth(ScalarField),
}

impl FrameSurface {
    fn build(frame: &Frame, mode: NormalMode) -> Self {
        match mode {
            NormalMode::Point => Self::Points(frame.point_map()),
            NormalMode::Depth => Self::Depth(frame.depth.map(|&d| f64::from(d))),
        }
    }

    fn estimate_user(&self, estimator: &NormalEstimator, mask: &Mask) -> NormalResult<NormalField> {
        match self {
            Self::Points(points) => {
                let user = points.zip_map(mask, |v, &m| if m { *v } else { Vector3::zeros() })?;
                estimator.estimate(SurfaceInput::Points(&user), mask)
            }
            Self::Depth(depth) => {
                let user = depth.zip_map(mask, |&d, &m| if m { d } else { 0.0 })?;
                estimator.estimate(SurfaceInput::Depth(&user), mask)
            }
        }
    }
}

/// Normal field for a whole frame.
///
/// Each user is estimated independently over their own mask (pixels
/// carrying their label and a depth reading), so surfaces of different
/// users never blend. The per-user results are merged by writing each
/// user's pixels only; everything else stays zero.
///
/// # Errors
///
/// Returns [`NormalError::Frame`] if the frame is structurally invalid, or
/// [`NormalError::InvalidParams`] if `params` fail validation.
pub fn frame_normals(frame: &Frame, params: &NormalParams) -> NormalResult<NormalField> {
    frame.validate()?;
    let estimator = NormalEstimator::new(params.clone())?;

    let mut ids: Vec<u16> = frame
        .users
        .iter()
        .map(|user| user.id)
        .filter(|&id| id != 0)
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let surface = FrameSurface::build(frame, params.mode);
    let per_user = ids
        .par_iter()
        .filter_map(|&id| {
            let mask = frame.user_mask(id);
            (!mask.none()).then_some((id, mask))
        })
        .map(|(id, mask)| {
            let field = surface.estimate_user(&estimator, &mask)?;
            debug!(frame = frame.index, user = id, pixels = mask.count(), "Estimated normals");
            Ok((mask, field))
        })
        .collect::<NormalResult<Vec<_>>>()?;

    let mut normals = Grid::new(frame.width(), frame.height(), Vector3::zeros());
    for (mask, field) in &per_user {
        for ((out, &n), &m) in normals.as_mut_slice().iter_mut().zip(field).zip(mask) {
            if m {
                *out = n;
            }
        }
    }
    Ok(normals)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use skel_types::{Point3, User};

    const PITCH: f64 = 0.01;

    /// Fronto-parallel plane at z = 1, optionally tilted along x.
    fn plane_points(width: usize, height: usize, slope: f64) -> VectorField {
        Grid::from_fn(width, height, |r, c| {
            let x = c as f64 * PITCH;
            Vector3::new(x, -(r as f64) * PITCH, 1.0 + slope * x)
        })
    }

    fn interior(width: usize, height: usize, margin: usize) -> impl Iterator<Item = (usize, usize)> {
        (margin..height - margin).flat_map(move |r| (margin..width - margin).map(move |c| (r, c)))
    }

    fn assert_unit_or_zero(field: &NormalField, mask: &Mask) {
        for (n, &m) in field.iter().zip(mask) {
            if m {
                assert!(
                    *n == Vector3::zeros() || (n.norm() - 1.0).abs() < 1e-9,
                    "non-unit normal {n:?}"
                );
            } else {
                assert_eq!(*n, Vector3::zeros());
            }
        }
    }

    #[test]
    fn test_point_flat_plane_faces_camera() {
        let points = plane_points(16, 16, 0.0);
        let mask = Grid::new(16, 16, true);
        let normals = estimate_normals(SurfaceInput::Points(&points), &mask, &NormalParams::point())
            .unwrap();

        for (r, c) in interior(16, 16, 5) {
            let n = normals[(r, c)];
            assert_relative_eq!(n.x, 0.0, epsilon = 1e-9);
            assert_relative_eq!(n.y, 0.0, epsilon = 1e-9);
            assert_relative_eq!(n.z, -1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_point_tilted_plane() {
        let points = plane_points(16, 16, 0.5);
        let mask = Grid::new(16, 16, true);
        let normals = estimate_normals(SurfaceInput::Points(&points), &mask, &NormalParams::point())
            .unwrap();

        let expected = Vector3::new(0.5, 0.0, -1.0).normalize();
        for (r, c) in interior(16, 16, 5) {
            assert_relative_eq!(normals[(r, c)], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_depth_flat_plane_faces_camera() {
        let depth = Grid::new(16, 16, 1000.0);
        let mask = Grid::new(16, 16, true);
        let normals =
            estimate_normals(SurfaceInput::Depth(&depth), &mask, &NormalParams::depth()).unwrap();

        for n in &normals {
            assert_relative_eq!(*n, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_depth_slope_tilts_towards_x() {
        let depth = Grid::from_fn(16, 16, |_, c| 1000.0 + 2.0 * c as f64);
        let mask = Grid::new(16, 16, true);
        let normals =
            estimate_normals(SurfaceInput::Depth(&depth), &mask, &NormalParams::depth()).unwrap();

        for (r, c) in interior(16, 16, 5) {
            let z = depth[(r, c)] * 1e-3;
            let expected = Vector3::new(z * 2.0, 0.0, -z * z).normalize();
            assert_relative_eq!(normals[(r, c)], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_masked_pixels_are_zero() {
        let (w, h) = (12, 10);
        let mask = Grid::from_fn(w, h, |r, c| (r * 7 + c * 3) % 5 != 0);
        let depth = Grid::from_fn(w, h, |r, c| 900.0 + 40.0 * ((r as f64) * 0.7).sin() + 3.0 * c as f64);
        let points = Grid::from_fn(w, h, |r, c| {
            let d = depth[(r, c)] * 1e-3;
            Vector3::new(c as f64 * d * 1e-3, -(r as f64) * d * 1e-3, d)
        });

        let by_depth =
            estimate_normals(SurfaceInput::Depth(&depth), &mask, &NormalParams::depth()).unwrap();
        let by_points =
            estimate_normals(SurfaceInput::Points(&points), &mask, &NormalParams::point()).unwrap();

        assert_eq!(by_depth.shape(), (w, h));
        assert_unit_or_zero(&by_depth, &mask);
        assert_unit_or_zero(&by_points, &mask);
    }

    #[test]
    fn test_empty_mask_gives_zero_field() {
        let depth = Grid::new(5, 4, 1000.0);
        let mask = Grid::new(5, 4, false);
        let normals =
            estimate_normals(SurfaceInput::Depth(&depth), &mask, &NormalParams::depth()).unwrap();
        assert!(normals.iter().all(|n| *n == Vector3::zeros()));
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let points = plane_points(10, 8, 0.3);
        let mask = Grid::from_fn(10, 8, |r, c| r > 1 && c < 8);
        let estimator = NormalEstimator::new(NormalParams::point()).unwrap();
        let first = estimator.estimate(SurfaceInput::Points(&points), &mask).unwrap();
        let second = estimator.estimate(SurfaceInput::Points(&points), &mask).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mode_mismatch() {
        let depth = Grid::new(4, 4, 1000.0);
        let mask = Grid::new(4, 4, true);
        let estimator = NormalEstimator::new(NormalParams::point()).unwrap();
        let err = estimator.estimate(SurfaceInput::Depth(&depth), &mask).unwrap_err();
        assert!(matches!(
            err,
            NormalError::ModeMismatch {
                expected: NormalMode::Point,
                actual: NormalMode::Depth,
            }
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let depth = Grid::new(4, 4, 1000.0);
        let mask = Grid::new(4, 3, true);
        let err = estimate_normals(SurfaceInput::Depth(&depth), &mask, &NormalParams::depth())
            .unwrap_err();
        assert!(matches!(err, NormalError::Frame(FrameError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(NormalEstimator::new(NormalParams::depth().with_sigma(-0.5)).is_err());
    }

    /// Two users side by side on a flat wall, with a dropout column between.
    fn two_user_frame() -> Frame {
        let (w, h) = (12, 8);
        let depth = Grid::from_fn(w, h, |_, c| if c == 6 { 0 } else { 1000u16 });
        let label = Grid::from_fn(w, h, |_, c| if c < 6 { 1u16 } else { 2 });
        let mut points = Vec::new();
        let mut point_labels = Vec::new();
        for r in 0..h {
            for c in 0..w {
                if depth[(r, c)] != 0 {
                    points.push(Point3::new(c as f64 * PITCH, -(r as f64) * PITCH, 1.0));
                    point_labels.push(label[(r, c)]);
                }
            }
        }
        Frame::new(7, depth, label, points, point_labels, vec![User::new(1), User::new(2)])
            .unwrap()
    }

    #[test]
    fn test_frame_normals_per_user() {
        let frame = two_user_frame();
        for params in [NormalParams::point(), NormalParams::depth()] {
            let normals = frame_normals(&frame, &params).unwrap();
            assert_eq!(normals.shape(), (12, 8));
            assert_unit_or_zero(&normals, &frame.valid_mask());

            for r in 0..8 {
                assert_eq!(normals[(r, 6)], Vector3::zeros());
                assert!(normals[(r, 2)].z < 0.0);
                assert!(normals[(r, 9)].z < 0.0);
            }
        }
    }

    #[test]
    fn test_frame_normals_match_single_user_estimate() {
        let frame = two_user_frame();
        let params = NormalParams::point();
        let merged = frame_normals(&frame, &params).unwrap();

        let mask = frame.user_mask(2);
        let points = frame
            .point_map()
            .zip_map(&mask, |v, &m| if m { *v } else { Vector3::zeros() })
            .unwrap();
        let alone = estimate_normals(SurfaceInput::Points(&points), &mask, &params).unwrap();

        for (i, &m) in mask.iter().enumerate() {
            if m {
                assert_eq!(merged.as_slice()[i], alone.as_slice()[i]);
            }
        }
    }

    #[test]
    fn test_frame_normals_no_users() {
        let frame = Frame::empty(0, 6, 4);
        let normals = frame_normals(&frame, &NormalParams::depth()).unwrap();
        assert_eq!(normals.shape(), (6, 4));
        assert!(normals.iter().all(|n| *n == Vector3::zeros()));
    }

    #[test]
    fn test_frame_normals_ignores_unlisted_labels() {
        let mut frame = two_user_frame();
        frame.users.truncate(1);
        let normals = frame_normals(&frame, &NormalParams::depth()).unwrap();
        for r in 0..8 {
            assert_ne!(normals[(r, 2)], Vector3::zeros());
            assert_eq!(normals[(r, 9)], Vector3::zeros());
        }
    }
}
