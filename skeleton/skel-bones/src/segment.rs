//! Point-to-segment distance.
//!
//! Distances are measured to the finite segment between two endpoints,
//! not to the infinite line through them: points beyond either end are
//! measured to that endpoint.

use nalgebra::{Point3, Vector3};

use crate::error::{BoneError, BoneResult};

/// A finite line segment with a precomputed unit direction.
///
/// # Example
///
/// ```
/// use skel_bones::Segment;
/// use nalgebra::Point3;
///
/// let seg = Segment::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0)).unwrap();
///
/// assert!((seg.distance(&Point3::new(5.0, 0.0, 5.0)) - 5.0).abs() < 1e-12);
/// assert!((seg.distance(&Point3::new(0.0, 0.0, 15.0)) - 5.0).abs() < 1e-12);
/// assert!((seg.distance(&Point3::new(0.0, 0.0, -3.0)) - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    p1: Point3<f64>,
    p2: Point3<f64>,
    direction: Vector3<f64>,
    length: f64,
}

impl Segment {
    /// Creates a segment from `p1` to `p2`.
    ///
    /// # Errors
    ///
    /// Returns [`BoneError::DegenerateSegment`] if the endpoints coincide
    /// (or the length is not a number).
    pub fn new(p1: Point3<f64>, p2: Point3<f64>) -> BoneResult<Self> {
        let n = p2 - p1;
        let length = n.norm();
        if length.is_nan() || length <= 0.0 {
            return Err(BoneError::degenerate(p1, p2));
        }
        Ok(Self {
            p1,
            p2,
            direction: n / length,
            length,
        })
    }

    /// First endpoint.
    #[must_use]
    pub const fn p1(&self) -> Point3<f64> {
        self.p1
    }

    /// Second endpoint.
    #[must_use]
    pub const fn p2(&self) -> Point3<f64> {
        self.p2
    }

    /// Segment length.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Unit direction from `p1` to `p2`.
    #[must_use]
    pub const fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    /// Fractional position of the projection of `p` along the segment:
    /// 0 at `p1`, 1 at `p2`.
    #[must_use]
    pub fn projection(&self, p: &Point3<f64>) -> f64 {
        (p - self.p1).dot(&self.direction) / self.length
    }

    /// Euclidean distance from `p` to the segment.
    #[must_use]
    pub fn distance(&self, p: &Point3<f64>) -> f64 {
        let x = p - self.p1;
        let along = x.dot(&self.direction);
        let t = along / self.length;

        if t < 0.0 {
            x.norm()
        } else if t > 1.0 {
            (p - self.p2).norm()
        } else {
            (x - self.direction * along).norm()
        }
    }

    /// Closest point on the segment to `p`.
    #[must_use]
    pub fn closest_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let t = self.projection(p).clamp(0.0, 1.0);
        self.p1 + self.direction * (t * self.length)
    }
}

/// Distance from each point to the segment `p1 → p2`, in input order.
///
/// # Errors
///
/// Returns [`BoneError::DegenerateSegment`] if `p1 == p2`.
///
/// # Example
///
/// ```
/// use skel_bones::distances_to_segment;
/// use nalgebra::Point3;
///
/// let points = [Point3::new(5.0, 0.0, 5.0), Point3::new(0.0, 0.0, -3.0)];
/// let d = distances_to_segment(&points, Point3::origin(), Point3::new(0.0, 0.0, 10.0)).unwrap();
///
/// assert_eq!(d.len(), 2);
/// assert!((d[0] - 5.0).abs() < 1e-12);
/// assert!((d[1] - 3.0).abs() < 1e-12);
///
/// assert!(distances_to_segment(&points, Point3::origin(), Point3::origin()).is_err());
/// ```
pub fn distances_to_segment(
    points: &[Point3<f64>],
    p1: Point3<f64>,
    p2: Point3<f64>,
) -> BoneResult<Vec<f64>> {
    let segment = Segment::new(p1, p2)?;
    Ok(points.iter().map(|p| segment.distance(p)).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn z_segment() -> Segment {
        Segment::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0)).unwrap()
    }

    #[test]
    fn test_perpendicular_distance() {
        let seg = z_segment();
        let p = Point3::new(5.0, 0.0, 5.0);
        assert_eq!(seg.projection(&p), 0.5);
        assert_eq!(seg.distance(&p), 5.0);
    }

    #[test]
    fn test_clamped_to_endpoints() {
        let seg = z_segment();
        assert_eq!(seg.distance(&Point3::new(0.0, 0.0, 15.0)), 5.0);
        assert_eq!(seg.distance(&Point3::new(0.0, 0.0, -3.0)), 3.0);
    }

    #[test]
    fn test_endpoints_have_zero_distance() {
        let p1 = Point3::new(1.0, -2.0, 3.5);
        let p2 = Point3::new(-4.0, 7.0, 0.25);
        let seg = Segment::new(p1, p2).unwrap();
        assert_relative_eq!(seg.distance(&p1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(seg.distance(&p2), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_beyond_ends_uses_endpoint_distance() {
        let p1 = Point3::new(0.0, 0.0, 0.0);
        let p2 = Point3::new(2.0, 2.0, 0.0);
        let seg = Segment::new(p1, p2).unwrap();

        let before = Point3::new(-1.0, -3.0, 1.0);
        assert!(seg.projection(&before) < 0.0);
        assert_relative_eq!(seg.distance(&before), (before - p1).norm(), epsilon = 1e-12);

        let after = Point3::new(5.0, 3.0, -1.0);
        assert!(seg.projection(&after) > 1.0);
        assert_relative_eq!(seg.distance(&after), (after - p2).norm(), epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_segment() {
        let p = Point3::new(3.0, 3.0, 3.0);
        let err = Segment::new(p, p).unwrap_err();
        assert!(matches!(err, BoneError::DegenerateSegment { .. }));
    }

    #[test]
    fn test_nan_segment_is_degenerate() {
        let err = Segment::new(Point3::origin(), Point3::new(f64::NAN, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, BoneError::DegenerateSegment { .. }));
    }

    #[test]
    fn test_closest_point() {
        let seg = z_segment();
        let c = seg.closest_point(&Point3::new(3.0, 4.0, 7.0));
        assert_relative_eq!(c.coords, Vector3::new(0.0, 0.0, 7.0), epsilon = 1e-12);
        let c = seg.closest_point(&Point3::new(0.0, 1.0, 20.0));
        assert_relative_eq!(c.coords, Vector3::new(0.0, 0.0, 10.0), epsilon = 1e-12);
    }

    #[test]
    fn test_distances_preserve_order_and_length() {
        let points: Vec<_> = (0..20)
            .map(|i| Point3::new(f64::from(i), 1.0, 0.0))
            .collect();
        let d = distances_to_segment(&points, Point3::origin(), Point3::new(10.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(d.len(), points.len());
        for dist in &d[..=10] {
            assert_relative_eq!(*dist, 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(d[15], (25.0_f64 + 1.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_points() {
        let d = distances_to_segment(&[], Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(d.is_empty());
    }
}
