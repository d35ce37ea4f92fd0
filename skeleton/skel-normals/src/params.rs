//! Parameters for normal estimation.

use crate::error::{NormalError, NormalResult};

/// Which input the estimator works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NormalMode {
    /// 3D point field: iterative 3×3 hole fill, tangents from the point
    /// gradients.
    #[default]
    Point,
    /// Scalar depth field: single grey dilation hole fill, pseudo-tangents
    /// from depth and a fixed pixel scale.
    Depth,
}

impl std::str::FromStr for NormalMode {
    type Err = NormalError;

    fn from_str(s: &str) -> NormalResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "point" | "points" => Ok(Self::Point),
            "depth" => Ok(Self::Depth),
            other => Err(NormalError::invalid_params(format!(
                "unknown normal mode {other:?} (expected \"point\" or \"depth\")"
            ))),
        }
    }
}

/// Parameters for surface-normal estimation.
///
/// # Example
///
/// ```
/// use skel_normals::{NormalMode, NormalParams};
///
/// let point = NormalParams::point();
/// assert_eq!(point.mode, NormalMode::Point);
/// assert_eq!(point.fill_iterations, 4);
///
/// let depth = NormalParams::depth().with_sigma(1.5);
/// assert_eq!(depth.dilation_size, 7);
/// assert!((depth.sigma - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NormalParams {
    /// Input mode.
    pub mode: NormalMode,

    /// Point mode: number of max-filter passes used to grow valid values
    /// into invalid pixels.
    pub fill_iterations: usize,

    /// Point mode: side of the square max-filter window (odd).
    pub fill_size: usize,

    /// Depth mode: side of the square grey-dilation window (odd).
    pub dilation_size: usize,

    /// Standard deviation of the Gaussian smoothing, in pixels.
    /// Zero disables smoothing.
    pub sigma: f64,

    /// Gaussian kernel radius in units of `sigma`.
    pub truncate: f64,

    /// Depth mode: real-world extent of one pixel per unit depth.
    pub pixel_scale: f64,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self::point()
    }
}

impl NormalParams {
    /// Point-field estimation.
    #[must_use]
    pub const fn point() -> Self {
        Self {
            mode: NormalMode::Point,
            fill_iterations: 4,
            fill_size: 3,
            dilation_size: 7,
            sigma: 1.0,
            truncate: 4.0,
            pixel_scale: 1e-3,
        }
    }

    /// Depth-only estimation.
    #[must_use]
    pub const fn depth() -> Self {
        Self {
            mode: NormalMode::Depth,
            ..Self::point()
        }
    }

    /// Preset for a mode.
    #[must_use]
    pub const fn for_mode(mode: NormalMode) -> Self {
        match mode {
            NormalMode::Point => Self::point(),
            NormalMode::Depth => Self::depth(),
        }
    }

    /// Set the Gaussian smoothing spread.
    #[must_use]
    pub const fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the number of point-mode fill passes.
    #[must_use]
    pub const fn with_fill_iterations(mut self, iterations: usize) -> Self {
        self.fill_iterations = iterations;
        self
    }

    /// Set the depth-mode dilation window.
    #[must_use]
    pub const fn with_dilation_size(mut self, size: usize) -> Self {
        self.dilation_size = size;
        self
    }

    /// Set the depth-mode pixel scale.
    #[must_use]
    pub const fn with_pixel_scale(mut self, scale: f64) -> Self {
        self.pixel_scale = scale;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`NormalError::InvalidParams`] if a window size is even or
    /// zero, `sigma` or `truncate` is negative or not finite, or
    /// `pixel_scale` is not a positive finite number.
    pub fn validate(&self) -> NormalResult<()> {
        for (name, size) in [
            ("fill_size", self.fill_size),
            ("dilation_size", self.dilation_size),
        ] {
            if size == 0 || size % 2 == 0 {
                return Err(NormalError::invalid_params(format!(
                    "{name} must be odd and positive, got {size}"
                )));
            }
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(NormalError::invalid_params(format!(
                "sigma must be non-negative, got {}",
                self.sigma
            )));
        }
        if !self.truncate.is_finite() || self.truncate < 0.0 {
            return Err(NormalError::invalid_params(format!(
                "truncate must be non-negative, got {}",
                self.truncate
            )));
        }
        if !self.pixel_scale.is_finite() || self.pixel_scale <= 0.0 {
            return Err(NormalError::invalid_params(format!(
                "pixel_scale must be positive, got {}",
                self.pixel_scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let p = NormalParams::point();
        assert_eq!(p.mode, NormalMode::Point);
        assert!(p.validate().is_ok());

        let d = NormalParams::depth();
        assert_eq!(d.mode, NormalMode::Depth);
        assert!((d.pixel_scale - 1e-3).abs() < f64::EPSILON);
        assert!(d.validate().is_ok());

        assert_eq!(NormalParams::default(), NormalParams::point());
        assert_eq!(NormalParams::for_mode(NormalMode::Depth), d);
    }

    #[test]
    fn test_builder_pattern() {
        let p = NormalParams::depth()
            .with_sigma(2.0)
            .with_dilation_size(5)
            .with_pixel_scale(2e-3)
            .with_fill_iterations(2);
        assert!((p.sigma - 2.0).abs() < f64::EPSILON);
        assert_eq!(p.dilation_size, 5);
        assert_eq!(p.fill_iterations, 2);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        assert!(NormalParams::point().with_sigma(-1.0).validate().is_err());
        assert!(NormalParams::point().with_sigma(f64::NAN).validate().is_err());
        assert!(NormalParams::depth().with_dilation_size(4).validate().is_err());
        assert!(NormalParams::depth().with_pixel_scale(0.0).validate().is_err());
        let mut p = NormalParams::point();
        p.fill_size = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("point".parse::<NormalMode>().unwrap(), NormalMode::Point);
        assert_eq!("Depth".parse::<NormalMode>().unwrap(), NormalMode::Depth);
        assert!("normal".parse::<NormalMode>().is_err());
    }
}
