//! The `jet` colour map.
//!
//! A 256-entry lookup table built by piecewise-linear interpolation of the
//! classic `jet` control points: dark blue at 0, through cyan, yellow and
//! red, to dark red at 1.

/// Number of table entries.
pub const JET_SIZE: usize = 256;

/// `(x, value)` control points for one channel.
type Knots = &'static [(f64, f64)];

const RED: Knots = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const GREEN: Knots = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const BLUE: Knots = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

fn interpolate(knots: Knots, x: f64) -> f64 {
    for pair in knots.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if x <= x1 {
            let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
            return (y0 + t * (y1 - y0)).clamp(0.0, 1.0);
        }
    }
    knots.last().map_or(0.0, |&(_, y)| y)
}

/// Jet colour lookup table.
///
/// # Example
///
/// ```
/// use skel_render::Jet;
///
/// let jet = Jet::new();
/// assert_eq!(jet.map(0.0), [0, 0, 127]);
/// assert_eq!(jet.map(1.0), [127, 0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct Jet {
    table: [[u8; 3]; JET_SIZE],
}

impl Default for Jet {
    fn default() -> Self {
        Self::new()
    }
}

impl Jet {
    /// Builds the table.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn new() -> Self {
        let mut table = [[0u8; 3]; JET_SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            let x = i as f64 / (JET_SIZE - 1) as f64;
            for (channel, knots) in entry.iter_mut().zip([RED, GREEN, BLUE]) {
                // Truncate, not round.
                *channel = (interpolate(knots, x) * 255.0) as u8;
            }
        }
        Self { table }
    }

    /// Colour for `x` in `[0, 1]`.
    ///
    /// Values outside the range clamp to the end colours; NaN maps to
    /// black.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn map(&self, x: f64) -> [u8; 3] {
        if x.is_nan() {
            return [0, 0, 0];
        }
        let index = (x * JET_SIZE as f64).floor().clamp(0.0, (JET_SIZE - 1) as f64) as usize;
        self.table[index]
    }

    /// The table entry at `index`.
    #[must_use]
    pub fn entry(&self, index: u8) -> [u8; 3] {
        self.table[usize::from(index)]
    }
}
