//! Separable image filters over scalar grids.
//!
//! All filters extend the grid past its edges by half-sample symmetric
//! reflection (`d c b a | a b c d | d c b a`), so a filter never reads
//! outside the image and constant fields stay constant.

use skel_types::{FrameError, FrameResult, Mask, ScalarField};

/// Direction a 1D filter pass runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Down the columns: the row index varies.
    Vertical,
    /// Along the rows: the column index varies.
    Horizontal,
}

/// Maps an out-of-range index onto `0..n` by symmetric reflection.
///
/// `n` must be nonzero.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn reflect_index(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m < n { m } else { 2 * n - 1 - m }
}

/// Runs `f` over every line of `field` along `axis`.
///
/// `f` receives the input line and a same-length output buffer.
fn map_lines(field: &ScalarField, axis: Axis, f: impl Fn(&[f64], &mut [f64])) -> ScalarField {
    let (width, height) = field.shape();
    let mut out = field.clone();
    if field.is_empty() {
        return out;
    }

    match axis {
        Axis::Horizontal => {
            for (src, dst) in field
                .as_slice()
                .chunks_exact(width)
                .zip(out.as_mut_slice().chunks_exact_mut(width))
            {
                f(src, dst);
            }
        }
        Axis::Vertical => {
            let mut src = vec![0.0; height];
            let mut dst = vec![0.0; height];
            for col in 0..width {
                for (row, v) in src.iter_mut().enumerate() {
                    *v = field[(row, col)];
                }
                f(&src, &mut dst);
                for (row, v) in dst.iter().enumerate() {
                    out[(row, col)] = *v;
                }
            }
        }
    }
    out
}

#[allow(clippy::cast_possible_wrap)]
fn max_line(src: &[f64], dst: &mut [f64], radius: usize) {
    let n = src.len();
    let r = radius as isize;
    for (i, out) in dst.iter_mut().enumerate() {
        let i = i as isize;
        *out = (-r..=r)
            .map(|k| src[reflect_index(i + k, n)])
            .fold(f64::NEG_INFINITY, f64::max);
    }
}

#[allow(clippy::cast_possible_wrap)]
fn correlate_line(src: &[f64], dst: &mut [f64], weights: &[f64]) {
    let n = src.len();
    let r = (weights.len() / 2) as isize;
    for (i, out) in dst.iter_mut().enumerate() {
        let i = i as isize;
        *out = weights
            .iter()
            .zip(-r..=r)
            .map(|(w, k)| w * src[reflect_index(i + k, n)])
            .sum();
    }
}

fn gradient_line(src: &[f64], dst: &mut [f64]) {
    let n = src.len();
    if n < 2 {
        dst.fill(0.0);
        return;
    }
    dst[0] = src[1] - src[0];
    dst[n - 1] = src[n - 1] - src[n - 2];
    for i in 1..n - 1 {
        dst[i] = (src[i + 1] - src[i - 1]) * 0.5;
    }
}

/// Square maximum filter (grey dilation with a flat `size`×`size`
/// structuring element).
///
/// `size` should be odd; an even size behaves as the next odd size down.
#[must_use]
pub fn max_filter(field: &ScalarField, size: usize) -> ScalarField {
    let radius = size / 2;
    if radius == 0 {
        return field.clone();
    }
    let rows = map_lines(field, Axis::Horizontal, |s, d| max_line(s, d, radius));
    map_lines(&rows, Axis::Vertical, |s, d| max_line(s, d, radius))
}

/// Keeps `field` where `mask` is set and takes `fill` elsewhere.
///
/// # Errors
///
/// Returns [`FrameError::ShapeMismatch`] if the mask shape differs.
pub fn select(field: &ScalarField, mask: &Mask, fill: &ScalarField) -> FrameResult<ScalarField> {
    if !field.same_shape(fill) {
        return Err(FrameError::shape_mismatch(
            "fill field",
            field.shape(),
            fill.shape(),
        ));
    }
    let kept = field.zip_map(mask, |&v, &m| m.then_some(v))?;
    kept.zip_map(fill, |v, &f| v.unwrap_or(f))
}

/// Grows masked values into unmasked pixels.
///
/// Each pass replaces every unmasked pixel with the `size`×`size` maximum
/// of the previous pass; masked pixels always keep their input value. After
/// `iterations` passes, values have spread `iterations * (size / 2)` pixels.
///
/// # Errors
///
/// Returns [`FrameError::ShapeMismatch`] if the mask shape differs.
pub fn masked_grow(
    field: &ScalarField,
    mask: &Mask,
    size: usize,
    iterations: usize,
) -> FrameResult<ScalarField> {
    if !field.same_shape(mask) {
        return Err(FrameError::shape_mismatch("mask", field.shape(), mask.shape()));
    }
    let mut grow = field.clone();
    for _ in 0..iterations {
        let dilated = max_filter(&grow, size);
        for ((g, &d), &m) in grow.as_mut_slice().iter_mut().zip(dilated.iter()).zip(mask) {
            if !m {
                *g = d;
            }
        }
    }
    Ok(grow)
}

/// Normalised 1D Gaussian weights with radius `floor(truncate * sigma + 0.5)`.
///
/// Returns a single unit weight when `sigma` is zero.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (truncate * sigma + 0.5).floor().max(0.0) as usize;
    let r = radius as f64;
    let inv = -0.5 / (sigma * sigma);
    let mut weights: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - r;
            (inv * x * x).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Separable Gaussian smoothing.
#[must_use]
pub fn gaussian_filter(field: &ScalarField, sigma: f64, truncate: f64) -> ScalarField {
    let weights = gaussian_kernel(sigma, truncate);
    if weights.len() == 1 {
        return field.clone();
    }
    let rows = map_lines(field, Axis::Horizontal, |s, d| correlate_line(s, d, &weights));
    map_lines(&rows, Axis::Vertical, |s, d| correlate_line(s, d, &weights))
}

/// Finite-difference derivative along `axis`.
///
/// Central differences in the interior, one-sided at the two ends, and
/// zero when the axis has fewer than two samples.
#[must_use]
pub fn gradient(field: &ScalarField, axis: Axis) -> ScalarField {
    map_lines(field, axis, gradient_line)
}
