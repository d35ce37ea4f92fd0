//! Grid-to-image conversion and PNG output.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use skel_types::{Grid, LabelGrid, NormalField};
use tracing::debug;

use crate::colormap::Jet;
use crate::error::{RenderError, RenderResult};

fn image_for<T>(grid: &Grid<T>, mut pixel: impl FnMut(&T) -> [u8; 3]) -> RenderResult<RgbImage> {
    let too_large = || RenderError::TooLarge {
        width: grid.width(),
        height: grid.height(),
    };
    let width = u32::try_from(grid.width()).map_err(|_| too_large())?;
    let height = u32::try_from(grid.height()).map_err(|_| too_large())?;

    let mut img = RgbImage::new(width, height);
    for (out, value) in img.pixels_mut().zip(grid) {
        *out = Rgb(pixel(value));
    }
    Ok(img)
}

/// False-colours a label grid.
///
/// Labels are scaled by the largest label (or 1, if all are zero) and
/// mapped through [`Jet`], so background is dark blue and the highest
/// label dark red.
///
/// # Errors
///
/// Returns [`RenderError::TooLarge`] if the grid does not fit an image.
pub fn label_image(labels: &LabelGrid) -> RenderResult<RgbImage> {
    colour_labels(&Jet::new(), labels)
}

fn colour_labels(jet: &Jet, labels: &LabelGrid) -> RenderResult<RgbImage> {
    let scale = f64::from(labels.iter().copied().max().unwrap_or(0).max(1));
    image_for(labels, |&label| jet.map(f64::from(label) / scale))
}

/// Maps one normal component from `[-1, 1]` to `[0, 255]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn shade(component: f64) -> u8 {
    (255.0 * (0.5 + 0.5 * component)).clamp(0.0, 255.0).round() as u8
}

/// Encodes a normal field as RGB, one channel per axis.
///
/// # Errors
///
/// Returns [`RenderError::TooLarge`] if the grid does not fit an image.
pub fn normal_image(normals: &NormalField) -> RenderResult<RgbImage> {
    image_for(normals, |n| [shade(n.x), shade(n.y), shade(n.z)])
}

/// Writes `img` to `path` as PNG.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if the file cannot be created, or
/// [`RenderError::Encode`] if encoding fails.
pub fn write_png(path: &Path, img: &RgbImage) -> RenderResult<()> {
    let file = File::create(path).map_err(|e| RenderError::io(path, e))?;
    let encoder = PngEncoder::new(BufWriter::new(file));
    encoder.write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)?;
    Ok(())
}

/// Output file naming: `<prefix>-<index>.png`, index zero-padded.
///
/// # Example
///
/// ```
/// use skel_render::OutputPattern;
/// use std::path::PathBuf;
///
/// let pattern = OutputPattern::new("out/labels");
/// assert_eq!(pattern.path_for(42), PathBuf::from("out/labels-00042.png"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPattern {
    /// Path prefix, may include directories.
    pub prefix: String,
    /// Minimum digits in the frame index.
    pub digits: usize,
}

impl OutputPattern {
    /// Five-digit pattern for `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            digits: 5,
        }
    }

    /// Set the index width.
    #[must_use]
    pub const fn with_digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }

    /// Output path for frame `index`.
    #[must_use]
    pub fn path_for(&self, index: u64) -> PathBuf {
        PathBuf::from(format!(
            "{}-{:0width$}.png",
            self.prefix,
            index,
            width = self.digits
        ))
    }
}

/// Renders derived frame grids to numbered PNG files.
#[derive(Debug, Clone)]
pub struct RenderEncoder {
    pattern: OutputPattern,
    jet: Jet,
}

impl RenderEncoder {
    /// Creates an encoder writing to `pattern`.
    #[must_use]
    pub fn new(pattern: OutputPattern) -> Self {
        Self {
            pattern,
            jet: Jet::new(),
        }
    }

    /// The output naming pattern.
    #[must_use]
    pub const fn pattern(&self) -> &OutputPattern {
        &self.pattern
    }

    /// Writes the false-coloured label grid for frame `index`.
    ///
    /// # Errors
    ///
    /// See [`label_image`] and [`write_png`].
    pub fn write_labels(&self, index: u64, labels: &LabelGrid) -> RenderResult<PathBuf> {
        let img = colour_labels(&self.jet, labels)?;
        self.write(index, &img)
    }

    /// Writes the shaded normal field for frame `index`.
    ///
    /// # Errors
    ///
    /// See [`normal_image`] and [`write_png`].
    pub fn write_normals(&self, index: u64, normals: &NormalField) -> RenderResult<PathBuf> {
        let img = normal_image(normals)?;
        self.write(index, &img)
    }

    fn write(&self, index: u64, img: &RgbImage) -> RenderResult<PathBuf> {
        let path = self.pattern.path_for(index);
        write_png(&path, img)?;
        debug!(frame = index, path = %path.display(), "Wrote image");
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use skel_types::Vector3;

    #[test]
    fn test_shade() {
        assert_eq!(shade(-1.0), 0);
        assert_eq!(shade(0.0), 128);
        assert_eq!(shade(1.0), 255);
        assert_eq!(shade(2.0), 255);
        assert_eq!(shade(-2.0), 0);
    }

    #[test]
    fn test_normal_image() {
        let normals = Grid::from_vec(
            2,
            1,
            vec![Vector3::zeros(), Vector3::new(0.0, 0.0, -1.0)],
        )
        .unwrap();
        let img = normal_image(&normals).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [128, 128, 128]);
        assert_eq!(img.get_pixel(1, 0).0, [128, 128, 0]);
    }

    #[test]
    fn test_label_image_scaling() {
        let jet = Jet::new();
        let labels = Grid::from_vec(3, 2, vec![0, 1, 2, 4, 4, 0]).unwrap();
        let img = label_image(&labels).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, jet.map(0.0));
        assert_eq!(img.get_pixel(2, 0).0, jet.map(0.5));
        assert_eq!(img.get_pixel(0, 1).0, jet.map(1.0));
    }

    #[test]
    fn test_label_image_all_background() {
        let labels = Grid::new(4, 4, 0u16);
        let img = label_image(&labels).unwrap();
        assert!(img.pixels().all(|p| p.0 == [0, 0, 127]));
    }

    #[test]
    fn test_label_image_single_label_is_top_colour() {
        let labels = Grid::from_vec(2, 1, vec![0u16, 1]).unwrap();
        let img = label_image(&labels).unwrap();
        assert_eq!(img.get_pixel(1, 0).0, [127, 0, 0]);
    }

    #[test]
    fn test_output_pattern() {
        let pattern = OutputPattern::new("frames/normals");
        assert_eq!(pattern.path_for(0), PathBuf::from("frames/normals-00000.png"));
        assert_eq!(pattern.path_for(123_456), PathBuf::from("frames/normals-123456.png"));
        let short = OutputPattern::new("x").with_digits(2);
        assert_eq!(short.path_for(7), PathBuf::from("x-07.png"));
    }

    #[test]
    fn test_encoder_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("bones");
        let encoder = RenderEncoder::new(OutputPattern::new(prefix.to_string_lossy()));

        let labels = Grid::from_vec(2, 2, vec![0u16, 1, 2, 3]).unwrap();
        let path = encoder.write_labels(30, &labels).unwrap();
        assert_eq!(path, dir.path().join("bones-00030.png"));

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_encoder_writes_normals() {
        let dir = tempfile::tempdir().unwrap();
        let encoder =
            RenderEncoder::new(OutputPattern::new(dir.path().join("n").to_string_lossy()));
        let normals = Grid::new(3, 2, Vector3::new(0.0, 0.0, -1.0));
        let path = encoder.write_normals(1, &normals).unwrap();
        assert!(path.ends_with("n-00001.png"));
        assert!(path.exists());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("missing").join("out");
        let encoder = RenderEncoder::new(OutputPattern::new(prefix.to_string_lossy()));
        let err = encoder
            .write_labels(0, &Grid::new(1, 1, 0u16))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
