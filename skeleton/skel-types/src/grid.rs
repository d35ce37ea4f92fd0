//! Dense row-major image grids.
//!
//! Every per-pixel quantity in a frame (depth, user label, point field,
//! normal field, masks) is a [`Grid`] indexed by `(row, col)`, with row 0
//! at the top of the image.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::Vector3;

use crate::error::{FrameError, FrameResult};

/// A dense `height × width` grid stored in row-major order.
///
/// # Example
///
/// ```
/// use skel_types::Grid;
///
/// let mut grid = Grid::new(4, 3, 0u16);
/// grid[(1, 2)] = 7;
///
/// assert_eq!(grid.width(), 4);
/// assert_eq!(grid.height(), 3);
/// assert_eq!(grid.get(1, 2), Some(&7));
/// assert_eq!(grid.as_slice()[1 * 4 + 2], 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Raw sensor depth, `0` where the sensor returned no reading.
pub type DepthGrid = Grid<u16>;

/// Per-pixel label: user id in input frames, bone label in derived output.
pub type LabelGrid = Grid<u16>;

/// Per-pixel validity.
pub type Mask = Grid<bool>;

/// Single-channel floating point field.
pub type ScalarField = Grid<f64>;

/// Per-pixel 3D vectors (point positions, tangents).
pub type VectorField = Grid<Vector3<f64>>;

/// Per-pixel surface normals: each entry is exactly zero or unit length.
pub type NormalField = Grid<Vector3<f64>>;

impl<T: Clone> Grid<T> {
    /// Creates a grid filled with `value`.
    #[must_use]
    pub fn new(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wraps a row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::BufferSizeMismatch`] if `data.len()` is not
    /// `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> FrameResult<Self> {
        let expected = width * height;
        if data.len() != expected {
            return Err(FrameError::buffer_mismatch(expected, data.len()));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a grid by evaluating `f(row, col)` at every pixel.
    #[must_use]
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Image width (number of columns).
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Image height (number of rows).
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Total number of pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the grid has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if both grids have the same shape.
    #[must_use]
    pub const fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Gets the value at `(row, col)`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col)
    }

    /// Row-major backing slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable row-major backing slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the grid, returning its row-major buffer.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterates over values in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Applies `f` to every value, producing a new grid of the same shape.
    #[must_use]
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Combines two grids of the same shape pixel by pixel.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ShapeMismatch`] if the shapes differ.
    pub fn zip_map<U, V>(
        &self,
        other: &Grid<U>,
        mut f: impl FnMut(&T, &U) -> V,
    ) -> FrameResult<Grid<V>> {
        if !self.same_shape(other) {
            return Err(FrameError::shape_mismatch(
                "zipped grid",
                self.shape(),
                other.shape(),
            ));
        }
        Ok(Grid {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| f(a, b))
                .collect(),
        })
    }
}

impl Grid<bool> {
    /// Number of `true` pixels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Returns `true` if no pixel is set.
    #[must_use]
    pub fn none(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(col < self.width, "column {col} out of bounds");
        &self.data[row * self.width + col]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(col < self.width, "column {col} out of bounds");
        &mut self.data[row * self.width + col]
    }
}

impl<'a, T> IntoIterator for &'a Grid<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
