//! Evaluation grid covering a base raster.

use serde::{Deserialize, Serialize};

use crate::{SurveyError, SurveyResult};

/// A uniform 2-D sample mesh over `[0, width] x [0, height]`.
///
/// Stored as two row-major coordinate arrays of shape `(rows, cols)`.
/// Row `r` holds `y = ys[r]`, column `c` holds `x = xs[c]`, so row 0 is
/// `y = 0` (the top edge of the raster in pixel convention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationGrid {
    rows: usize,
    cols: usize,
    width: f64,
    height: f64,
    xs: Vec<f64>,
    ys: Vec<f64>,
    x_mesh: Vec<f64>,
    y_mesh: Vec<f64>,
}

impl EvaluationGrid {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Extent covered by the grid, `(width, height)`.
    pub fn extent(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Column coordinates (one per column).
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Row coordinates (one per row).
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Full X coordinate array, row-major.
    pub fn x_mesh(&self) -> &[f64] {
        &self.x_mesh
    }

    /// Full Y coordinate array, row-major.
    pub fn y_mesh(&self) -> &[f64] {
        &self.y_mesh
    }

    /// Coordinates of a cell.
    pub fn point(&self, row: usize, col: usize) -> Option<(f64, f64)> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some((self.xs[col], self.ys[row]))
    }

    /// Flat row-major index of a cell.
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Iterate `(x, y)` over all cells in row-major order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x_mesh.iter().copied().zip(self.y_mesh.iter().copied())
    }
}

/// Builds evaluation grids from raster dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridBuilder;

impl GridBuilder {
    /// Square mesh with `resolution` samples per axis.
    pub fn build(width: u32, height: u32, resolution: usize) -> SurveyResult<EvaluationGrid> {
        Self::build_with_shape(width, height, resolution, resolution)
    }

    /// Mesh with independent row and column counts.
    pub fn build_with_shape(
        width: u32,
        height: u32,
        rows: usize,
        cols: usize,
    ) -> SurveyResult<EvaluationGrid> {
        if width == 0 {
            return Err(invalid("width", "must be > 0"));
        }
        if height == 0 {
            return Err(invalid("height", "must be > 0"));
        }
        if rows == 0 || cols == 0 {
            return Err(invalid("resolution", "must be > 0"));
        }

        let xs = linspace(0.0, width as f64, cols);
        let ys = linspace(0.0, height as f64, rows);

        let mut x_mesh = Vec::with_capacity(rows * cols);
        let mut y_mesh = Vec::with_capacity(rows * cols);
        for &y in &ys {
            for &x in &xs {
                x_mesh.push(x);
                y_mesh.push(y);
            }
        }

        Ok(EvaluationGrid {
            rows,
            cols,
            width: width as f64,
            height: height as f64,
            xs,
            ys,
            x_mesh,
            y_mesh,
        })
    }
}

fn invalid(param: &str, message: &str) -> SurveyError {
    SurveyError::InvalidGrid {
        param: param.to_string(),
        message: message.to_string(),
    }
}

/// `num` evenly spaced samples over `[start, stop]`, both endpoints included.
///
/// A single sample sits at `start`. The last sample is pinned to `stop` so
/// the extent is hit exactly regardless of rounding in the step.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            values[num - 1] = stop;
            values
        }
    }
}
