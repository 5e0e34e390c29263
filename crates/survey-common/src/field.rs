//! Scalar field estimated over an evaluation grid.

use crate::EvaluationGrid;

/// One estimate per grid cell, row-major, matching the grid's shape.
///
/// `None` marks a cell where the estimator has no defined value (for
/// example outside the convex hull of the sources). It is never a
/// stand-in for zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    rows: usize,
    cols: usize,
    cells: Vec<Option<f64>>,
}

impl ScalarField {
    /// Build a field from row-major cells. Returns `None` on shape mismatch.
    pub fn new(rows: usize, cols: usize, cells: Vec<Option<f64>>) -> Option<Self> {
        if cells.len() != rows * cols {
            return None;
        }
        Some(Self { rows, cols, cells })
    }

    /// A field with every cell undefined.
    pub fn undefined(grid: &EvaluationGrid) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            cells: vec![None; grid.len()],
        }
    }

    /// Evaluate `f` at every grid point in row-major order.
    pub fn from_fn<F>(grid: &EvaluationGrid, f: F) -> Self
    where
        F: FnMut((f64, f64)) -> Option<f64>,
    {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            cells: grid.points().map(f).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    /// Number of cells holding a value.
    pub fn defined_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn undefined_count(&self) -> usize {
        self.cells.len() - self.defined_count()
    }

    pub fn is_all_undefined(&self) -> bool {
        self.cells.iter().all(|c| c.is_none())
    }

    /// Min and max over defined cells.
    pub fn defined_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
