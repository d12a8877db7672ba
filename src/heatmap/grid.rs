//! Fixed-size grid of mean confidences.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Heatmap grid needs at least one row and one column, got {rows}x{cols}")]
    EmptyDimensions { rows: usize, cols: usize },
}

/// Content of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum HeatmapCell {
    /// No sample landed in the cell.
    #[default]
    Empty,
    /// Mean confidence of the samples in the cell.
    Mean { value: f64, samples: usize },
}

impl HeatmapCell {
    pub fn mean(&self) -> Option<f64> {
        match self {
            HeatmapCell::Empty => None,
            HeatmapCell::Mean { value, .. } => Some(*value),
        }
    }

    pub fn samples(&self) -> usize {
        match self {
            HeatmapCell::Empty => 0,
            HeatmapCell::Mean { samples, .. } => *samples,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, HeatmapCell::Empty)
    }
}

/// `rows x cols` grid addressed by `(row, col)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapGrid {
    rows: usize,
    cols: usize,
    cells: Vec<HeatmapCell>,
}

impl HeatmapGrid {
    /// Create a grid with every cell empty.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![HeatmapCell::Empty; rows * cols],
        })
    }

    /// Build a grid from `(row, col, confidence)` samples.
    ///
    /// Samples addressing a cell outside the grid are skipped.
    pub fn from_samples<I>(rows: usize, cols: usize, samples: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut grid = Self::new(rows, cols)?;
        let mut sums = vec![0.0; rows * cols];
        let mut counts = vec![0usize; rows * cols];

        for (row, col, confidence) in samples {
            if let Some(index) = grid.index(row, col) {
                sums[index] += confidence;
                counts[index] += 1;
            }
        }

        for (index, cell) in grid.cells.iter_mut().enumerate() {
            if counts[index] > 0 {
                *cell = HeatmapCell::Mean {
                    value: sums[index] / counts[index] as f64,
                    samples: counts[index],
                };
            }
        }

        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Flat index `row * cols + col`, if inside the grid.
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<HeatmapCell> {
        self.index(row, col).map(|index| self.cells[index])
    }

    /// Mean confidence of a cell; `None` when empty or outside the grid.
    pub fn mean(&self, row: usize, col: usize) -> Option<f64> {
        self.cell(row, col).and_then(|cell| cell.mean())
    }

    /// Cell containing normalized position `(norm_x, norm_y)`.
    ///
    /// Positions that are non-finite or fall outside `[0, 1)` have no cell.
    pub fn locate(&self, norm_x: f64, norm_y: f64) -> Option<(usize, usize)> {
        let col = (norm_x * self.cols as f64).floor();
        let row = (norm_y * self.rows as f64).floor();
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        self.index(row, col).map(|_| (row, col))
    }

    /// Iterate `(row, col, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, HeatmapCell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (index / cols, index % cols, *cell))
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            HeatmapGrid::new(0, 4),
            Err(GridError::EmptyDimensions { rows: 0, cols: 4 })
        );
        assert!(HeatmapGrid::new(3, 0).is_err());
    }

    #[test]
    fn test_same_cell_mean() {
        let grid = HeatmapGrid::from_samples(2, 2, vec![(1, 0, 0.2), (1, 0, 0.8)]).unwrap();
        let mean = grid.mean(1, 0).unwrap();
        assert!((mean - 0.5).abs() < 1e-12);
        assert_eq!(grid.cell(1, 0).unwrap().samples(), 2);
    }

    #[test]
    fn test_empty_cell_distinct_from_zero() {
        let grid = HeatmapGrid::from_samples(2, 2, vec![(0, 0, 0.0)]).unwrap();
        assert_eq!(grid.mean(0, 0), Some(0.0));
        assert_eq!(grid.cell(0, 1), Some(HeatmapCell::Empty));
        assert_eq!(grid.mean(0, 1), None);
        assert_eq!(grid.filled_cells(), 1);
    }

    #[test]
    fn test_out_of_grid_samples_skipped() {
        let grid = HeatmapGrid::from_samples(2, 3, vec![(2, 0, 1.0), (0, 3, 1.0)]).unwrap();
        assert_eq!(grid.filled_cells(), 0);
        assert_eq!(grid.cell(2, 0), None);
    }

    #[test]
    fn test_locate() {
        let grid = HeatmapGrid::new(4, 10).unwrap();
        assert_eq!(grid.locate(0.0, 0.0), Some((0, 0)));
        assert_eq!(grid.locate(0.55, 0.3), Some((1, 5)));
        assert_eq!(grid.locate(0.999, 0.999), Some((3, 9)));
        assert_eq!(grid.locate(1.0, 0.5), None);
        assert_eq!(grid.locate(-0.01, 0.5), None);
        assert_eq!(grid.locate(f64::NAN, 0.5), None);
        assert_eq!(grid.locate(0.5, f64::INFINITY), None);
    }

    #[test]
    fn test_iter_row_major() {
        let grid = HeatmapGrid::from_samples(2, 2, vec![(1, 1, 0.4)]).unwrap();
        let coords: Vec<(usize, usize)> = grid.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        let (_, _, last) = grid.iter().last().unwrap();
        assert_eq!(last.mean(), Some(0.4));
    }
}
