//! Dense per-cell score matrix.
//!
//! A [`RiskMatrix`] has the same shape as its grid rectangle. Only in-region
//! entries are meaningful; masked entries are held at zero and never ranked.

use crate::CellCoord;

/// A `(yextent, xextent)` matrix of per-cell scores.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl RiskMatrix {
    /// Creates a zero-filled matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Matrix shape as `(rows, cols)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Score at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Sets the score at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Adds to the score at `(row, col)`.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] += value;
    }

    /// Score at a cell coordinate, or 0 for cells outside the rectangle.
    ///
    /// Out-of-rectangle lookups return zero so that the signed cell keys
    /// produced by event counting can be probed without bounds juggling.
    #[must_use]
    pub fn at(&self, cell: CellCoord) -> f64 {
        match (usize::try_from(cell.row), usize::try_from(cell.col)) {
            (Ok(row), Ok(col)) if row < self.rows && col < self.cols => self.get(row, col),
            _ => 0.0,
        }
    }

    /// Sets the score at a cell coordinate; ignores out-of-rectangle cells.
    pub fn set_at(&mut self, cell: CellCoord, value: f64) {
        if let (Ok(row), Ok(col)) = (usize::try_from(cell.row), usize::try_from(cell.col))
            && row < self.rows
            && col < self.cols
        {
            self.set(row, col, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_roundtrip() {
        let mut m = RiskMatrix::zeros(2, 3);
        m.set(1, 2, 4.5);
        assert!((m.get(1, 2) - 4.5).abs() < f64::EPSILON);
        assert!((m.at(CellCoord::new(1, 2)) - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_rectangle_reads_zero() {
        let m = RiskMatrix::zeros(2, 2);
        assert!(m.at(CellCoord::new(-1, 0)).abs() < f64::EPSILON);
        assert!(m.at(CellCoord::new(0, 5)).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_rectangle_writes_ignored() {
        let mut m = RiskMatrix::zeros(2, 2);
        m.set_at(CellCoord::new(-1, 0), 9.0);
        m.set_at(CellCoord::new(0, 3), 9.0);
        assert_eq!(m, RiskMatrix::zeros(2, 2));
    }
}
