#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spatial grid, region mask, and cell indexing for hotspot evaluation.
//!
//! A [`Grid`] overlays a rectangular lattice of cells on a planar
//! (easting/northing, meters) coordinate system. A [`Mask`] marks which cells
//! of that rectangle fall outside the region of interest; the two together
//! form a [`MaskedGrid`], whose in-region cells are the universe every risk
//! model scores and every ranking covers.
//!
//! Cell coordinates are `(row, col)` pairs: row follows the northing axis,
//! col the easting axis. The canonical enumeration order is row-major
//! (row 0 first, col 0 first within a row); rankers rely on this order for
//! deterministic tie-breaking.

pub mod matrix;
pub mod region;

use std::collections::BTreeMap;

use thiserror::Error;

pub use matrix::RiskMatrix;

/// Errors produced while constructing or indexing grids.
#[derive(Debug, Error)]
pub enum GridError {
    /// Mask dimensions do not match the grid extents.
    #[error(
        "mask shape ({mask_rows}x{mask_cols}) does not match grid extents ({yextent}x{xextent})"
    )]
    MaskShapeMismatch {
        /// Rows in the mask.
        mask_rows: usize,
        /// Columns in the mask.
        mask_cols: usize,
        /// Grid height in cells.
        yextent: usize,
        /// Grid width in cells.
        xextent: usize,
    },

    /// Mask rows have inconsistent lengths.
    #[error("mask row {row} has {got} columns, expected {expected}")]
    RaggedMask {
        /// Index of the offending row.
        row: usize,
        /// Number of columns found.
        got: usize,
        /// Number of columns expected.
        expected: usize,
    },

    /// A grid dimension is zero or a cell size is non-positive.
    #[error("invalid grid geometry: {message}")]
    InvalidGeometry {
        /// Description of the bad parameter.
        message: String,
    },

    /// Failed to read the region file from disk.
    #[error("failed to read region file: {0}")]
    RegionIo(#[from] std::io::Error),

    /// Failed to parse the region file as `GeoJSON`.
    #[error("failed to parse region GeoJSON: {0}")]
    RegionParse(#[from] geojson::Error),

    /// The region file contained no polygon geometry.
    #[error("region file contains no polygon geometry")]
    EmptyRegion,
}

/// A cell address within a grid: 0-indexed `(row, col)`.
///
/// Signed so that events falling outside the grid rectangle still map to a
/// well-defined (possibly negative) key when counted. In-region cells always
/// have non-negative coordinates within the grid extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    /// Row index (northing axis).
    pub row: i64,
    /// Column index (easting axis).
    pub col: i64,
}

impl CellCoord {
    /// Creates a cell coordinate.
    #[must_use]
    pub const fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A rectangular lattice of cells over planar coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Cell width in meters (easting axis).
    pub xsize: f64,
    /// Cell height in meters (northing axis).
    pub ysize: f64,
    /// Easting of the grid origin.
    pub xoffset: f64,
    /// Northing of the grid origin.
    pub yoffset: f64,
    /// Number of cell columns.
    pub xextent: usize,
    /// Number of cell rows.
    pub yextent: usize,
}

impl Grid {
    /// Creates a grid, validating its geometry.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidGeometry`] if either cell size is not
    /// strictly positive or either extent is zero.
    pub fn new(
        xsize: f64,
        ysize: f64,
        xoffset: f64,
        yoffset: f64,
        xextent: usize,
        yextent: usize,
    ) -> Result<Self, GridError> {
        if !(xsize > 0.0 && ysize > 0.0) {
            return Err(GridError::InvalidGeometry {
                message: format!("cell size must be positive, got {xsize}x{ysize}"),
            });
        }
        if xextent == 0 || yextent == 0 {
            return Err(GridError::InvalidGeometry {
                message: format!("extents must be non-zero, got {xextent}x{yextent}"),
            });
        }
        Ok(Self {
            xsize,
            ysize,
            xoffset,
            yoffset,
            xextent,
            yextent,
        })
    }

    /// Maps a planar point to the cell containing it.
    ///
    /// The result may lie outside the grid rectangle (negative or beyond the
    /// extents); see [`count_points_per_cell`] for why that is allowed.
    #[must_use]
    pub fn cell_of(&self, x: f64, y: f64) -> CellCoord {
        #[allow(clippy::cast_possible_truncation)]
        let col = ((x - self.xoffset) / self.xsize).floor() as i64;
        #[allow(clippy::cast_possible_truncation)]
        let row = ((y - self.yoffset) / self.ysize).floor() as i64;
        CellCoord::new(row, col)
    }

    /// Whether a cell lies within the full grid rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        usize::try_from(cell.row).is_ok_and(|r| r < self.yextent)
            && usize::try_from(cell.col).is_ok_and(|c| c < self.xextent)
    }

    /// Planar coordinates of a cell's centre.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_centre(&self, cell: CellCoord) -> (f64, f64) {
        let x = self.xoffset + (cell.col as f64 + 0.5) * self.xsize;
        let y = self.yoffset + (cell.row as f64 + 0.5) * self.ysize;
        (x, y)
    }
}

/// A boolean exclusion matrix over a grid rectangle. `true` = excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    rows: usize,
    cols: usize,
    data: Vec<bool>,
}

impl Mask {
    /// Builds a mask from row-major rows of booleans.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::RaggedMask`] if the rows have differing lengths.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self, GridError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::RaggedMask {
                    row: i,
                    got: row.len(),
                    expected: cols,
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Builds an all-included mask (no cell excluded).
    #[must_use]
    pub fn all_included(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![false; rows * cols],
        }
    }

    pub(crate) fn from_flat(rows: usize, cols: usize, data: Vec<bool>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Mask shape as `(rows, cols)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether the cell at `(row, col)` is excluded from the region.
    #[must_use]
    pub fn is_excluded(&self, row: usize, col: usize) -> bool {
        self.data[row * self.cols + col]
    }
}

/// A grid plus the mask restricting it to the region of interest.
#[derive(Debug, Clone)]
pub struct MaskedGrid {
    grid: Grid,
    mask: Mask,
}

impl MaskedGrid {
    /// Couples a grid with its region mask.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MaskShapeMismatch`] unless the mask shape is
    /// exactly `(yextent, xextent)`.
    pub fn new(grid: Grid, mask: Mask) -> Result<Self, GridError> {
        let (mask_rows, mask_cols) = mask.shape();
        if mask_rows != grid.yextent || mask_cols != grid.xextent {
            return Err(GridError::MaskShapeMismatch {
                mask_rows,
                mask_cols,
                yextent: grid.yextent,
                xextent: grid.xextent,
            });
        }
        Ok(Self { grid, mask })
    }

    /// The underlying grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The region mask.
    #[must_use]
    pub const fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Whether an arbitrary cell is in-region: inside the rectangle and not
    /// excluded by the mask.
    #[must_use]
    pub fn is_in_region(&self, cell: CellCoord) -> bool {
        let (Ok(row), Ok(col)) = (usize::try_from(cell.row), usize::try_from(cell.col)) else {
            return false;
        };
        row < self.grid.yextent && col < self.grid.xextent && !self.mask.is_excluded(row, col)
    }

    /// Enumerates every in-region cell in canonical row-major order.
    ///
    /// This order (row 0 upward, col 0 rightward within each row) is the
    /// tie-break order used when ranking cells with equal risk.
    #[must_use]
    pub fn region_cells(&self) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        for row in 0..self.grid.yextent {
            for col in 0..self.grid.xextent {
                if !self.mask.is_excluded(row, col) {
                    #[allow(clippy::cast_possible_wrap)]
                    cells.push(CellCoord::new(row as i64, col as i64));
                }
            }
        }
        cells
    }

    /// Zeroes every out-of-region entry of a risk matrix in place.
    pub fn apply_mask(&self, matrix: &mut RiskMatrix) {
        for row in 0..self.grid.yextent {
            for col in 0..self.grid.xextent {
                if self.mask.is_excluded(row, col) {
                    matrix.set(row, col, 0.0);
                }
            }
        }
    }
}

/// Counts points per grid cell.
///
/// Points outside the grid rectangle are counted anyway under whatever
/// (possibly negative or out-of-range) cell key results; such keys never
/// appear in [`MaskedGrid::region_cells`] output, so downstream lookups
/// ignore them implicitly. Coincident points accumulate.
#[must_use]
pub fn count_points_per_cell<I>(points: I, grid: &Grid) -> BTreeMap<CellCoord, u64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut counts = BTreeMap::new();
    for (x, y) in points {
        *counts.entry(grid.cell_of(x, y)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x2() -> Grid {
        Grid::new(100.0, 100.0, 0.0, 0.0, 2, 2).unwrap()
    }

    #[test]
    fn cell_of_floors_toward_origin() {
        let grid = grid_2x2();
        assert_eq!(grid.cell_of(50.0, 150.0), CellCoord::new(1, 0));
        assert_eq!(grid.cell_of(0.0, 0.0), CellCoord::new(0, 0));
        assert_eq!(grid.cell_of(-1.0, 250.0), CellCoord::new(2, -1));
    }

    #[test]
    fn region_cells_row_major_and_unmasked_only() {
        let grid = grid_2x2();
        let mask = Mask::from_rows(&[vec![false, true], vec![false, false]]).unwrap();
        let masked = MaskedGrid::new(grid, mask).unwrap();
        assert_eq!(
            masked.region_cells(),
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn region_cells_never_include_masked() {
        let grid = Grid::new(10.0, 10.0, 0.0, 0.0, 4, 3).unwrap();
        let mask = Mask::from_rows(&[
            vec![true, false, true, false],
            vec![false, false, false, false],
            vec![true, true, true, true],
        ])
        .unwrap();
        let masked = MaskedGrid::new(grid, mask).unwrap();
        let cells = masked.region_cells();
        assert_eq!(cells.len(), 6);
        for cell in &cells {
            assert!(masked.is_in_region(*cell));
        }
        // No duplicates.
        let mut dedup = cells.clone();
        dedup.dedup();
        assert_eq!(dedup, cells);
    }

    #[test]
    fn mask_shape_mismatch_is_configuration_error() {
        let grid = grid_2x2();
        let mask = Mask::from_rows(&[vec![false, false]]).unwrap();
        assert!(matches!(
            MaskedGrid::new(grid, mask),
            Err(GridError::MaskShapeMismatch { .. })
        ));
    }

    #[test]
    fn ragged_mask_rejected() {
        assert!(matches!(
            Mask::from_rows(&[vec![false, false], vec![false]]),
            Err(GridError::RaggedMask { .. })
        ));
    }

    #[test]
    fn counts_conserve_in_rectangle_points() {
        let grid = grid_2x2();
        let points = vec![
            (50.0, 50.0),   // (0,0)
            (50.0, 50.0),   // (0,0) again: accumulates
            (150.0, 150.0), // (1,1)
            (-10.0, 50.0),  // out of rectangle, still counted under (0,-1)
        ];
        let counts = count_points_per_cell(points, &grid);
        assert_eq!(counts[&CellCoord::new(0, 0)], 2);
        assert_eq!(counts[&CellCoord::new(1, 1)], 1);
        assert_eq!(counts[&CellCoord::new(0, -1)], 1);

        let in_rect: u64 = counts
            .iter()
            .filter(|(cell, _)| grid.contains(**cell))
            .map(|(_, n)| n)
            .sum();
        assert_eq!(in_rect, 3);
    }

    #[test]
    fn cell_centre_offsets() {
        let grid = Grid::new(100.0, 100.0, 1000.0, 2000.0, 4, 4).unwrap();
        let (x, y) = grid.cell_centre(CellCoord::new(1, 2));
        assert!((x - 1250.0).abs() < f64::EPSILON);
        assert!((y - 2150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_geometry_rejected() {
        assert!(Grid::new(0.0, 100.0, 0.0, 0.0, 2, 2).is_err());
        assert!(Grid::new(100.0, 100.0, 0.0, 0.0, 0, 2).is_err());
    }
}
