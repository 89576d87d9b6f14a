//! Retrospective hotspot (RHS) scoring.
//!
//! A purely spatial kernel-smoothed density over the training events: each
//! in-region cell accumulates a quartic kernel contribution from every event
//! within the bandwidth of its centre. No time weighting; the cutoff instant
//! plays no role.

use hotspot_eval_events::Event;
use hotspot_eval_grid::{MaskedGrid, RiskMatrix};

/// Quartic (biweight) kernel: `(1 - (d/h)^2)^2` for `d < h`, else 0.
#[must_use]
pub fn quartic(distance: f64, bandwidth: f64) -> f64 {
    if distance >= bandwidth {
        return 0.0;
    }
    let u = distance / bandwidth;
    let shoulder = 1.0 - u * u;
    shoulder * shoulder
}

/// Scores the grid with a quartic kernel density of the given bandwidth in
/// meters.
#[must_use]
pub fn score(train: &[Event], grid: &MaskedGrid, bandwidth: f64) -> RiskMatrix {
    let (rows, cols) = (grid.grid().yextent, grid.grid().xextent);
    let mut matrix = RiskMatrix::zeros(rows, cols);

    for cell in grid.region_cells() {
        let (cx, cy) = grid.grid().cell_centre(cell);
        let mut total = 0.0;
        for event in train {
            let dist = ((event.x - cx).powi(2) + (event.y - cy).powi(2)).sqrt();
            total += quartic(dist, bandwidth);
        }
        matrix.set_at(cell, total);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hotspot_eval_grid::{Grid, Mask};

    fn masked_grid(extent: usize) -> MaskedGrid {
        let grid = Grid::new(100.0, 100.0, 0.0, 0.0, extent, extent).unwrap();
        MaskedGrid::new(grid, Mask::all_included(extent, extent)).unwrap()
    }

    fn event(x: f64, y: f64) -> Event {
        let ts = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Event::new(ts, x, y)
    }

    #[test]
    fn quartic_kernel_shape() {
        assert!((quartic(0.0, 100.0) - 1.0).abs() < f64::EPSILON);
        assert!((quartic(50.0, 100.0) - 0.5625).abs() < 1e-12);
        assert!(quartic(100.0, 100.0).abs() < f64::EPSILON);
        assert!(quartic(150.0, 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn density_peaks_at_event_cell() {
        let grid = masked_grid(3);
        let matrix = score(&[event(150.0, 150.0)], &grid, 250.0);
        let centre = matrix.get(1, 1);
        assert!(centre > matrix.get(0, 0));
        assert!(centre > matrix.get(0, 1));
        // Symmetric neighbours score identically.
        assert!((matrix.get(0, 1) - matrix.get(1, 0)).abs() < 1e-12);
        assert!((matrix.get(0, 1) - matrix.get(2, 1)).abs() < 1e-12);
    }

    #[test]
    fn events_beyond_bandwidth_do_not_contribute() {
        let grid = masked_grid(2);
        // Event far outside the grid, bandwidth too small to reach any centre.
        let matrix = score(&[event(10_000.0, 10_000.0)], &grid, 250.0);
        assert_eq!(matrix, RiskMatrix::zeros(2, 2));
    }

    #[test]
    fn contributions_accumulate() {
        let grid = masked_grid(2);
        let one = score(&[event(50.0, 50.0)], &grid, 300.0);
        let two = score(&[event(50.0, 50.0), event(50.0, 50.0)], &grid, 300.0);
        assert!((two.get(0, 0) - 2.0 * one.get(0, 0)).abs() < 1e-12);
    }
}
