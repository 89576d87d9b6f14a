//! Cell ranking and rank-tier discretisation.

use hotspot_eval_grid::{CellCoord, MaskedGrid, RiskMatrix};

use crate::EngineError;

/// Ranks in-region cells by descending risk score.
///
/// The sort is stable and keyed only on score, so cells with equal scores
/// keep their relative input order. Callers supply `cells` in the canonical
/// row-major enumeration order, which makes the tie-break deterministic:
/// among equal scores, the cell enumerated first ranks first.
#[must_use]
pub fn rank_cells(cells: &[CellCoord], risk: &RiskMatrix) -> Vec<CellCoord> {
    let mut ranked = cells.to_vec();
    ranked.sort_by(|a, b| risk.at(*b).total_cmp(&risk.at(*a)));
    ranked
}

/// Buckets a ranked cell list into coverage tiers for map rendering.
///
/// Cells within the first cutoff fraction of the ranking get tier score 0
/// (hottest); each later band gets the next evenly-spaced score up to 1
/// (coldest). The cutoffs are sorted internally, so the configured coverage
/// rates can be passed in any order. Out-of-region cells stay at 0 and are
/// distinguishable by the mask.
///
/// # Errors
///
/// Returns [`EngineError::MaskedCellRanked`] if the ranking mentions a cell
/// the mask excludes.
pub fn rank_tier_matrix(
    grid: &MaskedGrid,
    ranked: &[CellCoord],
    cutoffs: &[f64],
) -> Result<RiskMatrix, EngineError> {
    let mut sorted_cutoffs = cutoffs.to_vec();
    sorted_cutoffs.sort_by(f64::total_cmp);

    let (rows, cols) = (grid.grid().yextent, grid.grid().xextent);
    let mut tiers = RiskMatrix::zeros(rows, cols);

    #[allow(clippy::cast_precision_loss)]
    let num_cells = ranked.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let tier_step = 1.0 / sorted_cutoffs.len() as f64;

    let mut tier = 0usize;
    for (i, cell) in ranked.iter().enumerate() {
        if !grid.is_in_region(*cell) {
            return Err(EngineError::MaskedCellRanked { cell: *cell });
        }
        #[allow(clippy::cast_precision_loss)]
        let position = i as f64 / num_cells;
        while tier < sorted_cutoffs.len() && position >= sorted_cutoffs[tier] {
            tier += 1;
        }
        #[allow(clippy::cast_precision_loss)]
        tiers.set_at(*cell, tier as f64 * tier_step);
    }
    Ok(tiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotspot_eval_grid::{Grid, Mask};

    fn open_grid_2x2() -> MaskedGrid {
        let grid = Grid::new(100.0, 100.0, 0.0, 0.0, 2, 2).unwrap();
        MaskedGrid::new(grid, Mask::all_included(2, 2)).unwrap()
    }

    fn cell(row: i64, col: i64) -> CellCoord {
        CellCoord::new(row, col)
    }

    #[test]
    fn ranks_by_descending_score_with_canonical_tiebreak() {
        // Scenario: naive counts [[3,0],[0,1]] over a 2x2 grid.
        let grid = open_grid_2x2();
        let mut risk = RiskMatrix::zeros(2, 2);
        risk.set(0, 0, 3.0);
        risk.set(1, 1, 1.0);

        let ranked = rank_cells(&grid.region_cells(), &risk);
        assert_eq!(
            ranked,
            vec![cell(0, 0), cell(1, 1), cell(0, 1), cell(1, 0)]
        );
    }

    #[test]
    fn ranking_is_a_permutation() {
        let grid = open_grid_2x2();
        let cells = grid.region_cells();
        let mut risk = RiskMatrix::zeros(2, 2);
        risk.set(0, 1, 2.5);
        risk.set(1, 0, 7.0);

        let ranked = rank_cells(&cells, &risk);
        assert_eq!(ranked.len(), cells.len());
        let mut sorted_input = cells.clone();
        sorted_input.sort_unstable();
        let mut sorted_output = ranked;
        sorted_output.sort_unstable();
        assert_eq!(sorted_input, sorted_output);
    }

    #[test]
    fn reranking_is_idempotent() {
        let grid = open_grid_2x2();
        let mut risk = RiskMatrix::zeros(2, 2);
        risk.set(0, 0, 1.0);
        risk.set(0, 1, 1.0);
        risk.set(1, 0, 5.0);

        let once = rank_cells(&grid.region_cells(), &risk);
        let twice = rank_cells(&once, &risk);
        assert_eq!(once, twice);
    }

    #[test]
    fn equal_scores_everywhere_preserve_canonical_order() {
        let grid = open_grid_2x2();
        let cells = grid.region_cells();
        let risk = RiskMatrix::zeros(2, 2);
        assert_eq!(rank_cells(&cells, &risk), cells);
    }

    #[test]
    fn tier_matrix_buckets_by_coverage() {
        let grid = open_grid_2x2();
        let mut risk = RiskMatrix::zeros(2, 2);
        risk.set(0, 0, 3.0);
        risk.set(1, 1, 1.0);
        let ranked = rank_cells(&grid.region_cells(), &risk);

        // Cutoffs at 25% and 50%: rank 0 is tier 0, rank 1 tier 0.5,
        // ranks 2-3 tier 1.
        let tiers = rank_tier_matrix(&grid, &ranked, &[0.25, 0.5]).unwrap();
        assert!(tiers.get(0, 0).abs() < f64::EPSILON);
        assert!((tiers.get(1, 1) - 0.5).abs() < f64::EPSILON);
        assert!((tiers.get(0, 1) - 1.0).abs() < f64::EPSILON);
        assert!((tiers.get(1, 0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tier_matrix_rejects_masked_cells() {
        let grid = Grid::new(100.0, 100.0, 0.0, 0.0, 2, 2).unwrap();
        let mask = Mask::from_rows(&[vec![false, true], vec![false, false]]).unwrap();
        let masked = MaskedGrid::new(grid, mask).unwrap();
        let bogus = vec![cell(0, 1)];
        assert!(matches!(
            rank_tier_matrix(&masked, &bogus, &[0.5]),
            Err(EngineError::MaskedCellRanked { .. })
        ));
    }
}
