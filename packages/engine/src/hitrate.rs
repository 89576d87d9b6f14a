//! Hit-rate curves: ranked cells versus ground truth.

use std::collections::BTreeMap;

use hotspot_eval_grid::CellCoord;

use crate::EngineError;

/// Builds the running-total hit curve for a ranked cell list.
///
/// `curve[k]` is the total ground-truth event count in the top-`k` ranked
/// cells; `curve[0] == 0` so that a coverage too low to inspect any cell
/// scores zero hits. The curve is non-decreasing and its last entry is the
/// total ground truth across all ranked cells.
#[must_use]
pub fn hit_rate_curve(ranked: &[CellCoord], truth: &BTreeMap<CellCoord, u64>) -> Vec<u64> {
    let mut curve = Vec::with_capacity(ranked.len() + 1);
    let mut running = 0u64;
    curve.push(running);
    for cell in ranked {
        running += truth.get(cell).copied().unwrap_or(0);
        curve.push(running);
    }
    curve
}

/// Hits and hit percentage at one coverage rate.
///
/// The inspected prefix is `floor(coverage * total_cells)` cells. The
/// percentage is 0 when the test window had no events; an empty window is a
/// data condition, not an error.
///
/// # Errors
///
/// Returns [`EngineError::CoverageOutOfRange`] unless `coverage` is within
/// `[0, 1]`.
pub fn hits_at_coverage(
    curve: &[u64],
    coverage: f64,
    total_cells: usize,
    total_test_events: u64,
) -> Result<(u64, f64), EngineError> {
    if !(0.0..=1.0).contains(&coverage) {
        return Err(EngineError::CoverageOutOfRange { rate: coverage });
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (coverage * total_cells as f64).floor() as usize;
    let hits = curve[index.min(curve.len() - 1)];
    let pct = if total_test_events > 0 {
        #[allow(clippy::cast_precision_loss)]
        {
            hits as f64 / total_test_events as f64
        }
    } else {
        0.0
    };
    Ok((hits, pct))
}
