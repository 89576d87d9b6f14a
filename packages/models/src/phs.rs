//! Prospective hotspot (PHS) scoring.
//!
//! Each in-region cell accumulates a weighted kernel sum over the training
//! events that occurred strictly before the cutoff instant. An event at
//! elapsed time `dt` (measured in time units) and cell-centre distance `dd`
//! (measured in distance units) contributes according to the configured
//! weight scheme, with both axes normalised by their bandwidths so that
//! contributions vanish at and beyond the bandwidth.

use chrono::NaiveDateTime;
use hotspot_eval_events::{Event, TimeSpan};
use hotspot_eval_grid::{MaskedGrid, RiskMatrix};
use strum_macros::{AsRefStr, Display, EnumString};

/// Space-time decay scheme for PHS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PhsWeight {
    /// `(1 - t)(1 - d)` over normalised time `t` and distance `d`.
    Linear,
    /// `1 / ((1 + t)(1 + d))` over normalised time and distance, masked to
    /// the bandwidths.
    Classic,
}

impl PhsWeight {
    /// Weight for normalised elapsed time `t` and distance `d`, both already
    /// divided by their bandwidths. Zero at and beyond either bandwidth.
    #[must_use]
    pub fn evaluate(self, t: f64, d: f64) -> f64 {
        if !(0.0..1.0).contains(&t) || !(0.0..1.0).contains(&d) {
            return 0.0;
        }
        match self {
            Self::Linear => (1.0 - t) * (1.0 - d),
            Self::Classic => 1.0 / ((1.0 + t) * (1.0 + d)),
        }
    }
}

/// PHS parameters, validated at roster-expansion time.
#[derive(Debug, Clone, PartialEq)]
pub struct PhsParams {
    /// Atomic unit of time (e.g. `1W`).
    pub time_unit: TimeSpan,
    /// Time bandwidth, a multiple of the unit (e.g. `4W`).
    pub time_band: TimeSpan,
    /// Atomic unit of distance in meters (e.g. 100).
    pub dist_unit: f64,
    /// Distance bandwidth in meters, a multiple of the unit (e.g. 400).
    pub dist_band: f64,
    /// Decay scheme.
    pub weight: PhsWeight,
}

impl PhsParams {
    /// Time bandwidth expressed in time units.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time_band_units(&self) -> f64 {
        self.time_band.approx_seconds() as f64 / self.time_unit.approx_seconds() as f64
    }

    /// Distance bandwidth expressed in distance units.
    #[must_use]
    pub fn dist_band_units(&self) -> f64 {
        self.dist_band / self.dist_unit
    }
}

/// Scores the grid with the prospective hotspot kernel.
///
/// Events at or after `cutoff` are ignored entirely; the prediction must not
/// see the future it is evaluated against.
#[must_use]
pub fn score(
    train: &[Event],
    grid: &MaskedGrid,
    cutoff: NaiveDateTime,
    params: &PhsParams,
) -> RiskMatrix {
    let (rows, cols) = (grid.grid().yextent, grid.grid().xextent);
    let mut matrix = RiskMatrix::zeros(rows, cols);

    let time_band_units = params.time_band_units();
    let dist_band_units = params.dist_band_units();
    #[allow(clippy::cast_precision_loss)]
    let unit_seconds = params.time_unit.approx_seconds() as f64;

    // Precompute each contributing event's normalised elapsed time.
    let contributing: Vec<(f64, f64, f64)> = train
        .iter()
        .filter(|e| e.timestamp < cutoff)
        .map(|e| {
            #[allow(clippy::cast_precision_loss)]
            let elapsed_seconds = (cutoff - e.timestamp).num_seconds() as f64;
            let t = elapsed_seconds / unit_seconds / time_band_units;
            (t, e.x, e.y)
        })
        .filter(|(t, _, _)| *t < 1.0)
        .collect();

    for cell in grid.region_cells() {
        let (cx, cy) = grid.grid().cell_centre(cell);
        let mut total = 0.0;
        for &(t, ex, ey) in &contributing {
            let dist = ((ex - cx).powi(2) + (ey - cy).powi(2)).sqrt();
            let d = dist / params.dist_unit / dist_band_units;
            total += params.weight.evaluate(t, d);
        }
        matrix.set_at(cell, total);
    }
    matrix
}
