#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Hotspot evaluation engine.
//!
//! Ties the pieces together: for each rolling train/test window, every
//! configured model scores the masked grid, the in-region cells are ranked by
//! risk, and the ranking is converted to hit counts against the test window's
//! ground truth at each configured coverage rate. Results stream to a CSV
//! writer as they are produced; nothing is mutated after being written.

pub mod hitrate;
pub mod rank;
pub mod record;
pub mod sweep;

use hotspot_eval_grid::CellCoord;
use thiserror::Error;

pub use hitrate::{hit_rate_curve, hits_at_coverage};
pub use rank::{rank_cells, rank_tier_matrix};
pub use record::{ExperimentRecord, ResultsWriter, RisksWriter};
pub use sweep::{ModelDiagnostics, SweepPlan, SweepSummary, WindowDiagnostics, run_sweep};

/// Errors produced by the evaluation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to write CSV output.
    #[error("failed to write results CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to create or flush an output file.
    #[error("output I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Window derivation left the representable date range.
    #[error(transparent)]
    Window(#[from] hotspot_eval_events::EventError),

    /// A coverage rate outside `[0, 1]` was configured.
    #[error("coverage rate {rate} is outside [0, 1]")]
    CoverageOutOfRange {
        /// The offending rate.
        rate: f64,
    },

    /// A ranked cell list contained a cell excluded by the region mask.
    #[error("ranked cell {cell} is excluded by the region mask")]
    MaskedCellRanked {
        /// The offending cell.
        cell: CellCoord,
    },
}
