//! Tabular result output.
//!
//! [`ResultsWriter`] streams one [`ExperimentRecord`] row per
//! (window, model, parameter-combo, coverage-rate) tuple. Columns that do
//! not apply to a model are left empty. [`RisksWriter`] emits the short-run
//! per-cell risk table consumed by external plotting tools.

use std::io::Write;

use chrono::NaiveDate;
use hotspot_eval_grid::MaskedGrid;
use hotspot_eval_models::ModelSpec;
use serde::Serialize;

use crate::EngineError;
use crate::sweep::WindowDiagnostics;

/// One results row. Written once, never mutated.
///
/// Field order defines the CSV column order.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentRecord {
    /// Dataset identifier.
    pub dataset: String,
    /// Crime-type labels, joined with `_`.
    pub event_types: String,
    /// Grid cell width in meters.
    pub cell_width: f64,
    /// Test-window start date.
    pub eval_date: NaiveDate,
    /// Training length shorthand.
    pub train_len: String,
    /// Test length shorthand.
    pub test_len: String,
    /// Coverage rate evaluated.
    pub coverage_rate: f64,
    /// Total events in the test window.
    pub test_events: u64,
    /// Events captured within the covered cells.
    pub hit_count: u64,
    /// `hit_count / test_events`, or 0 for an empty test window.
    pub hit_pct: f64,
    /// Model kind name.
    pub model: String,
    /// Random model seed.
    pub rand_seed: Option<u64>,
    /// RHS bandwidth in meters.
    pub rhs_bandwidth: Option<f64>,
    /// PHS time unit shorthand.
    pub phs_time_unit: Option<String>,
    /// PHS time bandwidth shorthand.
    pub phs_time_band: Option<String>,
    /// PHS distance unit in meters.
    pub phs_dist_unit: Option<f64>,
    /// PHS distance bandwidth in meters.
    pub phs_dist_band: Option<f64>,
    /// PHS weight scheme name.
    pub phs_weight: Option<String>,
}

impl ExperimentRecord {
    /// Fills the model name and parameter columns from a spec, leaving the
    /// columns for other models' parameters empty.
    pub fn apply_model(&mut self, spec: &ModelSpec) {
        self.model = spec.kind().to_string();
        match spec {
            ModelSpec::Random { seed } => self.rand_seed = Some(*seed),
            ModelSpec::Rhs { bandwidth } => self.rhs_bandwidth = Some(*bandwidth),
            ModelSpec::Phs(params) => {
                self.phs_time_unit = Some(params.time_unit.to_string());
                self.phs_time_band = Some(params.time_band.to_string());
                self.phs_dist_unit = Some(params.dist_unit);
                self.phs_dist_band = Some(params.dist_band);
                self.phs_weight = Some(params.weight.to_string());
            }
            ModelSpec::Naive | ModelSpec::Ideal => {}
        }
    }
}

/// Streaming CSV writer for experiment records.
pub struct ResultsWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl ResultsWriter<std::fs::File> {
    /// Creates the results file, truncating any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &std::path::Path) -> Result<Self, EngineError> {
        let file = std::fs::File::create(path)?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> ResultsWriter<W> {
    /// Wraps any writer. The header row is emitted with the first record.
    pub fn from_writer(writer: W) -> Self {
        Self {
            inner: csv::Writer::from_writer(writer),
        }
    }

    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub fn write(&mut self, record: &ExperimentRecord) -> Result<(), EngineError> {
        self.inner.serialize(record)?;
        Ok(())
    }

    /// Flushes buffered rows to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> Result<(), EngineError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn into_inner(self) -> Result<W, EngineError> {
        self.inner
            .into_inner()
            .map_err(|e| EngineError::Io(e.into_error()))
    }
}

/// Per-cell risk table writer for short runs.
///
/// One row per in-region cell per window: the cell's indices, its centre
/// coordinates, and a `risk_<label>` / `rank_<label>` column pair for every
/// model in the roster (rank is 1-based, 1 = highest risk).
pub struct RisksWriter<W: Write> {
    inner: csv::Writer<W>,
    wrote_header: bool,
}

impl RisksWriter<std::fs::File> {
    /// Creates the risks file, truncating any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &std::path::Path) -> Result<Self, EngineError> {
        let file = std::fs::File::create(path)?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> RisksWriter<W> {
    /// Wraps any writer.
    pub fn from_writer(writer: W) -> Self {
        Self {
            inner: csv::Writer::from_writer(writer),
            wrote_header: false,
        }
    }

    /// Writes the per-cell risk and rank table for one window.
    ///
    /// # Errors
    ///
    /// Returns an error if a CSV write fails.
    #[allow(clippy::too_many_arguments)]
    pub fn write_window(
        &mut self,
        dataset: &str,
        event_types: &str,
        cell_width: f64,
        train_len: &str,
        test_len: &str,
        grid: &MaskedGrid,
        diagnostics: &WindowDiagnostics,
    ) -> Result<(), EngineError> {
        if !self.wrote_header {
            let mut header = vec![
                "dataset".to_string(),
                "event_types".to_string(),
                "cell_width".to_string(),
                "eval_date".to_string(),
                "train_len".to_string(),
                "test_len".to_string(),
                "rownum".to_string(),
                "colnum".to_string(),
                "easting".to_string(),
                "northing".to_string(),
            ];
            for model in &diagnostics.models {
                header.push(format!("risk_{}", model.label));
                header.push(format!("rank_{}", model.label));
            }
            self.inner.write_record(&header)?;
            self.wrote_header = true;
        }

        for cell in grid.region_cells() {
            let (x, y) = grid.grid().cell_centre(cell);
            let mut row = vec![
                dataset.to_string(),
                event_types.to_string(),
                cell_width.to_string(),
                diagnostics.test_start.to_string(),
                train_len.to_string(),
                test_len.to_string(),
                cell.row.to_string(),
                cell.col.to_string(),
                x.to_string(),
                y.to_string(),
            ];
            for model in &diagnostics.models {
                row.push(model.risk.at(cell).to_string());
                let rank = model
                    .ranked
                    .iter()
                    .position(|c| *c == cell)
                    .map_or_else(String::new, |i| (i + 1).to_string());
                row.push(rank);
            }
            self.inner.write_record(&row)?;
        }
        self.inner.flush()?;
        Ok(())
    }
}
