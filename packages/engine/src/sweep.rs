//! Sweep orchestration: every (window, model, coverage) combination, streamed
//! to the results writer as soon as it is computed.
//!
//! Short runs (at most two test dates) additionally collect per-model
//! diagnostics so the caller can write the per-cell risk table; long sweeps
//! skip that entirely to keep memory flat.

use std::io::Write;
use std::time::Instant;

use chrono::NaiveDate;
use hotspot_eval_events::{Event, EvalWindow, TimeSpan, events_between};
use hotspot_eval_grid::{CellCoord, MaskedGrid, RiskMatrix, count_points_per_cell};
use hotspot_eval_models::{Roster, ScoreContext};

use crate::EngineError;
use crate::hitrate::{hit_rate_curve, hits_at_coverage};
use crate::rank::{rank_cells, rank_tier_matrix};
use crate::record::{ExperimentRecord, ResultsWriter};

/// The maximum number of test dates for which diagnostics are collected.
const SHORT_RUN_WINDOWS: usize = 2;

/// Everything fixed for the duration of one sweep.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    /// Dataset identifier, copied into every record.
    pub dataset: String,
    /// Crime-type labels joined with `_`, copied into every record.
    pub event_types: String,
    /// Grid cell width in meters, copied into every record.
    pub cell_width: f64,
    /// Training window length.
    pub train_len: TimeSpan,
    /// Test window length.
    pub test_len: TimeSpan,
    /// Coverage rates to evaluate, each in `[0, 1]`.
    pub coverage_rates: Vec<f64>,
    /// Log a progress line every this many model runs; 0 disables.
    pub print_every: u64,
    /// Ordered test-window start dates.
    pub test_dates: Vec<NaiveDate>,
}

impl SweepPlan {
    /// Whether this sweep is short enough to collect per-cell diagnostics.
    #[must_use]
    pub fn is_short_run(&self) -> bool {
        self.test_dates.len() <= SHORT_RUN_WINDOWS
    }

    /// Checks the coverage rates up front so a bad configuration fails
    /// before any experiment runs.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CoverageOutOfRange`] for any rate outside
    /// `[0, 1]`.
    pub fn validate(&self) -> Result<(), EngineError> {
        for &rate in &self.coverage_rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(EngineError::CoverageOutOfRange { rate });
            }
        }
        Ok(())
    }
}

/// One model's short-run diagnostics for one window.
#[derive(Debug, Clone)]
pub struct ModelDiagnostics {
    /// The roster label.
    pub label: String,
    /// The masked risk matrix the model produced.
    pub risk: RiskMatrix,
    /// The coverage-tier matrix derived from the ranking.
    pub tier: RiskMatrix,
    /// The full descending ranking of in-region cells.
    pub ranked: Vec<CellCoord>,
}

/// All models' diagnostics for one window.
#[derive(Debug, Clone)]
pub struct WindowDiagnostics {
    /// The window's test-start date.
    pub test_start: NaiveDate,
    /// Per-model diagnostics, in roster order.
    pub models: Vec<ModelDiagnostics>,
}

/// What a finished sweep did.
#[derive(Debug, Default)]
pub struct SweepSummary {
    /// Model runs executed (windows x roster entries).
    pub experiments: u64,
    /// Result records written (experiments x coverage rates).
    pub records: u64,
    /// Wall-clock seconds per window, in window order.
    pub window_secs: Vec<f64>,
    /// Per-window diagnostics; empty unless the sweep was a short run.
    pub diagnostics: Vec<WindowDiagnostics>,
}

/// Runs the full sweep, streaming one record per
/// (window, model, coverage rate) to `results`.
///
/// Unrecognised model names in the roster were already collected at
/// expansion time; they are logged here and skipped. `events` must be
/// time-sorted and region-filtered.
///
/// # Errors
///
/// Returns an error for an out-of-range coverage rate, a window that leaves
/// the representable date range, or a failed write.
pub fn run_sweep<W: Write>(
    plan: &SweepPlan,
    roster: &Roster,
    events: &[Event],
    grid: &MaskedGrid,
    results: &mut ResultsWriter<W>,
) -> Result<SweepSummary, EngineError> {
    plan.validate()?;
    for name in &roster.unknown {
        log::error!("unrecognised model name {name:?}, skipping");
    }
    if roster.is_empty() {
        log::warn!("no runnable models configured, nothing to do");
        return Ok(SweepSummary::default());
    }

    let cells = grid.region_cells();
    let total_experiments = plan.test_dates.len() * roster.entries.len();
    let collect_diagnostics = plan.is_short_run();
    log::info!(
        "sweep: {} windows x {} models x {} coverage rates over {} in-region cells",
        plan.test_dates.len(),
        roster.entries.len(),
        plan.coverage_rates.len(),
        cells.len(),
    );

    let mut summary = SweepSummary::default();

    for &test_start in &plan.test_dates {
        let window_clock = Instant::now();
        let window = EvalWindow::around(test_start, plan.train_len, plan.test_len)?;
        let (train_start, train_end) = window.train_bounds();
        let (test_begin, test_end) = window.test_bounds();
        let train = events_between(events, train_start, train_end);
        let test = events_between(events, test_begin, test_end);
        let truth = count_points_per_cell(test.iter().map(|e| (e.x, e.y)), grid.grid());
        #[allow(clippy::cast_possible_truncation)]
        let total_test_events = test.len() as u64;
        log::debug!(
            "window {test_start}: {} training events, {total_test_events} test events",
            train.len(),
        );

        let ctx = ScoreContext {
            train,
            test,
            grid,
            cutoff: window.cutoff(),
        };

        let mut window_models = Vec::new();
        for entry in &roster.entries {
            let risk = entry.spec.score(&ctx);
            let ranked = rank_cells(&cells, &risk);
            let curve = hit_rate_curve(&ranked, &truth);

            for &coverage in &plan.coverage_rates {
                let (hit_count, hit_pct) =
                    hits_at_coverage(&curve, coverage, cells.len(), total_test_events)?;
                let mut record = ExperimentRecord {
                    dataset: plan.dataset.clone(),
                    event_types: plan.event_types.clone(),
                    cell_width: plan.cell_width,
                    eval_date: test_start,
                    train_len: plan.train_len.to_string(),
                    test_len: plan.test_len.to_string(),
                    coverage_rate: coverage,
                    test_events: total_test_events,
                    hit_count,
                    hit_pct,
                    model: String::new(),
                    rand_seed: None,
                    rhs_bandwidth: None,
                    phs_time_unit: None,
                    phs_time_band: None,
                    phs_dist_unit: None,
                    phs_dist_band: None,
                    phs_weight: None,
                };
                record.apply_model(&entry.spec);
                results.write(&record)?;
                summary.records += 1;
            }

            if collect_diagnostics {
                let tier = rank_tier_matrix(grid, &ranked, &plan.coverage_rates)?;
                window_models.push(ModelDiagnostics {
                    label: entry.label.clone(),
                    risk,
                    tier,
                    ranked,
                });
            }

            summary.experiments += 1;
            if plan.print_every > 0 && summary.experiments % plan.print_every == 0 {
                log::info!(
                    "experiment {}/{total_experiments} ({})",
                    summary.experiments,
                    entry.label,
                );
            }
        }

        if collect_diagnostics {
            summary.diagnostics.push(WindowDiagnostics {
                test_start,
                models: window_models,
            });
        }
        summary.window_secs.push(window_clock.elapsed().as_secs_f64());
    }

    results.flush()?;
    log_timing(&summary);
    Ok(summary)
}

fn log_timing(summary: &SweepSummary) {
    let total: f64 = summary.window_secs.iter().sum();
    let min = summary.window_secs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = summary.window_secs.iter().copied().fold(0.0_f64, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let avg = if summary.window_secs.is_empty() {
        0.0
    } else {
        total / summary.window_secs.len() as f64
    };
    log::info!(
        "sweep finished: {} experiments, {} records, {total:.2}s total \
         ({avg:.2}s avg, {:.2}s min, {max:.2}s max per window)",
        summary.experiments,
        summary.records,
        if min.is_finite() { min } else { 0.0 },
    );
}
