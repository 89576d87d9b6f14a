//! Sweep execution: config file in, CSV files out.

use std::path::{Path, PathBuf};
use std::time::Instant;

use hotspot_eval_engine::{ResultsWriter, RisksWriter, SweepPlan, run_sweep};
use hotspot_eval_events::{events_in_region, load::load_events, test_date_range};
use hotspot_eval_grid::region::{load_region, masked_grid_from_region};
use hotspot_eval_models::expand_roster;

use crate::{CliError, RunConfig};

/// Loads the config at `path` and runs the sweep it describes.
///
/// Writes `results_<label>.csv` to the output directory, plus
/// `risks_<label>.csv` when the sweep is short enough to collect per-cell
/// diagnostics.
///
/// # Errors
///
/// Returns an error for a bad config, unreadable inputs, invalid model
/// parameters, or a failed write.
pub fn run(path: &Path) -> Result<(), CliError> {
    let started = Instant::now();
    let config = RunConfig::load(path)?;
    log::info!("loaded config for dataset {:?} from {}", config.dataset, path.display());

    let events = load_events(&config.events_path, &config.load_options())?;
    let region = load_region(&config.region_path)?;
    let events = events_in_region(&events, &region);
    log::info!("{} events inside the region", events.len());

    let grid = masked_grid_from_region(
        &region,
        config.cell_width,
        config.cell_width,
        config.grid_xoffset,
        config.grid_yoffset,
    )?;

    let roster = expand_roster(&config.models, &config.param_lists()?)?;
    let test_dates = test_date_range(
        config.earliest_test_date,
        config.latest_test_date,
        config.step_span()?,
    )?;

    let plan = SweepPlan {
        dataset: config.dataset.clone(),
        event_types: config.event_types_label(),
        cell_width: config.cell_width,
        train_len: config.train_span()?,
        test_len: config.test_span()?,
        coverage_rates: config.coverage_rates.clone(),
        print_every: config.print_every,
        test_dates,
    };

    std::fs::create_dir_all(&config.output_dir)?;
    let results_path = output_path(&config, "results");
    let mut results = ResultsWriter::create(&results_path)?;
    let summary = run_sweep(&plan, &roster, &events, &grid, &mut results)?;
    log::info!(
        "wrote {} records to {}",
        summary.records,
        results_path.display()
    );

    if !summary.diagnostics.is_empty() {
        let risks_path = output_path(&config, "risks");
        let mut risks = RisksWriter::create(&risks_path)?;
        for window in &summary.diagnostics {
            risks.write_window(
                &plan.dataset,
                &plan.event_types,
                plan.cell_width,
                &plan.train_len.to_string(),
                &plan.test_len.to_string(),
                &grid,
                window,
            )?;
        }
        log::info!("wrote per-cell risks to {}", risks_path.display());
    }

    log::info!("sweep completed in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn output_path(config: &RunConfig, prefix: &str) -> PathBuf {
    config
        .output_dir
        .join(format!("{prefix}_{}.csv", config.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_use_run_label_over_dataset() {
        let mut config: RunConfig = toml::from_str(
            r#"
            dataset = "chicago_burglary"
            events_path = "events.csv"
            region_path = "region.geojson"
            cell_width = 250.0
            earliest_test_date = "2020-01-01"
            latest_test_date = "2020-01-15"
            train_len = "8W"
            test_len = "1W"
            coverage_rates = [0.1]
            models = ["naive"]
            output_dir = "out"
        "#,
        )
        .unwrap();

        assert_eq!(
            output_path(&config, "results"),
            PathBuf::from("out/results_chicago_burglary.csv")
        );
        config.run_label = Some("pilot".to_string());
        assert_eq!(
            output_path(&config, "risks"),
            PathBuf::from("out/risks_pilot.csv")
        );
    }
}
