//! TOML sweep configuration.
//!
//! One config file describes one sweep: the dataset and its loading options,
//! the grid, the evaluation date range, the coverage rates, and the model
//! roster with its parameter lists. Durations use the `"8W"` shorthand and
//! are parsed into [`TimeSpan`]s during conversion, so a typo fails before
//! any data is loaded.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hotspot_eval_events::{TimeSpan, load::LoadOptions};
use hotspot_eval_models::{ParamLists, PhsWeight};
use serde::Deserialize;

use crate::CliError;

fn default_date_format() -> String {
    "%m/%d/%Y %I:%M:%S %p".to_string()
}

fn default_print_every() -> u64 {
    100
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// One sweep, as described by its TOML config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Dataset identifier, copied into every output record.
    pub dataset: String,
    /// Crime-type labels to keep; empty keeps everything.
    #[serde(default)]
    pub crime_types: Vec<String>,
    /// Path to the events CSV.
    pub events_path: PathBuf,
    /// Path to the region GeoJSON.
    pub region_path: PathBuf,
    /// Grid cell width in meters (cells are square).
    pub cell_width: f64,
    /// Grid origin easting offset in meters.
    #[serde(default)]
    pub grid_xoffset: f64,
    /// Grid origin northing offset in meters.
    #[serde(default)]
    pub grid_yoffset: f64,
    /// strftime format of the events timestamp column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Whether event coordinates are in survey feet.
    #[serde(default)]
    pub coords_in_feet: bool,
    /// First test-window start date, as an ISO `"YYYY-MM-DD"` string.
    pub earliest_test_date: NaiveDate,
    /// Last candidate test-window start date (inclusive), as an ISO
    /// `"YYYY-MM-DD"` string.
    pub latest_test_date: NaiveDate,
    /// Training window length shorthand, e.g. `"8W"`.
    pub train_len: String,
    /// Test window length shorthand, e.g. `"1W"`.
    pub test_len: String,
    /// Step between test-window starts; defaults to `test_len`.
    #[serde(default)]
    pub test_date_step: Option<String>,
    /// Coverage rates to evaluate, each in `[0, 1]`.
    pub coverage_rates: Vec<f64>,
    /// Model names to run, e.g. `["naive", "phs"]`.
    pub models: Vec<String>,
    /// Number of seeded random runs when `random` is requested.
    #[serde(default)]
    pub num_random: u32,
    /// RHS bandwidths in meters when `rhs` is requested.
    #[serde(default)]
    pub rhs_bandwidths: Vec<f64>,
    /// PHS atomic time units when `phs` is requested.
    #[serde(default)]
    pub phs_time_units: Vec<String>,
    /// PHS time bandwidths.
    #[serde(default)]
    pub phs_time_bands: Vec<String>,
    /// PHS atomic distance units in meters.
    #[serde(default)]
    pub phs_dist_units: Vec<f64>,
    /// PHS distance bandwidths in meters.
    #[serde(default)]
    pub phs_dist_bands: Vec<f64>,
    /// PHS weight scheme names (`"linear"`, `"classic"`).
    #[serde(default)]
    pub phs_weights: Vec<String>,
    /// Log a progress line every this many model runs; 0 disables.
    #[serde(default = "default_print_every")]
    pub print_every: u64,
    /// Directory for the output CSV files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Label used in output filenames; defaults to `dataset`.
    #[serde(default)]
    pub run_label: Option<String>,
}

impl RunConfig {
    /// Loads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is invalid.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Event loader options derived from this config.
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            crime_types: self.crime_types.iter().cloned().collect::<BTreeSet<_>>(),
            date_format: self.date_format.clone(),
            infeet: self.coords_in_feet,
        }
    }

    /// The crime-type label for output records: the configured types joined
    /// with `_`, or `"all"` when no filter was configured.
    #[must_use]
    pub fn event_types_label(&self) -> String {
        if self.crime_types.is_empty() {
            "all".to_string()
        } else {
            self.crime_types.join("_")
        }
    }

    /// The label used in output filenames.
    #[must_use]
    pub fn label(&self) -> &str {
        self.run_label.as_deref().unwrap_or(&self.dataset)
    }

    /// Training window length.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed shorthand.
    pub fn train_span(&self) -> Result<TimeSpan, CliError> {
        Ok(self.train_len.parse::<TimeSpan>()?)
    }

    /// Test window length.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed shorthand.
    pub fn test_span(&self) -> Result<TimeSpan, CliError> {
        Ok(self.test_len.parse::<TimeSpan>()?)
    }

    /// Step between test-window starts; `test_len` unless overridden.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed shorthand.
    pub fn step_span(&self) -> Result<TimeSpan, CliError> {
        match &self.test_date_step {
            Some(step) => Ok(step.parse::<TimeSpan>()?),
            None => self.test_span(),
        }
    }

    /// Model parameter lists derived from this config.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed duration shorthand or an unrecognised
    /// weight scheme name.
    pub fn param_lists(&self) -> Result<ParamLists, CliError> {
        let phs_time_units = parse_spans(&self.phs_time_units)?;
        let phs_time_bands = parse_spans(&self.phs_time_bands)?;
        let phs_weights = self
            .phs_weights
            .iter()
            .map(|name| {
                name.trim()
                    .parse::<PhsWeight>()
                    .map_err(|_| CliError::Invalid {
                        message: format!("unrecognised PHS weight scheme {name:?}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ParamLists {
            num_random: self.num_random,
            rhs_bandwidths: self.rhs_bandwidths.clone(),
            phs_time_units,
            phs_time_bands,
            phs_dist_units: self.phs_dist_units.clone(),
            phs_dist_bands: self.phs_dist_bands.clone(),
            phs_weights,
        })
    }
}

fn parse_spans(values: &[String]) -> Result<Vec<TimeSpan>, CliError> {
    values
        .iter()
        .map(|v| Ok(v.parse::<TimeSpan>()?))
        .collect()
}
