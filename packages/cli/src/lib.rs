#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Command-line front end for hotspot evaluation sweeps.
//!
//! A sweep is described by a TOML config file; [`run::run`] loads it, wires
//! the data and grid together, and streams results to CSV files in the
//! configured output directory.

pub mod config;
pub mod run;

use thiserror::Error;

pub use config::RunConfig;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to read the config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed config TOML.
    #[error("failed to parse config file: {0}")]
    Config(#[from] toml::de::Error),

    /// Event loading or duration parsing failed.
    #[error(transparent)]
    Event(#[from] hotspot_eval_events::EventError),

    /// Region or grid construction failed.
    #[error(transparent)]
    Grid(#[from] hotspot_eval_grid::GridError),

    /// Model roster expansion failed.
    #[error(transparent)]
    Model(#[from] hotspot_eval_models::ModelError),

    /// The sweep itself failed.
    #[error(transparent)]
    Engine(#[from] hotspot_eval_engine::EngineError),

    /// A config value was out of range or inconsistent.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// What was wrong.
        message: String,
    },
}
