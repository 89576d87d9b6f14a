#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI entry point for the hotspot evaluation tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hotspot_eval_models::ModelKind;

#[derive(Parser)]
#[command(name = "hotspot_eval", about = "Crime hotspot prediction evaluation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the evaluation sweep described by a TOML config file
    Run {
        /// Path to the sweep config file
        config: PathBuf,
    },
    /// List the recognised model names
    Models,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            if let Err(e) = hotspot_eval_cli::run::run(&config) {
                log::error!("sweep failed: {e}");
                return Err(e.into());
            }
        }
        Commands::Models => {
            for kind in ModelKind::all() {
                println!("{kind}");
            }
        }
    }

    Ok(())
}
