//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ms_core::Proportions;

#[derive(Debug, Parser)]
#[command(name = "mixsens", version, about = "Vehicle-mix emission sensitivity studies with SUMO")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full study: one simulation per sample, one results row per run.
    Study {
        /// Study configuration (TOML).
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Generate one trip file for a vehicle mix.
    Generate {
        /// Study configuration providing the trip source and run size.
        #[arg(short, long)]
        config: PathBuf,
        /// Class weights `pkw,bus,scooter,bike`.
        #[arg(short, long, value_parser = parse_proportions)]
        proportions: Proportions,
        #[arg(short, long)]
        output: PathBuf,
        /// Overrides `study.vehicles`.
        #[arg(long)]
        vehicles: Option<usize>,
        /// Overrides `study.seed`.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Point a SUMO configuration at a route file and an emission output.
    Configure {
        #[arg(short, long)]
        input: PathBuf,
        /// Defaults to rewriting `input` in place.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        route_files: String,
        #[arg(long)]
        emission_output: String,
    },

    /// Summarize a SUMO emission-output file.
    Aggregate {
        #[arg(short, long)]
        emissions: PathBuf,
        /// Also write one CSV row per vehicle element.
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Scenario label for the per-type means.
        #[arg(long, default_value = "1")]
        scenario: String,
    },

    /// Rescale the `<flow>` counts of a route file to a vehicle mix.
    Flows {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, value_parser = parse_proportions)]
        proportions: Proportions,
    },

    /// Print the samples a study configuration would run, as CSV.
    Sample {
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Show class counts and departure histogram of a route file.
    Inspect {
        #[arg(short, long)]
        routes: PathBuf,
        /// Simulated seconds the departures are spread over.
        #[arg(short, long)]
        duration: f64,
        #[arg(short, long, default_value_t = 10)]
        bins: usize,
    },
}

/// `"40,30,20,10"` → `Proportions`.
pub fn parse_proportions(s: &str) -> Result<Proportions, String> {
    let weights = s
        .split(',')
        .map(|w| w.trim().parse::<f64>().map_err(|e| format!("{w:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    Proportions::from_slice(&weights).map_err(|e| e.to_string())
}
