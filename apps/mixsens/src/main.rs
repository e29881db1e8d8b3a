//! mixsens — SUMO vehicle-mix emission sensitivity studies.
//!
//! ```text
//! mixsens study     -c study.toml
//! mixsens generate  -c study.toml -p 40,30,20,10 -o trips.xml
//! mixsens configure -i base.sumocfg -o run.sumocfg --route-files r.xml --emission-output e.xml
//! mixsens aggregate -e emissions.xml [--csv emissions.csv]
//! mixsens flows     -i base.rou.xml -o run.rou.xml -p 40,30,20,10
//! mixsens sample    -c study.toml
//! mixsens inspect   -r trips.xml -d 3600 [-b 10]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

mod cli;


use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use ms_core::{Proportions, StudyRng, VehicleClass};
use ms_emission::{EmissionTotals, aggregate_totals, class_means, read_vehicle_rows};
use ms_output::VehicleCsvWriter;
use ms_study::{LogObserver, Study, StudyConfig, TripMode};
use ms_sumo::ConfigPatch;
use ms_trips::{
    EdgeSource, adjust_flow_file, departure_histogram, generate_trips, read_edge_pool, read_trips,
    write_route_file,
};

use cli::{Cli, Command};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Study { config } => run_study(&config),
        Command::Generate { config, proportions, output, vehicles, seed } => {
            generate(&config, &proportions, &output, vehicles, seed)
        }
        Command::Configure { input, output, route_files, emission_output } => {
            let output = output.unwrap_or_else(|| input.clone());
            let mut patch = ConfigPatch::new(route_files, emission_output);
            if output.parent() != input.parent() {
                let dir = std::path::absolute(&input)?.parent().map(Path::to_path_buf);
                if let Some(dir) = dir {
                    patch = patch.relative_to(dir);
                }
            }
            patch.apply_file(&input, &output)?;
            log::info!("wrote {}", output.display());
            Ok(())
        }
        Command::Aggregate { emissions, csv, scenario } => aggregate(&emissions, csv.as_deref(), &scenario),
        Command::Flows { input, output, proportions } => {
            adjust_flow_file(&input, &output, &proportions)?;
            log::info!("wrote {}", output.display());
            Ok(())
        }
        Command::Sample { config } => sample(&config),
        Command::Inspect { routes, duration, bins } => inspect(&routes, duration, bins),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_study(config: &Path) -> Result<()> {
    let cfg = StudyConfig::load(config).with_context(|| format!("loading {}", config.display()))?;
    let results = cfg.study.results_file.clone();
    let mut study = Study::from_config(cfg)?;
    let summary = study.run(&mut LogObserver::new())?;
    println!(
        "{} runs completed, {} skipped; results in {}",
        summary.completed,
        summary.skipped,
        results.display()
    );
    Ok(())
}

fn generate(
    config:      &Path,
    proportions: &Proportions,
    output:      &Path,
    vehicles:    Option<usize>,
    seed:        Option<u64>,
) -> Result<()> {
    let cfg = StudyConfig::load(config).with_context(|| format!("loading {}", config.display()))?;
    let vehicles = vehicles.unwrap_or(cfg.study.vehicles);
    let mut rng = StudyRng::new(seed.unwrap_or(cfg.study.seed));

    let edges;
    let source = match cfg.trips.mode {
        TripMode::EdgePool => {
            let net = cfg.files.net.as_deref().context("trips.mode = \"edge_pool\" needs files.net")?;
            edges = read_edge_pool(net)?;
            EdgeSource::Pool(&edges)
        }
        TripMode::Topology => EdgeSource::Topology(&cfg.trips.routes),
        TripMode::Flows => anyhow::bail!("trips.mode = \"flows\" has no trips to generate; use `mixsens flows`"),
    };

    let trips = generate_trips(vehicles, cfg.study.duration, proportions, source, &mut rng)?;
    write_route_file(output, &trips)?;
    println!("{} trips written to {}", trips.len(), output.display());
    Ok(())
}

fn aggregate(emissions: &Path, csv: Option<&Path>, scenario: &str) -> Result<()> {
    let Some(totals) = aggregate_totals(emissions)? else {
        anyhow::bail!("no emission output at {}", emissions.display());
    };
    println!("{}", EmissionTotals::COLUMNS.join(","));
    println!("{}", csv_fields(&totals));

    if let Some(csv) = csv {
        let rows = read_vehicle_rows(emissions, scenario)?.unwrap_or_default();
        let mut writer = VehicleCsvWriter::create(csv)?;
        writer.write_rows(&rows)?;
        writer.finish()?;
        log::info!("{} vehicle rows written to {}", rows.len(), csv.display());

        println!();
        println!("scenario,type,samples,{}", EmissionTotals::COLUMNS.join(","));
        for m in class_means(&rows) {
            println!("{},{},{},{}", m.scenario, m.vehicle_type, m.samples, csv_fields(&m.mean));
        }
    }
    Ok(())
}

fn sample(config: &Path) -> Result<()> {
    let cfg = StudyConfig::load(config).with_context(|| format!("loading {}", config.display()))?;
    let samples = cfg.samples.resolve()?;
    let header: Vec<&str> = VehicleClass::ALL.iter().map(|c| c.as_str()).collect();
    println!("label,{}", header.join(","));
    for s in &samples {
        let weights: Vec<String> = s.proportions.as_array().iter().map(f64::to_string).collect();
        println!("{},{}", s.label, weights.join(","));
    }
    Ok(())
}

fn inspect(routes: &Path, duration: f64, bins: usize) -> Result<()> {
    let trips = read_trips(routes)?;
    let hist = departure_histogram(&trips, duration, bins)?;
    println!("{} trips in {}", trips.len(), routes.display());
    for (class, counts) in &hist {
        let total: usize = counts.iter().sum();
        let cells: Vec<String> = counts.iter().map(usize::to_string).collect();
        println!("{:<8} {total:>6}  [{}]", class.as_str(), cells.join(" "));
    }
    Ok(())
}

/// Values of `totals` as one CSV line, in `EmissionTotals::COLUMNS` order.
fn csv_fields(totals: &EmissionTotals) -> String {
    let values: Vec<String> = totals.as_array().iter().map(f64::to_string).collect();
    values.join(",")
}
