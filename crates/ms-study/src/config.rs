//! Study configuration.
//!
//! Loaded from a TOML file and layered with `MIXSENS__<SECTION>__<KEY>`
//! environment variables (e.g. `MIXSENS__STUDY__SEED=7`).  Relative paths in
//! the file are taken relative to the file's directory.
//!
//! ```toml
//! [study]
//! seed         = 42
//! vehicles     = 200
//! duration     = 3600.0
//! results_file = "results.csv"
//! aggregation  = "totals"        # or "per_vehicle"
//! exit_policy  = "check"         # or "ignore"
//!
//! [tools]
//! route = true                   # run duarouter on generated trips
//!
//! [files]
//! sumocfg = "simpleT.sumocfg"
//! net     = "simpleT.net.xml"
//!
//! [trips]
//! mode = "topology"              # edge_pool | topology | flows
//!
//! [[trips.routes]]
//! class = "pkw"
//! from  = "L2"
//! to    = ["L10", "L3"]
//!
//! [samples]
//! source = "sobol"               # sobol | csv | scenarios
//! count  = 16
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use ms_core::Proportions;
use ms_sumo::{ExitPolicy, tool_path};
use ms_trips::RouteTopology;

use crate::{StudyError, StudyResult};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "MIXSENS";

// ── Top level ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub study:   StudySection,
    #[serde(default)]
    pub tools:   ToolsConfig,
    pub files:   FilesConfig,
    #[serde(default)]
    pub trips:   TripsConfig,
    #[serde(default)]
    pub samples: SamplesConfig,
}

impl StudyConfig {
    /// Read `path`, apply environment overrides, and rebase relative paths
    /// onto the file's directory.
    pub fn load(path: &Path) -> StudyResult<Self> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let mut cfg: StudyConfig = settings.try_deserialize()?;
        if let Some(dir) = path.parent() {
            cfg.rebase(dir);
        }
        log::debug!("loaded study configuration from {}", path.display());
        Ok(cfg)
    }

    /// Parse a TOML document without environment overrides.  Paths are kept
    /// as written.
    pub fn from_toml_str(toml: &str) -> StudyResult<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Directory that receives per-run artifacts: `study.work_dir`, or the
    /// directory of the base configuration when unset.
    pub fn work_dir(&self) -> PathBuf {
        match &self.study.work_dir {
            Some(dir) => dir.clone(),
            None => self
                .files
                .sumocfg
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// Check the settings that do not depend on the filesystem.
    pub fn validate(&self) -> StudyResult<()> {
        let s = &self.study;
        if !s.duration.is_finite() || s.duration <= 0.0 {
            return Err(StudyError::Config(format!(
                "study.duration must be positive, got {}",
                s.duration
            )));
        }
        match self.trips.mode {
            TripMode::EdgePool if self.files.net.is_none() => {
                return Err(StudyError::Config("trips.mode = \"edge_pool\" needs files.net".into()));
            }
            TripMode::Topology if self.trips.routes.is_empty() => {
                return Err(StudyError::Config("trips.mode = \"topology\" needs [[trips.routes]]".into()));
            }
            TripMode::Flows if self.trips.route_file.is_none() => {
                return Err(StudyError::Config("trips.mode = \"flows\" needs trips.route_file".into()));
            }
            _ => {}
        }
        if self.tools.route && self.files.net.is_none() {
            return Err(StudyError::Config("tools.route needs files.net".into()));
        }
        Ok(())
    }

    fn rebase(&mut self, dir: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        join(&mut self.files.sumocfg);
        join(&mut self.study.results_file);
        for p in [
            self.files.net.as_mut(),
            self.trips.route_file.as_mut(),
            self.samples.csv.as_mut(),
            self.study.work_dir.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            join(p);
        }
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StudySection {
    /// Master seed; each run derives its own stream from it.
    pub seed:         u64,
    /// Trips generated per run.
    pub vehicles:     usize,
    /// Simulated seconds; departures fall in `[0, duration]`.
    pub duration:     f64,
    pub work_dir:     Option<PathBuf>,
    pub results_file: PathBuf,
    pub aggregation:  Aggregation,
    pub exit_policy:  ExitPolicy,
}

impl Default for StudySection {
    fn default() -> Self {
        Self {
            seed:         42,
            vehicles:     100,
            duration:     3600.0,
            work_dir:     None,
            results_file: PathBuf::from("results.csv"),
            aggregation:  Aggregation::Totals,
            exit_policy:  ExitPolicy::Check,
        }
    }
}

/// How each run's emission file is reduced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// One totals row per run.
    #[default]
    Totals,
    /// Totals row plus a per-vehicle CSV per run and per-type means at the end.
    PerVehicle,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// SUMO installation; falls back to `$SUMO_HOME`.
    pub sumo_home: Option<PathBuf>,
    /// Explicit simulator binary, overriding `sumo_home`.
    pub sumo:      Option<PathBuf>,
    /// Explicit router binary, overriding `sumo_home`.
    pub duarouter: Option<PathBuf>,
    /// Run `duarouter` between trip generation and simulation.
    pub route:     bool,
}

impl ToolsConfig {
    pub fn sumo_home(&self) -> Option<PathBuf> {
        self.sumo_home
            .clone()
            .or_else(|| std::env::var_os("SUMO_HOME").map(PathBuf::from))
    }

    pub fn sumo_binary(&self) -> PathBuf {
        self.sumo
            .clone()
            .unwrap_or_else(|| tool_path("sumo", self.sumo_home().as_deref()))
    }

    pub fn duarouter_binary(&self) -> PathBuf {
        self.duarouter
            .clone()
            .unwrap_or_else(|| tool_path("duarouter", self.sumo_home().as_deref()))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FilesConfig {
    /// Base `.sumocfg`; copied and patched once per run.
    pub sumocfg: PathBuf,
    /// Network, for the edge pool and the router.
    #[serde(default)]
    pub net:     Option<PathBuf>,
}

/// Where trips come from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripMode {
    /// Random distinct origin/destination among all network edges.
    EdgePool,
    /// Per-class origin → destination table.
    #[default]
    Topology,
    /// Rescale the flows of an existing route file.
    Flows,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TripsConfig {
    pub mode:       TripMode,
    pub routes:     RouteTopology,
    /// Flow-based route file for [`TripMode::Flows`].
    pub route_file: Option<PathBuf>,
}

/// Where the proportion vectors come from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    #[default]
    Sobol,
    Csv,
    Scenarios,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SamplesConfig {
    pub source:    SampleSource,
    /// Sobol points to use.
    pub count:     usize,
    /// Leading Sobol points to discard (the first is the origin).
    pub skip:      usize,
    /// Per-class `[low, high]` ranges for Sobol points; unit range if empty.
    pub bounds:    Vec<(f64, f64)>,
    /// Sample table for [`SampleSource::Csv`].
    pub csv:       Option<PathBuf>,
    pub scenarios: Vec<NamedScenario>,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            source:    SampleSource::Sobol,
            count:     16,
            skip:      1,
            bounds:    Vec::new(),
            csv:       None,
            scenarios: Vec::new(),
        }
    }
}

/// A hand-picked vehicle mix.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NamedScenario {
    pub name:        String,
    pub proportions: Proportions,
}
