//! Fluent builder for constructing a [`Study`].

use std::path::PathBuf;

use ms_output::OutputWriter;
use ms_sumo::{Simulator, TripRouter};
use ms_trips::read_edge_pool;

use crate::config::{Aggregation, StudyConfig, TripMode};
use crate::sampling::Sample;
use crate::study::TripPlan;
use crate::{Study, StudyError, StudyResult};

/// Fluent builder for [`Study<S, W>`].
///
/// # Required inputs
///
/// - [`StudyConfig`]: files, trip mode, seed, run size, …
/// - `S: Simulator`: usually [`ms_sumo::SumoProcess`]
/// - `W: OutputWriter`: usually [`ms_output::ResultsWriter`]
///
/// # Optional inputs
///
/// | Method          | Default                                   |
/// |-----------------|-------------------------------------------|
/// | `.router(r)`    | none: generated trips go to SUMO directly |
/// | `.samples(v)`   | resolved from `[samples]` of the config   |
pub struct StudyBuilder<S: Simulator, W: OutputWriter> {
    config:    StudyConfig,
    simulator: S,
    writer:    W,
    router:    Option<Box<dyn TripRouter>>,
    samples:   Option<Vec<Sample>>,
}

impl<S: Simulator, W: OutputWriter> StudyBuilder<S, W> {
    pub fn new(config: StudyConfig, simulator: S, writer: W) -> Self {
        Self {
            config,
            simulator,
            writer,
            router:  None,
            samples: None,
        }
    }

    /// Route generated trips through `router` before simulating.  Needs
    /// `files.net`.
    pub fn router(mut self, router: impl TripRouter + 'static) -> Self {
        self.router = Some(Box::new(router));
        self
    }

    /// Use these samples instead of the config's `[samples]` section.
    pub fn samples(mut self, samples: Vec<Sample>) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Validate the configuration, load the trip source and samples, create
    /// the work directory, and return a ready-to-run [`Study`].
    pub fn build(self) -> StudyResult<Study<S, W>> {
        let prepared = prepare(self.config, self.samples, self.router.is_some())?;
        Ok(prepared.into_study(self.simulator, self.router, self.writer))
    }
}

// ── Preparation ───────────────────────────────────────────────────────────────

/// Everything of a [`Study`] except its simulator, router and writer.
pub(crate) struct Prepared {
    seed:        u64,
    vehicles:    usize,
    duration:    f64,
    aggregation: Aggregation,
    work_dir:    PathBuf,
    base_config: PathBuf,
    net:         Option<PathBuf>,
    trips:       TripPlan,
    samples:     Vec<Sample>,
}

impl Prepared {
    pub(crate) fn into_study<S: Simulator, W: OutputWriter>(
        self,
        simulator: S,
        router:    Option<Box<dyn TripRouter>>,
        writer:    W,
    ) -> Study<S, W> {
        Study {
            seed:        self.seed,
            vehicles:    self.vehicles,
            duration:    self.duration,
            aggregation: self.aggregation,
            work_dir:    self.work_dir,
            base_config: self.base_config,
            net:         self.net,
            trips:       self.trips,
            samples:     self.samples,
            simulator,
            router,
            writer,
        }
    }
}

/// Check `cfg`, resolve samples and the trip source, and create the work
/// directory.  Nothing outside the work directory is touched.
pub(crate) fn prepare(
    cfg:        StudyConfig,
    samples:    Option<Vec<Sample>>,
    has_router: bool,
) -> StudyResult<Prepared> {
    cfg.validate()?;

    if !cfg.files.sumocfg.is_file() {
        return Err(StudyError::Config(format!(
            "base configuration {} not found",
            cfg.files.sumocfg.display()
        )));
    }
    if has_router && cfg.files.net.is_none() {
        return Err(StudyError::Config("routing trips needs files.net".into()));
    }

    // ── Samples ───────────────────────────────────────────────────────────
    let samples = match samples {
        Some(s) if s.is_empty() => return Err(StudyError::Samples("no samples to run".into())),
        Some(s) => s,
        None => cfg.samples.resolve()?,
    };

    // ── Trip source ───────────────────────────────────────────────────────
    let trips = match cfg.trips.mode {
        TripMode::EdgePool => {
            let net = cfg.files.net.as_deref().ok_or_else(|| {
                StudyError::Config("trips.mode = \"edge_pool\" needs files.net".into())
            })?;
            let edges = read_edge_pool(net)?;
            log::debug!("{} usable edges in {}", edges.len(), net.display());
            TripPlan::EdgePool(edges)
        }
        TripMode::Topology => TripPlan::Topology(cfg.trips.routes.clone()),
        TripMode::Flows => {
            let path = cfg.trips.route_file.as_deref().ok_or_else(|| {
                StudyError::Config("trips.mode = \"flows\" needs trips.route_file".into())
            })?;
            let xml = std::fs::read_to_string(path).map_err(|source| StudyError::File {
                path: path.to_path_buf(),
                source,
            })?;
            TripPlan::Flows(xml)
        }
    };

    // ── Work directory ────────────────────────────────────────────────────
    let mut work_dir = cfg.work_dir();
    if work_dir.as_os_str().is_empty() {
        work_dir = PathBuf::from(".");
    }
    let io_err = |source| StudyError::File { path: work_dir.clone(), source };
    std::fs::create_dir_all(&work_dir).map_err(io_err)?;
    let work_dir = std::path::absolute(&work_dir).map_err(io_err)?;
    let base_config = std::path::absolute(&cfg.files.sumocfg).map_err(|source| StudyError::File {
        path: cfg.files.sumocfg.clone(),
        source,
    })?;

    Ok(Prepared {
        seed:        cfg.study.seed,
        vehicles:    cfg.study.vehicles,
        duration:    cfg.study.duration,
        aggregation: cfg.study.aggregation,
        work_dir,
        base_config,
        net:         cfg.files.net,
        trips,
        samples,
    })
}
