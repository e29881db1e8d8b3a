//! The `Study` struct and its per-run pipeline.

use std::path::{Path, PathBuf};

use ms_core::{RunId, StudyRng};
use ms_emission::{ClassMean, EmissionTotals, aggregate_totals, class_means, read_vehicle_rows};
use ms_output::{OutputWriter, ResultRow, ResultsWriter, VehicleCsvWriter, write_class_means};
use ms_sumo::{ConfigPatch, Duarouter, Simulator, SumoProcess, TripRouter};
use ms_trips::{EdgeSource, RouteTopology, adjust_flow_shares, generate_trips, write_route_file};

use crate::config::{Aggregation, StudyConfig};
use crate::sampling::Sample;
use crate::builder::prepare;
use crate::{StudyError, StudyObserver, StudyResult};

// ── Per-run artifacts ─────────────────────────────────────────────────────────

/// File names of one run inside the work directory, all sharing the stem
/// `run_NNNN`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IterationPaths {
    pub trips:       PathBuf,
    pub routes:      PathBuf,
    pub config:      PathBuf,
    pub emissions:   PathBuf,
    pub vehicle_csv: PathBuf,
}

impl IterationPaths {
    pub fn new(work_dir: &Path, run: RunId) -> Self {
        let stem = run.stem();
        Self {
            trips:       work_dir.join(format!("{stem}.trips.xml")),
            routes:      work_dir.join(format!("{stem}.rou.xml")),
            config:      work_dir.join(format!("{stem}.sumocfg")),
            emissions:   work_dir.join(format!("{stem}.emissions.xml")),
            vehicle_csv: work_dir.join(format!("{stem}.emissions.csv")),
        }
    }
}

/// Resolved trip source of a study.
pub(crate) enum TripPlan {
    EdgePool(Vec<String>),
    Topology(RouteTopology),
    /// Contents of the flow-based base route file.
    Flows(String),
}

/// Outcome counts of [`Study::run`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudySummary {
    /// Runs whose result row was appended.
    pub completed:   usize,
    /// Runs without emission output; nothing was appended for them.
    pub skipped:     usize,
    /// Per (scenario, vehicle type) means; only filled with
    /// [`Aggregation::PerVehicle`].
    pub class_means: Vec<ClassMean>,
}

// ── Study ─────────────────────────────────────────────────────────────────────

/// A configured sensitivity study.
///
/// Every run performs, strictly in sequence:
///
/// 1. **Routes**: generate trips for the sample's proportions (optionally
///    routed with `duarouter`), or rescale the flows of the base route file.
/// 2. **Configure**: write `run_NNNN.sumocfg` from the base configuration,
///    pointing at the run's route file and emission output, with the base's
///    relative input files resolved against its own directory.
/// 3. **Simulate**: run the simulator to completion.
/// 4. **Aggregate**: reduce the emission file; a missing file skips the run.
/// 5. **Append**: write one result row and flush it.
///
/// Any error other than missing emission output aborts the study.
///
/// Create via [`StudyBuilder`](crate::StudyBuilder) or [`Study::from_config`].
pub struct Study<S: Simulator, W: OutputWriter> {
    pub(crate) seed:        u64,
    pub(crate) vehicles:    usize,
    pub(crate) duration:    f64,
    pub(crate) aggregation: Aggregation,
    pub(crate) work_dir:    PathBuf,
    /// Absolute path of the base `.sumocfg`.
    pub(crate) base_config: PathBuf,
    pub(crate) net:         Option<PathBuf>,
    pub(crate) trips:       TripPlan,
    pub(crate) samples:     Vec<Sample>,
    pub(crate) simulator:   S,
    pub(crate) router:      Option<Box<dyn TripRouter>>,
    pub(crate) writer:      W,
}

impl Study<SumoProcess, ResultsWriter> {
    /// Study driving the real SUMO binaries and appending to
    /// `study.results_file`.
    pub fn from_config(config: StudyConfig) -> StudyResult<Self> {
        let simulator = SumoProcess::new(config.tools.sumo_binary(), config.study.exit_policy);
        let router: Option<Box<dyn TripRouter>> = if config.tools.route {
            Some(Box::new(Duarouter::new(config.tools.duarouter_binary())))
        } else {
            None
        };
        let results_file = config.study.results_file.clone();

        // The results file is only created once the study is known to be runnable.
        let prepared = prepare(config, None, router.is_some())?;
        let writer = ResultsWriter::open(&results_file)?;
        Ok(prepared.into_study(simulator, router, writer))
    }
}

impl<S: Simulator, W: OutputWriter> Study<S, W> {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Execute every run in order.
    pub fn run<O: StudyObserver>(&mut self, observer: &mut O) -> StudyResult<StudySummary> {
        let mut summary = StudySummary::default();
        observer.on_study_start(self.samples.len());

        for i in 0..self.samples.len() {
            let run = RunId::try_from(i)
                .map_err(|_| StudyError::Config(format!("run index {i} out of range")))?;
            let sample = self.samples[i].clone();
            observer.on_run_start(run, &sample);

            let paths = IterationPaths::new(&self.work_dir, run);
            match self.run_once(run, &sample, &paths, &mut summary.class_means)? {
                Some(totals) => {
                    summary.completed += 1;
                    observer.on_run_complete(run, &totals);
                }
                None => {
                    summary.skipped += 1;
                    observer.on_run_skipped(run, &paths.emissions);
                }
            }
        }

        self.writer.finish()?;
        if self.aggregation == Aggregation::PerVehicle && !summary.class_means.is_empty() {
            let path = self.work_dir.join("class_means.csv");
            write_class_means(&path, &summary.class_means)?;
            log::debug!("per-type means written to {}", path.display());
        }
        observer.on_study_end(&summary);
        Ok(summary)
    }

    /// One run.  `Ok(None)` when the simulator left no emission file.
    fn run_once(
        &mut self,
        run:    RunId,
        sample: &Sample,
        paths:  &IterationPaths,
        means:  &mut Vec<ClassMean>,
    ) -> StudyResult<Option<EmissionTotals>> {
        // ── Routes ────────────────────────────────────────────────────────
        let route_file = self.prepare_routes(run, sample, paths)?;

        // ── Configure ─────────────────────────────────────────────────────
        let mut patch = ConfigPatch::new(path_value(&route_file), path_value(&paths.emissions));
        if let Some(dir) = self.base_config.parent() {
            patch = patch.relative_to(dir);
        }
        patch.apply_file(&self.base_config, &paths.config)?;
        remove_stale(&paths.emissions)?;

        // ── Simulate ──────────────────────────────────────────────────────
        self.simulator.run(&paths.config)?;

        // ── Aggregate ─────────────────────────────────────────────────────
        let totals = match self.aggregation {
            Aggregation::Totals => aggregate_totals(&paths.emissions)?,
            Aggregation::PerVehicle => match read_vehicle_rows(&paths.emissions, &sample.label)? {
                Some(rows) => {
                    let mut csv = VehicleCsvWriter::create(&paths.vehicle_csv)?;
                    csv.write_rows(&rows)?;
                    csv.finish()?;

                    let mut totals = EmissionTotals::default();
                    for row in &rows {
                        totals += row.emissions;
                    }
                    means.extend(class_means(&rows));
                    Some(totals)
                }
                None => None,
            },
        };
        let Some(totals) = totals else {
            log::warn!(
                "{}: no emission output at {}; run skipped",
                run.stem(),
                paths.emissions.display()
            );
            return Ok(None);
        };

        // ── Append ────────────────────────────────────────────────────────
        self.writer.write_result(&ResultRow { proportions: sample.proportions, totals })?;
        Ok(Some(totals))
    }

    /// Write the run's route input and return the file SUMO should load.
    fn prepare_routes(&self, run: RunId, sample: &Sample, paths: &IterationPaths) -> StudyResult<PathBuf> {
        let source = match &self.trips {
            TripPlan::Flows(xml) => {
                let adjusted = adjust_flow_shares(xml, &sample.proportions)?;
                std::fs::write(&paths.routes, adjusted).map_err(|source| StudyError::File {
                    path: paths.routes.clone(),
                    source,
                })?;
                return Ok(paths.routes.clone());
            }
            TripPlan::EdgePool(edges) => EdgeSource::Pool(edges),
            TripPlan::Topology(topology) => EdgeSource::Topology(topology),
        };

        let mut rng = StudyRng::for_run(self.seed, run);
        let trips = generate_trips(self.vehicles, self.duration, &sample.proportions, source, &mut rng)?;
        write_route_file(&paths.trips, &trips)?;
        log::debug!("{}: {} trips written to {}", run.stem(), trips.len(), paths.trips.display());

        match (&self.router, &self.net) {
            (Some(router), Some(net)) => {
                router.route(net, &paths.trips, &paths.routes)?;
                Ok(paths.routes.clone())
            }
            _ => Ok(paths.trips.clone()),
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A previous study's output must not be mistaken for this run's.
fn remove_stale(path: &Path) -> StudyResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StudyError::File {
            path: path.to_path_buf(),
            source,
        }),
    }
}
