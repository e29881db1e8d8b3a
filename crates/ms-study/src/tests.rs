//! Unit and pipeline tests for ms-study.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ms_sumo::{Simulator, SumoError, SumoResult, TripRouter};

use crate::StudyConfig;

// ── Helpers ───────────────────────────────────────────────────────────────────

const BASE_CFG: &str = r#"<configuration>
    <input>
        <net-file value="net.net.xml"/>
        <route-files value="base.rou.xml"/>
    </input>
    <processing>
        <emission-output value="emissions.xml"/>
    </processing>
</configuration>
"#;

const EMISSIONS: &str = r#"<emission-export>
    <timestep time="0.00">
        <vehicle id="pkw_0" CO2="2.5" CO="0.5" HC="0.25" NOx="1.0" PMx="0.125" fuel="1.5" speed="10" type="pkw"/>
        <vehicle id="bus_0" CO2="4.0" CO="1.0" HC="0.5" NOx="2.0" PMx="0.25" fuel="3.0" speed="5" type="bus"/>
    </timestep>
</emission-export>
"#;

const STUDY_TOML: &str = r#"
[study]
seed     = 7
vehicles = 20
duration = 100.0

[files]
sumocfg = "base.sumocfg"

[[trips.routes]]
class = "pkw"
from  = "A"
to    = ["B", "C"]

[[trips.routes]]
class = "bus"
from  = "B"
to    = ["C"]

[samples]
source = "scenarios"

[[samples.scenarios]]
name        = "cars"
proportions = [1.0, 0.0, 0.0, 0.0]

[[samples.scenarios]]
name        = "mixed"
proportions = [1.0, 1.0, 0.0, 0.0]
"#;

/// Config rooted in `dir`, with the base `.sumocfg` written there.
fn study_config(dir: &Path) -> StudyConfig {
    std::fs::write(dir.join("base.sumocfg"), BASE_CFG).unwrap();
    let mut cfg = StudyConfig::from_toml_str(STUDY_TOML).unwrap();
    cfg.files.sumocfg = dir.join("base.sumocfg");
    cfg.study.work_dir = Some(dir.join("runs"));
    cfg
}

fn value_of(xml: &str, element: &str) -> Option<String> {
    let open = format!("<{element} value=\"");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find('"')? + start;
    Some(xml[start..end].to_owned())
}

/// Stands in for `sumo`: checks the run config and writes canned output.
struct FakeSumo {
    emissions: Option<&'static str>,
    fail:      bool,
    calls:     Rc<RefCell<Vec<PathBuf>>>,
}

impl FakeSumo {
    fn writing(emissions: &'static str) -> Self {
        Self { emissions: Some(emissions), fail: false, calls: Rc::default() }
    }

    fn silent() -> Self {
        Self { emissions: None, fail: false, calls: Rc::default() }
    }

    fn failing() -> Self {
        Self { emissions: None, fail: true, calls: Rc::default() }
    }
}

impl Simulator for FakeSumo {
    fn run(&self, config: &Path) -> SumoResult<()> {
        self.calls.borrow_mut().push(config.to_path_buf());
        if self.fail {
            return Err(SumoError::ExitStatus { program: PathBuf::from("sumo"), code: Some(1) });
        }
        let xml = std::fs::read_to_string(config)?;
        let routes = value_of(&xml, "route-files").unwrap();
        assert!(Path::new(&routes).is_file(), "route file {routes} missing");
        if let Some(out) = self.emissions {
            std::fs::write(value_of(&xml, "emission-output").unwrap(), out)?;
        }
        Ok(())
    }
}

/// Stands in for `duarouter` by copying the trips through.
struct CopyRouter {
    calls: Rc<RefCell<usize>>,
}

impl TripRouter for CopyRouter {
    fn route(&self, _net: &Path, trips: &Path, output: &Path) -> SumoResult<()> {
        *self.calls.borrow_mut() += 1;
        std::fs::copy(trips, output)?;
        Ok(())
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

mod config {
    use std::path::PathBuf;

    use ms_core::{Proportions, VehicleClass};
    use ms_sumo::ExitPolicy;

    use super::STUDY_TOML;
    use crate::{Aggregation, SampleSource, StudyConfig, StudyError, TripMode};

    #[test]
    fn parses_sections_and_defaults() {
        let cfg = StudyConfig::from_toml_str(STUDY_TOML).unwrap();
        assert_eq!(cfg.study.seed, 7);
        assert_eq!(cfg.study.vehicles, 20);
        assert_eq!(cfg.study.duration, 100.0);
        assert_eq!(cfg.study.results_file, PathBuf::from("results.csv"));
        assert_eq!(cfg.study.aggregation, Aggregation::Totals);
        assert_eq!(cfg.study.exit_policy, ExitPolicy::Check);
        assert_eq!(cfg.trips.mode, TripMode::Topology);
        assert!(cfg.trips.routes.allows(VehicleClass::Pkw, "A", "C"));
        assert!(cfg.trips.routes.allows(VehicleClass::Bus, "B", "C"));
        assert!(!cfg.trips.routes.allows(VehicleClass::Bus, "A", "B"));
        assert_eq!(cfg.samples.source, SampleSource::Scenarios);
        assert_eq!(cfg.samples.scenarios.len(), 2);
        assert_eq!(
            cfg.samples.scenarios[1].proportions,
            Proportions::new([1.0, 1.0, 0.0, 0.0]).unwrap()
        );
        assert!(!cfg.tools.route);
    }

    #[test]
    fn enum_settings() {
        let cfg = StudyConfig::from_toml_str(
            r#"
            [study]
            aggregation = "per_vehicle"
            exit_policy = "ignore"
            [files]
            sumocfg = "x.sumocfg"
            net = "x.net.xml"
            [trips]
            mode = "edge_pool"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.study.aggregation, Aggregation::PerVehicle);
        assert_eq!(cfg.study.exit_policy, ExitPolicy::Ignore);
        assert_eq!(cfg.trips.mode, TripMode::EdgePool);
        cfg.validate().unwrap();
    }

    #[test]
    fn files_section_is_required() {
        assert!(matches!(
            StudyConfig::from_toml_str("[study]\nseed = 1\n"),
            Err(StudyError::Settings(_))
        ));
    }

    #[test]
    fn validate_checks_mode_requirements() {
        let mut cfg = StudyConfig::from_toml_str("[files]\nsumocfg = \"x\"\n").unwrap();
        // Topology without routes.
        assert!(matches!(cfg.validate(), Err(StudyError::Config(_))));

        cfg.trips.mode = TripMode::Flows;
        assert!(matches!(cfg.validate(), Err(StudyError::Config(_))));
        cfg.trips.route_file = Some("flows.rou.xml".into());
        cfg.validate().unwrap();

        cfg.tools.route = true;
        assert!(matches!(cfg.validate(), Err(StudyError::Config(_))));

        cfg.tools.route = false;
        cfg.study.duration = 0.0;
        assert!(matches!(cfg.validate(), Err(StudyError::Config(_))));
    }

    #[test]
    fn work_dir_defaults_to_base_config_dir() {
        let mut cfg = StudyConfig::from_toml_str("[files]\nsumocfg = \"scen/base.sumocfg\"\n").unwrap();
        assert_eq!(cfg.work_dir(), PathBuf::from("scen"));
        cfg.study.work_dir = Some("out".into());
        assert_eq!(cfg.work_dir(), PathBuf::from("out"));
    }

    #[test]
    fn tool_overrides() {
        let mut cfg = StudyConfig::from_toml_str("[files]\nsumocfg = \"x\"\n").unwrap();
        cfg.tools.sumo_home = Some("/opt/sumo".into());
        assert_eq!(cfg.tools.sumo_binary(), PathBuf::from("/opt/sumo/bin/sumo"));
        assert_eq!(cfg.tools.duarouter_binary(), PathBuf::from("/opt/sumo/bin/duarouter"));
        cfg.tools.sumo = Some("/usr/local/bin/sumo-gui".into());
        assert_eq!(cfg.tools.sumo_binary(), PathBuf::from("/usr/local/bin/sumo-gui"));
    }

    #[test]
    fn load_rebases_paths_and_reads_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study.toml");
        std::fs::write(&path, STUDY_TOML).unwrap();

        // SAFETY: no other test reads MIXSENS__* variables.
        unsafe { std::env::set_var("MIXSENS__STUDY__VEHICLES", "55") };
        let cfg = StudyConfig::load(&path).unwrap();
        unsafe { std::env::remove_var("MIXSENS__STUDY__VEHICLES") };

        assert_eq!(cfg.study.vehicles, 55);
        assert_eq!(cfg.files.sumocfg, dir.path().join("base.sumocfg"));
        assert_eq!(cfg.study.results_file, dir.path().join("results.csv"));
    }
}

// ── Sampling ──────────────────────────────────────────────────────────────────

mod sampling {
    use std::io::Cursor;

    use ms_core::Proportions;

    use crate::config::{NamedScenario, SampleSource, SamplesConfig};
    use crate::{SobolSequence, StudyError, load_samples_reader, sobol_samples};

    #[test]
    fn sobol_first_points() {
        let points: Vec<Vec<f64>> = SobolSequence::new(2).unwrap().take(4).collect();
        assert_eq!(
            points,
            vec![vec![0.0, 0.0], vec![0.5, 0.5], vec![0.75, 0.25], vec![0.25, 0.75]]
        );
    }

    #[test]
    fn sobol_points_are_distinct_and_in_unit_cube() {
        let points: Vec<Vec<f64>> = SobolSequence::new(6).unwrap().take(64).collect();
        for p in &points {
            assert_eq!(p.len(), 6);
            assert!(p.iter().all(|&u| (0.0..1.0).contains(&u)));
        }
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                assert_ne!(points[i], points[j]);
            }
        }
    }

    #[test]
    fn sobol_balances_each_coordinate() {
        // The first 2^k points put exactly half of every coordinate below 0.5.
        let points: Vec<Vec<f64>> = SobolSequence::new(4).unwrap().take(16).collect();
        for d in 0..4 {
            let low = points.iter().filter(|p| p[d] < 0.5).count();
            assert_eq!(low, 8, "dimension {d}");
        }
    }

    #[test]
    fn sobol_dimension_limits() {
        assert!(SobolSequence::new(0).is_err());
        assert!(SobolSequence::new(SobolSequence::MAX_DIMS + 1).is_err());
        assert_eq!(SobolSequence::new(SobolSequence::MAX_DIMS).unwrap().dims(), 6);
    }

    #[test]
    fn sobol_samples_skip_origin_and_scale() {
        let samples = sobol_samples(3, 1, &[(10.0, 20.0), (0.0, 4.0), (0.0, 0.0), (1.0, 1.0)]).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].label, "sobol_0");
        // Second Sobol point is (0.5, 0.5, 0.5, 0.5).
        assert_eq!(samples[0].proportions, Proportions::new([15.0, 2.0, 0.0, 1.0]).unwrap());
        for s in &samples {
            let [pkw, bus, scooter, bike] = *s.proportions.as_array();
            assert!((10.0..=20.0).contains(&pkw));
            assert!((0.0..=4.0).contains(&bus));
            assert_eq!(scooter, 0.0);
            assert_eq!(bike, 1.0);
        }
    }

    #[test]
    fn sobol_samples_reject_bad_bounds() {
        assert!(matches!(sobol_samples(2, 1, &[(0.0, 1.0)]), Err(StudyError::Samples(_))));
        assert!(matches!(
            sobol_samples(2, 1, &[(2.0, 1.0), (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)]),
            Err(StudyError::Samples(_))
        ));
    }

    #[test]
    fn csv_samples() {
        let data = "pkw,bus,scooter,bike\n0.4,0.3,0.2,0.1\n 1, 0, 0, 0\n";
        let samples = load_samples_reader(Cursor::new(data)).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].proportions, Proportions::new([0.4, 0.3, 0.2, 0.1]).unwrap());
        assert_eq!(samples[1].label, "sample_1");
    }

    #[test]
    fn csv_samples_reject_negative_weights() {
        let data = "pkw,bus,scooter,bike\n0.4,-0.3,0.2,0.1\n";
        assert!(matches!(load_samples_reader(Cursor::new(data)), Err(StudyError::Core(_))));
    }

    #[test]
    fn csv_source_needs_path() {
        let cfg = SamplesConfig { source: SampleSource::Csv, ..Default::default() };
        assert!(matches!(cfg.resolve(), Err(StudyError::Config(_))));
    }

    #[test]
    fn empty_scenario_list_is_an_error() {
        let cfg = SamplesConfig { source: SampleSource::Scenarios, ..Default::default() };
        assert!(matches!(cfg.resolve(), Err(StudyError::Samples(_))));

        let cfg = SamplesConfig {
            source: SampleSource::Scenarios,
            scenarios: vec![NamedScenario {
                name:        "only bikes".into(),
                proportions: Proportions::new([0.0, 0.0, 0.0, 1.0]).unwrap(),
            }],
            ..Default::default()
        };
        assert_eq!(cfg.resolve().unwrap()[0].label, "only bikes");
    }

    #[test]
    fn default_source_is_sixteen_sobol_points() {
        let samples = SamplesConfig::default().resolve().unwrap();
        assert_eq!(samples.len(), 16);
        assert_ne!(*samples[0].proportions.as_array(), [0.0; 4]);
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

mod pipeline {
    use std::cell::RefCell;
    use std::rc::Rc;

    use ms_core::{RunId, VehicleClass};
    use ms_output::ResultsWriter;
    use ms_trips::read_trips;

    use super::{CopyRouter, EMISSIONS, FakeSumo, study_config, value_of};
    use crate::{
        Aggregation, IterationPaths, LogObserver, NoopObserver, StudyBuilder, StudyError,
        StudyObserver, StudySummary, TripMode,
    };

    const HEADER: &str = "pkw,bus,scooter,bike,co2,co,hc,nox,pmx,fuel";

    #[derive(Default)]
    struct Counting {
        started:   Vec<RunId>,
        completed: usize,
        skipped:   usize,
        ended:     bool,
    }

    impl StudyObserver for Counting {
        fn on_run_start(&mut self, run: RunId, _: &crate::Sample) {
            self.started.push(run);
        }
        fn on_run_complete(&mut self, _: RunId, _: &ms_emission::EmissionTotals) {
            self.completed += 1;
        }
        fn on_run_skipped(&mut self, _: RunId, _: &std::path::Path) {
            self.skipped += 1;
        }
        fn on_study_end(&mut self, _: &StudySummary) {
            self.ended = true;
        }
    }

    #[test]
    fn iteration_paths_are_indexed() {
        let p = IterationPaths::new(std::path::Path::new("/w"), RunId(3));
        assert_eq!(p.trips, std::path::Path::new("/w/run_0003.trips.xml"));
        assert_eq!(p.routes, std::path::Path::new("/w/run_0003.rou.xml"));
        assert_eq!(p.config, std::path::Path::new("/w/run_0003.sumocfg"));
        assert_eq!(p.emissions, std::path::Path::new("/w/run_0003.emissions.xml"));
    }

    #[test]
    fn every_run_appends_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = study_config(dir.path());
        let results = dir.path().join("results.csv");
        let sim = FakeSumo::writing(EMISSIONS);
        let calls = sim.calls.clone();

        let mut study = StudyBuilder::new(cfg, sim, ResultsWriter::open(&results).unwrap())
            .build()
            .unwrap();
        let mut obs = Counting::default();
        let summary = study.run(&mut obs).unwrap();

        assert_eq!((summary.completed, summary.skipped), (2, 0));
        assert_eq!(obs.started, [RunId(0), RunId(1)]);
        assert_eq!(obs.completed, 2);
        assert!(obs.ended);
        assert_eq!(calls.borrow().len(), 2);
        assert_eq!(study.writer().rows_written(), 2);

        let text = std::fs::read_to_string(&results).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "1,0,0,0,6.5,1.5,0.75,3,0.375,4.5");
        assert_eq!(lines[2], "1,1,0,0,6.5,1.5,0.75,3,0.375,4.5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn run_artifacts_follow_run_index() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = study_config(dir.path());
        let mut study = StudyBuilder::new(
            cfg,
            FakeSumo::writing(EMISSIONS),
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .build()
        .unwrap();
        study.run(&mut NoopObserver).unwrap();

        let paths = IterationPaths::new(study.work_dir(), RunId(0));
        let cfg_text = std::fs::read_to_string(&paths.config).unwrap();
        assert_eq!(value_of(&cfg_text, "route-files").unwrap(), paths.trips.to_string_lossy());
        assert_eq!(value_of(&cfg_text, "emission-output").unwrap(), paths.emissions.to_string_lossy());
        let net = value_of(&cfg_text, "net-file").unwrap();
        assert_eq!(std::path::Path::new(&net), dir.path().join("net.net.xml"));

        // "cars" scenario: only pkw, drawn from the pkw topology.
        let trips = read_trips(&paths.trips).unwrap();
        assert_eq!(trips.len(), 20);
        for t in &trips {
            assert_eq!(t.class, VehicleClass::Pkw);
            assert_eq!(t.from, "A");
            assert!(t.to == "B" || t.to == "C");
            assert!((0.0..=100.0).contains(&t.depart));
        }
        assert!(trips.windows(2).all(|w| w[0].depart <= w[1].depart));

        // "mixed" scenario samples buses too, only on the bus route.
        let mixed = read_trips(&IterationPaths::new(study.work_dir(), RunId(1)).trips).unwrap();
        assert!(mixed.iter().any(|t| t.class == VehicleClass::Bus));
        assert!(mixed.iter().filter(|t| t.class == VehicleClass::Bus).all(|t| t.from == "B" && t.to == "C"));
    }

    #[test]
    fn run_config_finds_base_inputs_from_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("net.net.xml"), "<net/>").unwrap();
        let cfg = study_config(dir.path());
        let mut study = StudyBuilder::new(
            cfg,
            FakeSumo::writing(EMISSIONS),
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .build()
        .unwrap();
        study.run(&mut NoopObserver).unwrap();

        let run_cfg = IterationPaths::new(study.work_dir(), RunId(0)).config;
        assert_ne!(run_cfg.parent(), Some(dir.path()));
        let text = std::fs::read_to_string(&run_cfg).unwrap();
        let net = std::path::PathBuf::from(value_of(&text, "net-file").unwrap());
        let resolved = run_cfg.parent().unwrap().join(net);
        assert!(resolved.is_file(), "{} missing", resolved.display());
    }

    #[test]
    fn rejected_config_leaves_no_results_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = crate::StudyConfig::from_toml_str(super::STUDY_TOML).unwrap();
        cfg.files.sumocfg = dir.path().join("absent.sumocfg");
        cfg.study.work_dir = Some(dir.path().join("runs"));
        cfg.study.results_file = dir.path().join("out").join("results.csv");

        let err = crate::Study::from_config(cfg).err().unwrap();
        assert!(matches!(err, StudyError::Config(_)));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn missing_emission_output_skips_runs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = study_config(dir.path());
        let results = dir.path().join("results.csv");

        let mut study = StudyBuilder::new(cfg, FakeSumo::silent(), ResultsWriter::open(&results).unwrap())
            .build()
            .unwrap();
        let mut obs = Counting::default();
        let summary = study.run(&mut obs).unwrap();

        assert_eq!((summary.completed, summary.skipped), (0, 2));
        assert_eq!(obs.skipped, 2);
        assert_eq!(std::fs::read_to_string(&results).unwrap().trim_end(), HEADER);
    }

    #[test]
    fn stale_emission_output_is_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = study_config(dir.path());
        let runs = dir.path().join("runs");
        std::fs::create_dir_all(&runs).unwrap();
        std::fs::write(runs.join("run_0000.emissions.xml"), EMISSIONS).unwrap();

        let mut study = StudyBuilder::new(
            cfg,
            FakeSumo::silent(),
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .build()
        .unwrap();
        let summary = study.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.completed, 0);
        assert!(!runs.join("run_0000.emissions.xml").exists());
    }

    #[test]
    fn simulator_failure_aborts_study() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = study_config(dir.path());
        let results = dir.path().join("results.csv");
        let sim = FakeSumo::failing();
        let calls = sim.calls.clone();

        let mut study = StudyBuilder::new(cfg, sim, ResultsWriter::open(&results).unwrap())
            .build()
            .unwrap();
        let err = study.run(&mut NoopObserver).unwrap_err();

        assert!(matches!(err, StudyError::Sumo(_)));
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(std::fs::read_to_string(&results).unwrap().trim_end(), HEADER);
    }

    #[test]
    fn unmapped_class_aborts_before_simulation() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = study_config(dir.path());
        // Scooters have no routes.
        cfg.samples.scenarios[0].proportions = ms_core::Proportions::new([0.0, 0.0, 1.0, 0.0]).unwrap();
        let sim = FakeSumo::writing(EMISSIONS);
        let calls = sim.calls.clone();

        let mut study = StudyBuilder::new(
            cfg,
            sim,
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .build()
        .unwrap();
        let err = study.run(&mut NoopObserver).unwrap_err();
        assert!(matches!(err, StudyError::Trips(_)));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn per_vehicle_aggregation_writes_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = study_config(dir.path());
        cfg.study.aggregation = Aggregation::PerVehicle;

        let mut study = StudyBuilder::new(
            cfg,
            FakeSumo::writing(EMISSIONS),
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .build()
        .unwrap();
        let summary = study.run(&mut LogObserver::new()).unwrap();

        assert_eq!(summary.completed, 2);
        // Two scenarios × two vehicle types.
        assert_eq!(summary.class_means.len(), 4);
        assert_eq!(summary.class_means[0].scenario, "cars");
        assert_eq!(summary.class_means[0].vehicle_type, "bus");
        assert_eq!(summary.class_means[0].mean.co2, 4.0);

        let runs = dir.path().join("runs");
        assert!(runs.join("run_0000.emissions.csv").is_file());
        let means = std::fs::read_to_string(runs.join("class_means.csv")).unwrap();
        assert_eq!(means.lines().count(), 5);
    }

    #[test]
    fn router_output_is_simulated() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = study_config(dir.path());
        cfg.files.net = Some(dir.path().join("net.net.xml"));
        let calls = Rc::new(RefCell::new(0));

        let mut study = StudyBuilder::new(
            cfg,
            FakeSumo::writing(EMISSIONS),
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .router(CopyRouter { calls: calls.clone() })
        .build()
        .unwrap();
        study.run(&mut NoopObserver).unwrap();

        assert_eq!(*calls.borrow(), 2);
        let paths = IterationPaths::new(study.work_dir(), RunId(0));
        let cfg_text = std::fs::read_to_string(&paths.config).unwrap();
        assert_eq!(value_of(&cfg_text, "route-files").unwrap(), paths.routes.to_string_lossy());
    }

    #[test]
    fn router_needs_network() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = study_config(dir.path());
        let result = StudyBuilder::new(
            cfg,
            FakeSumo::silent(),
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .router(CopyRouter { calls: Rc::default() })
        .build();
        assert!(matches!(result, Err(StudyError::Config(_))));
    }

    #[test]
    fn missing_base_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = study_config(dir.path());
        cfg.files.sumocfg = dir.path().join("nope.sumocfg");
        let result = StudyBuilder::new(
            cfg,
            FakeSumo::silent(),
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .build();
        assert!(matches!(result, Err(StudyError::Config(_))));
    }

    #[test]
    fn flow_mode_rescales_base_routes() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = study_config(dir.path());
        let flows = dir.path().join("flows.rou.xml");
        std::fs::write(
            &flows,
            r#"<routes>
    <flow id="f_pkw" type="pkw" begin="0" end="100" number="60" from="A" to="B"/>
    <flow id="f_bus" type="bus" begin="0" end="100" number="40" from="B" to="C"/>
</routes>
"#,
        )
        .unwrap();
        cfg.trips.mode = TripMode::Flows;
        cfg.trips.route_file = Some(flows);

        let mut study = StudyBuilder::new(
            cfg,
            FakeSumo::writing(EMISSIONS),
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .build()
        .unwrap();
        study.run(&mut NoopObserver).unwrap();

        let paths = IterationPaths::new(study.work_dir(), RunId(0));
        let routes = std::fs::read_to_string(&paths.routes).unwrap();
        assert!(routes.contains(r#"id="f_pkw" type="pkw" begin="0" end="100" number="100""#));
        assert!(routes.contains(r#"id="f_bus" type="bus" begin="0" end="100" number="1""#));
        assert!(!paths.trips.exists());
    }

    #[test]
    fn runs_are_reproducible() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        for dir in [&a, &b] {
            let cfg = study_config(dir.path());
            StudyBuilder::new(
                cfg,
                FakeSumo::writing(EMISSIONS),
                ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
            )
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap();
        }
        for run in ["run_0000.trips.xml", "run_0001.trips.xml"] {
            assert_eq!(
                std::fs::read(a.path().join("runs").join(run)).unwrap(),
                std::fs::read(b.path().join("runs").join(run)).unwrap()
            );
        }
    }

    #[test]
    fn explicit_samples_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = study_config(dir.path());
        let samples = crate::sobol_samples(3, 1, &[]).unwrap();
        let study = StudyBuilder::new(
            cfg,
            FakeSumo::silent(),
            ResultsWriter::open(&dir.path().join("results.csv")).unwrap(),
        )
        .samples(samples.clone())
        .build()
        .unwrap();
        assert_eq!(study.samples(), samples.as_slice());
    }
}
