//! `ms-study` — the emission sensitivity-study driver.
//!
//! # Run loop
//!
//! ```text
//! for (run, sample) in samples:
//!   ① Routes     — generate trips (edge pool / topology) → run_NNNN.trips.xml
//!                  [optional duarouter → run_NNNN.rou.xml]
//!                  or rescale flows → run_NNNN.rou.xml
//!   ② Configure  — base .sumocfg → run_NNNN.sumocfg
//!   ③ Simulate   — sumo -c run_NNNN.sumocfg (blocking)
//!   ④ Aggregate  — run_NNNN.emissions.xml → totals (missing → skip run)
//!   ⑤ Append     — one flushed row in the results CSV
//! ```
//!
//! # Modules
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`config`]   | `StudyConfig` (TOML + `MIXSENS__*` environment)          |
//! | [`sampling`] | `Sample`, `SobolSequence`, CSV sample tables             |
//! | [`builder`]  | `StudyBuilder`                                           |
//! | [`study`]    | `Study`, `IterationPaths`, `StudySummary`                |
//! | [`observer`] | `StudyObserver`, `LogObserver`, `NoopObserver`           |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let config = StudyConfig::load(Path::new("study.toml"))?;
//! let mut study = Study::from_config(config)?;
//! let summary = study.run(&mut LogObserver::new())?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod sampling;
pub mod study;

#[cfg(test)]
mod tests;

pub use builder::StudyBuilder;
pub use config::{
    Aggregation, FilesConfig, NamedScenario, SampleSource, SamplesConfig, StudyConfig, StudySection,
    ToolsConfig, TripMode, TripsConfig,
};
pub use error::{StudyError, StudyResult};
pub use observer::{LogObserver, NoopObserver, StudyObserver};
pub use sampling::{Sample, SobolSequence, load_samples_csv, load_samples_reader, sobol_samples};
pub use study::{IterationPaths, Study, StudySummary};
