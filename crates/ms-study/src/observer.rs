//! Study observer trait for progress reporting.

use std::path::Path;

use ms_core::RunId;
use ms_emission::EmissionTotals;

use crate::sampling::Sample;
use crate::study::StudySummary;

/// Callbacks invoked by [`Study::run`][crate::Study::run] around each run.
///
/// All methods have default no-op implementations.
pub trait StudyObserver {
    /// Called once before the first run.
    fn on_study_start(&mut self, _runs: usize) {}

    /// Called before a run's trips are generated.
    fn on_run_start(&mut self, _run: RunId, _sample: &Sample) {}

    /// Called after a run's result row has been appended.
    fn on_run_complete(&mut self, _run: RunId, _totals: &EmissionTotals) {}

    /// Called when a run produced no emission file and was skipped.
    fn on_run_skipped(&mut self, _run: RunId, _emissions: &Path) {}

    /// Called once after the last run.
    fn on_study_end(&mut self, _summary: &StudySummary) {}
}

/// A [`StudyObserver`] that does nothing.
pub struct NoopObserver;

impl StudyObserver for NoopObserver {}

/// Reports progress through the `log` facade.
pub struct LogObserver {
    runs: usize,
}

impl LogObserver {
    pub fn new() -> Self {
        Self { runs: 0 }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyObserver for LogObserver {
    fn on_study_start(&mut self, runs: usize) {
        self.runs = runs;
        log::info!("starting study with {runs} runs");
    }

    fn on_run_start(&mut self, run: RunId, sample: &Sample) {
        log::info!(
            "[{}/{}] {} ({}): {}",
            run.0 + 1,
            self.runs,
            run.stem(),
            sample.label,
            sample.proportions
        );
    }

    fn on_run_complete(&mut self, run: RunId, totals: &EmissionTotals) {
        log::info!("{}: {totals:.3}", run.stem());
    }

    fn on_study_end(&mut self, summary: &StudySummary) {
        log::info!(
            "study finished: {} completed, {} skipped",
            summary.completed,
            summary.skipped
        );
        for m in &summary.class_means {
            log::info!(
                "  {} / {} ({} samples): {:.4}",
                m.scenario,
                m.vehicle_type,
                m.samples,
                m.mean
            );
        }
    }
}
