use std::path::PathBuf;

use ms_core::MsError;
use ms_emission::EmissionError;
use ms_output::OutputError;
use ms_sumo::SumoError;
use ms_trips::TripError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudyError {
    #[error("study configuration error: {0}")]
    Config(String),

    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("sample table error: {0}")]
    Samples(String),

    #[error(transparent)]
    Core(#[from] MsError),

    #[error("trip generation failed: {0}")]
    Trips(#[from] TripError),

    #[error("SUMO stage failed: {0}")]
    Sumo(#[from] SumoError),

    #[error("emission output unreadable: {0}")]
    Emission(#[from] EmissionError),

    #[error("results output failed: {0}")]
    Output(#[from] OutputError),

    #[error("I/O error on '{}': {source}", .path.display())]
    File {
        path:   PathBuf,
        source: std::io::Error,
    },
}

pub type StudyResult<T> = Result<T, StudyError>;
