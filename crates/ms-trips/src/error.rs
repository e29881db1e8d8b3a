//! Trip-subsystem error type.

use std::path::PathBuf;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

use ms_core::{MsError, VehicleClass};

/// Errors produced by `ms-trips`.
#[derive(Debug, Error)]
pub enum TripError {
    #[error(transparent)]
    Core(#[from] MsError),

    #[error("vehicle class {0} was sampled but has no origin with a destination in the route topology")]
    MissingRoutes(VehicleClass),

    #[error("edge pool has {got} usable edges; at least 2 are needed to pick distinct origin and destination")]
    TooFewEdges { got: usize },

    #[error("simulation duration must be finite and positive, got {0}")]
    InvalidDuration(f64),

    #[error("histogram needs at least one bin")]
    NoBins,

    #[error("<{element}> is missing required attribute {attribute:?}")]
    MissingAttribute {
        element:   &'static str,
        attribute: &'static str,
    },

    #[error("invalid value {value:?} for attribute {attribute:?}")]
    InvalidAttribute { attribute: String, value: String },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attr(#[from] AttrError),

    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("I/O error on '{}': {source}", .path.display())]
    File {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TripResult<T> = Result<T, TripError>;
