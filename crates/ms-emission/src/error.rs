//! Error type for emission-output parsing.

use std::path::PathBuf;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("attribute '{attribute}' is not a number: {value:?}")]
    InvalidNumber { attribute: String, value: String },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attr(#[from] AttrError),

    #[error("I/O error on '{}': {source}", .path.display())]
    File {
        path:   PathBuf,
        source: std::io::Error,
    },
}

pub type EmissionResult<T> = Result<T, EmissionError>;
