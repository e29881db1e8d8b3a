//! Error type for SUMO configuration and process handling.

use std::path::PathBuf;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SumoError {
    #[error("configuration document error: {0}")]
    Document(String),

    #[error("failed to start '{}': {source}", .program.display())]
    Spawn {
        program: PathBuf,
        source:  std::io::Error,
    },

    #[error("'{}' exited with {}", .program.display(), exit_code_label(.code))]
    ExitStatus {
        program: PathBuf,
        /// `None` if the process was terminated by a signal.
        code:    Option<i32>,
    },

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

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_owned(),
    }
}

pub type SumoResult<T> = Result<T, SumoError>;
