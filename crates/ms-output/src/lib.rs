//! `ms-output` — study output writers.
//!
//! | File                     | Writer               | Mode                          |
//! |--------------------------|----------------------|-------------------------------|
//! | results table            | [`ResultsWriter`]    | append, header once, flushed  |
//! | per-vehicle emissions    | [`VehicleCsvWriter`] | overwrite                     |
//! | per-type means           | [`write_class_means`]| overwrite                     |
//!
//! The study driver writes results through the [`OutputWriter`] trait.

pub mod csv;
pub mod error;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::{ResultsWriter, VehicleCsvWriter, write_class_means};
pub use error::{OutputError, OutputResult};
pub use row::ResultRow;
pub use writer::OutputWriter;
