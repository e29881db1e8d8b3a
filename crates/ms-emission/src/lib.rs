//! `ms-emission` — reading SUMO emission output.
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`parse`]   | `EmissionTotals`, `VehicleEmissionRow`, `aggregate_totals`     |
//! | [`summary`] | `ClassMean`, `class_means`                                    |
//! | [`error`]   | `EmissionError`, `EmissionResult<T>`                          |
//!
//! A missing emission file is not an error: the file-based entry points
//! return `Ok(None)` and leave the decision to the caller.

pub mod error;
pub mod parse;
pub mod summary;


pub use error::{EmissionError, EmissionResult};
pub use parse::{
    EmissionTotals, VehicleEmissionRow, aggregate_totals, read_vehicle_rows, totals_from_str,
    vehicle_rows_from_str,
};
pub use summary::{ClassMean, class_means};
