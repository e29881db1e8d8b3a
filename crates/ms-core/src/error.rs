//! Toolkit error type.
//!
//! Sub-crates define their own error enums and wrap `MsError` as one variant
//! via `#[from]`, so configuration problems detected in `ms-core` surface
//! unchanged at every layer.

use thiserror::Error;

use crate::VehicleClass;

/// The base error type for `ms-core` and a common variant of sub-crate errors.
#[derive(Debug, Error)]
pub enum MsError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("proportion vector has {got} entries, expected {expected}")]
    ProportionLength { expected: usize, got: usize },

    #[error("proportion for {class} is {value}, expected a finite non-negative number")]
    InvalidProportion { class: VehicleClass, value: f64 },

    #[error("proportion vector sums to {0}; the total weight must be finite")]
    NonFiniteTotal(f64),

    #[error("proportion vector sums to zero; at least one class must have positive weight")]
    ZeroTotalWeight,

    #[error("unknown vehicle class {0:?}")]
    UnknownClass(String),
}

/// Shorthand result type for `ms-core`.
pub type MsResult<T> = Result<T, MsError>;
