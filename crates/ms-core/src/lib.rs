//! `ms-core` — foundational types for the `mixsens` emission study toolkit.
//!
//! This crate is a dependency of every other `ms-*` crate.  It has no `ms-*`
//! dependencies and minimal external ones (`rand`, `thiserror`, `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`vehicle`]     | `VehicleClass`, `VehicleType` catalog                 |
//! | [`proportions`] | `Proportions` (per-class weight vector)               |
//! | [`rng`]         | `StudyRng` (per-run), `ClassSampler` (weighted choice)|
//! | [`ids`]         | `RunId`                                               |
//! | [`error`]       | `MsError`, `MsResult`                                 |

pub mod error;
pub mod ids;
pub mod proportions;
pub mod rng;
pub mod vehicle;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{MsError, MsResult};
pub use ids::RunId;
pub use proportions::Proportions;
pub use rng::{ClassSampler, StudyRng};
pub use vehicle::{VehicleClass, VehicleType};
