//! `ms-sumo` — everything that touches the SUMO installation.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`config_file`] | `ConfigPatch` (route-files / emission-output rewriting)   |
//! | [`runner`]      | `Simulator`, `TripRouter`, `SumoProcess`, `Duarouter`     |
//! | [`error`]       | `SumoError`, `SumoResult<T>`                              |

pub mod config_file;
pub mod error;
pub mod runner;


pub use config_file::ConfigPatch;
pub use error::{SumoError, SumoResult};
pub use runner::{Duarouter, ExitPolicy, Simulator, SumoProcess, TripRouter, tool_path};
