//! `ms-trips` — vehicle trip generation and SUMO route-file I/O.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`trip`]       | `Trip`, departure-order helpers                            |
//! | [`topology`]   | `RouteTopology`, `RouteEntry`                              |
//! | [`network`]    | `read_edge_pool` (usable edges of a `.net.xml`)            |
//! | [`generator`]  | `TripGenerator`, `EdgeSource`, `generate_trips`            |
//! | [`route_file`] | `write_route_file`, `render_route_file`, `read_trips`      |
//! | [`flows`]      | `adjust_flow_shares`, `set_flow_numbers` (flow-based files)|
//! | [`histogram`]  | `departure_histogram`                                      |
//! | [`error`]      | `TripError`, `TripResult<T>`                               |

pub mod error;
pub mod flows;
pub mod generator;
pub mod histogram;
pub mod network;
pub mod route_file;
pub mod topology;
pub mod trip;


pub use error::{TripError, TripResult};
pub use flows::{adjust_flow_file, adjust_flow_shares, class_flow_totals, set_flow_numbers};
pub use generator::{EdgeSource, TripGenerator, generate_trips};
pub use histogram::departure_histogram;
pub use network::{INTERNAL_EDGE_PREFIX, edge_pool_from_str, read_edge_pool};
pub use route_file::{read_trips, render_route_file, trips_from_str, write_route_file};
pub use topology::{RouteEntry, RouteTopology};
pub use trip::{Trip, is_departure_sorted, sort_by_departure};
