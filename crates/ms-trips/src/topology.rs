//! Per-class route topology: which destinations each origin edge may reach.
//!
//! # Config form
//!
//! Edge ids are case-sensitive, so the topology is written as a list of
//! entries rather than a nested table keyed by edge id:
//!
//! ```toml
//! [[trips.routes]]
//! class = "pkw"
//! from  = "L2"
//! to    = ["L10", "L3", "L4", "L7", "L9"]
//! ```
//!
//! Entries for the same `(class, from)` pair are merged.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use ms_core::VehicleClass;

/// One `class / origin → destinations` row of the topology table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub class: VehicleClass,
    pub from:  String,
    pub to:    Vec<String>,
}

/// Mapping `VehicleClass → origin edge → permitted destination edges`.
///
/// Ordered maps keep sampling reproducible for a given seed regardless of
/// the order entries were declared in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RouteEntry>", into = "Vec<RouteEntry>")]
pub struct RouteTopology {
    routes: BTreeMap<VehicleClass, BTreeMap<String, BTreeSet<String>>>,
}

impl RouteTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add destinations for `class` starting at `from`.
    pub fn insert<I, S>(&mut self, class: VehicleClass, from: impl Into<String>, to: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routes
            .entry(class)
            .or_default()
            .entry(from.into())
            .or_default()
            .extend(to.into_iter().map(Into::into));
        self
    }

    /// Builder-style variant of [`insert`][Self::insert].
    pub fn with<I, S>(mut self, class: VehicleClass, from: impl Into<String>, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(class, from, to);
        self
    }

    /// Origins of `class` and their destination sets, if the class is mapped.
    pub fn origins(&self, class: VehicleClass) -> Option<&BTreeMap<String, BTreeSet<String>>> {
        self.routes.get(&class)
    }

    /// `true` if `from → to` is a permitted pair for `class`.
    pub fn allows(&self, class: VehicleClass, from: &str, to: &str) -> bool {
        self.routes
            .get(&class)
            .and_then(|o| o.get(from))
            .is_some_and(|d| d.contains(to))
    }

    /// `true` if `class` has at least one origin with at least one destination.
    pub fn is_routable(&self, class: VehicleClass) -> bool {
        self.routes
            .get(&class)
            .is_some_and(|o| o.values().any(|d| !d.is_empty()))
    }

    /// Classes with at least one entry (routable or not).
    pub fn classes(&self) -> impl Iterator<Item = VehicleClass> + '_ {
        self.routes.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Total number of permitted `(class, from, to)` triples.
    pub fn pair_count(&self) -> usize {
        self.routes
            .values()
            .flat_map(|o| o.values())
            .map(BTreeSet::len)
            .sum()
    }
}

impl From<Vec<RouteEntry>> for RouteTopology {
    fn from(entries: Vec<RouteEntry>) -> Self {
        let mut topology = RouteTopology::new();
        for entry in entries {
            topology.insert(entry.class, entry.from, entry.to);
        }
        topology
    }
}

impl From<RouteTopology> for Vec<RouteEntry> {
    fn from(topology: RouteTopology) -> Self {
        topology
            .routes
            .into_iter()
            .flat_map(|(class, origins)| {
                origins.into_iter().map(move |(from, to)| RouteEntry {
                    class,
                    from,
                    to: to.into_iter().collect(),
                })
            })
            .collect()
    }
}
