//! Constrained random trip generation.
//!
//! # Algorithm
//!
//! ```text
//! for each of N trips:
//!   class  ← weighted choice over normalized proportions   (ClassSampler)
//!   pool mode:      (from, to) ← two distinct edges, uniform
//!   topology mode:  from ← uniform over class origins with ≥ 1 destination
//!                   to   ← uniform over destinations of `from`
//!   depart ← uniform [0, D], rounded to 2 decimals
//!   id     ← "<class>_<k>", k = per-class running counter
//! sort by depart (stable)
//! ```
//!
//! Generation is all-or-nothing: any error aborts the call and no partial
//! trip set is returned, so nothing half-built can reach the serializer.

use ms_core::{ClassSampler, Proportions, StudyRng, VehicleClass};

use crate::topology::RouteTopology;
use crate::trip::{Trip, sort_by_departure};
use crate::{TripError, TripResult};

/// Where origin and destination edges come from.
#[derive(Clone, Copy, Debug)]
pub enum EdgeSource<'a> {
    /// Any two distinct edges of a flat pool.
    Pool(&'a [String]),
    /// Per-class origin → destination constraints.
    Topology(&'a RouteTopology),
}

/// Origin choices of one class, restricted to origins that have destinations.
type ClassRoutes<'a> = Vec<(&'a str, Vec<&'a str>)>;

/// Generates trip sets for one proportion vector.
///
/// Build once per study iteration, then call [`generate`][Self::generate].
#[derive(Debug)]
pub struct TripGenerator<'a> {
    sampler: ClassSampler,
    source:  EdgeSource<'a>,
    /// Topology mode only: resolved per-class origin tables, indexed by class.
    routes:  [ClassRoutes<'a>; VehicleClass::COUNT],
}

impl<'a> TripGenerator<'a> {
    /// Normalize `proportions` and resolve the edge source.
    ///
    /// # Errors
    ///
    /// - [`MsError::ZeroTotalWeight`][ms_core::MsError::ZeroTotalWeight] if
    ///   every weight is zero.
    /// - [`TripError::TooFewEdges`] in pool mode with fewer than two edges.
    pub fn new(proportions: &Proportions, source: EdgeSource<'a>) -> TripResult<Self> {
        let sampler = ClassSampler::new(proportions)?;

        let routes: [ClassRoutes<'a>; VehicleClass::COUNT] = match source {
            EdgeSource::Pool(edges) => {
                if edges.len() < 2 {
                    return Err(TripError::TooFewEdges { got: edges.len() });
                }
                Default::default()
            }
            EdgeSource::Topology(topology) => VehicleClass::ALL.map(|class| {
                topology
                    .origins(class)
                    .map(|origins| {
                        origins
                            .iter()
                            .filter(|(_, dests)| !dests.is_empty())
                            .map(|(from, dests)| {
                                (from.as_str(), dests.iter().map(String::as_str).collect())
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            }),
        };

        Ok(Self { sampler, source, routes })
    }

    /// Generate `vehicles` trips departing within `[0, duration]`, sorted by
    /// departure.
    ///
    /// # Errors
    ///
    /// - [`TripError::InvalidDuration`] if `duration` is not finite and positive.
    /// - [`TripError::MissingRoutes`] in topology mode when a sampled class has
    ///   no origin with a destination.
    pub fn generate(
        &self,
        vehicles: usize,
        duration: f64,
        rng:      &mut StudyRng,
    ) -> TripResult<Vec<Trip>> {
        if vehicles == 0 {
            return Ok(Vec::new());
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TripError::InvalidDuration(duration));
        }

        let mut counters = [0usize; VehicleClass::COUNT];
        let mut trips = Vec::with_capacity(vehicles);

        for _ in 0..vehicles {
            let class = self.sampler.sample(rng);
            let (from, to) = self.pick_edges(class, rng)?;
            let depart = round_depart(rng.gen_range(0.0..=duration), duration);

            let k = &mut counters[class.index()];
            trips.push(Trip {
                id: format!("{class}_{k}"),
                class,
                depart,
                from: from.to_owned(),
                to: to.to_owned(),
            });
            *k += 1;
        }

        sort_by_departure(&mut trips);
        Ok(trips)
    }

    /// The class sampler built from the proportion vector.
    pub fn sampler(&self) -> &ClassSampler {
        &self.sampler
    }

    fn pick_edges(&self, class: VehicleClass, rng: &mut StudyRng) -> TripResult<(&'a str, &'a str)> {
        match self.source {
            EdgeSource::Pool(edges) => {
                let picked = rng.choose_distinct(edges, 2);
                match picked.as_slice() {
                    [from, to] => Ok((from.as_str(), to.as_str())),
                    _ => Err(TripError::TooFewEdges { got: edges.len() }),
                }
            }
            EdgeSource::Topology(_) => {
                let origins = &self.routes[class.index()];
                let (from, dests) = rng.choose(origins).ok_or(TripError::MissingRoutes(class))?;
                let to = rng.choose(dests).ok_or(TripError::MissingRoutes(class))?;
                Ok((*from, *to))
            }
        }
    }
}

/// Round to two decimals, never past the end of the simulation.
fn round_depart(raw: f64, duration: f64) -> f64 {
    ((raw * 100.0).round() / 100.0).min(duration)
}

/// One-shot convenience wrapper around [`TripGenerator`].
pub fn generate_trips(
    vehicles:    usize,
    duration:    f64,
    proportions: &Proportions,
    source:      EdgeSource<'_>,
    rng:         &mut StudyRng,
) -> TripResult<Vec<Trip>> {
    if vehicles == 0 {
        return Ok(Vec::new());
    }
    TripGenerator::new(proportions, source)?.generate(vehicles, duration, rng)
}
