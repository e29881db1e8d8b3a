//! Departure-time histogram per vehicle class.

use std::collections::BTreeMap;

use ms_core::VehicleClass;

use crate::trip::Trip;
use crate::{TripError, TripResult};

/// Count departures per class over `bins` equal bins of normalized time
/// `depart / duration ∈ [0, 1]`.  A departure at exactly `duration` falls in
/// the last bin.  Only classes that occur in `trips` get an entry.
pub fn departure_histogram(
    trips:    &[Trip],
    duration: f64,
    bins:     usize,
) -> TripResult<BTreeMap<VehicleClass, Vec<usize>>> {
    if bins == 0 {
        return Err(TripError::NoBins);
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(TripError::InvalidDuration(duration));
    }

    let mut hist: BTreeMap<VehicleClass, Vec<usize>> = BTreeMap::new();
    for trip in trips {
        let norm = (trip.depart / duration).clamp(0.0, 1.0);
        let bin = ((norm * bins as f64) as usize).min(bins - 1);
        hist.entry(trip.class).or_insert_with(|| vec![0; bins])[bin] += 1;
    }
    Ok(hist)
}
