//! The `Trip` record and departure-order helpers.

use ms_core::VehicleClass;

/// One vehicle's journey: class, departure time, origin and destination edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    /// `<class>_<k>`, unique within a trip set.
    pub id:          String,
    pub class:       VehicleClass,
    /// Seconds since simulation start, two decimals.
    pub depart:      f64,
    pub from:        String,
    pub to:          String,
}

/// Sort trips by non-decreasing departure.  Stable, so trips sharing a
/// departure time keep their generation order.
pub fn sort_by_departure(trips: &mut [Trip]) {
    trips.sort_by(|a, b| a.depart.total_cmp(&b.depart));
}

/// `true` if `trips` is in non-decreasing departure order.
pub fn is_departure_sorted(trips: &[Trip]) -> bool {
    trips.windows(2).all(|w| w[0].depart <= w[1].depart)
}
