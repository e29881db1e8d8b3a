//! Per (scenario, vehicle type) means over per-vehicle emission rows.

use std::collections::BTreeMap;

use crate::parse::{EmissionTotals, VehicleEmissionRow};

/// Mean pollutant values of one vehicle type within one scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassMean {
    pub scenario:     String,
    pub vehicle_type: String,
    /// Number of vehicle rows the mean is taken over.
    pub samples:      usize,
    pub mean:         EmissionTotals,
}

/// Group `rows` by `(scenario, vehicle_type)` and average each pollutant.
///
/// Output is ordered by scenario, then vehicle type.
pub fn class_means(rows: &[VehicleEmissionRow]) -> Vec<ClassMean> {
    let mut groups: BTreeMap<(&str, &str), (EmissionTotals, usize)> = BTreeMap::new();
    for row in rows {
        let entry = groups
            .entry((row.scenario.as_str(), row.vehicle_type.as_str()))
            .or_default();
        entry.0 += row.emissions;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((scenario, vehicle_type), (sum, n))| ClassMean {
            scenario:     scenario.to_owned(),
            vehicle_type: vehicle_type.to_owned(),
            samples:      n,
            mean:         sum.scaled(1.0 / n as f64),
        })
        .collect()
}
