//! Plain data row types written by the output backends.

use ms_core::{Proportions, VehicleClass};
use ms_emission::EmissionTotals;

/// One line of the results table: the scenario's class weights followed by
/// the emission totals of its simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultRow {
    pub proportions: Proportions,
    pub totals:      EmissionTotals,
}

impl ResultRow {
    /// `pkw,bus,scooter,bike,co2,co,hc,nox,pmx,fuel`
    pub fn header() -> Vec<&'static str> {
        VehicleClass::ALL
            .iter()
            .map(|c| c.as_str())
            .chain(EmissionTotals::COLUMNS)
            .collect()
    }

    pub fn fields(&self) -> Vec<String> {
        self.proportions
            .as_array()
            .iter()
            .chain(self.totals.as_array().iter())
            .map(f64::to_string)
            .collect()
    }
}
