//! Vehicle class enumeration and the fixed vehicle-type catalog.
//!
//! The positional order of [`VehicleClass::ALL`] defines how proportion
//! vectors, sample tables and result rows map onto class names.  It must not
//! change between runs of one study.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MsError;

/// The vehicle classes modelled in the emission study.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    /// Passenger car (Personenkraftwagen).
    Pkw,
    Bus,
    Scooter,
    Bike,
}

impl VehicleClass {
    /// Number of classes; the length of every proportion vector.
    pub const COUNT: usize = 4;

    /// All classes in positional order.
    pub const ALL: [VehicleClass; Self::COUNT] = [
        VehicleClass::Pkw,
        VehicleClass::Bus,
        VehicleClass::Scooter,
        VehicleClass::Bike,
    ];

    /// Position of this class in proportion vectors and result rows.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used as SUMO `vType` id, CSV column, and trip id prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleClass::Pkw     => "pkw",
            VehicleClass::Bus     => "bus",
            VehicleClass::Scooter => "scooter",
            VehicleClass::Bike    => "bike",
        }
    }

    /// Fixed physical parameters written to the route file for this class.
    pub fn vehicle_type(self) -> VehicleType {
        match self {
            VehicleClass::Pkw     => VehicleType::new(self, 2.6, 4.5, 0.5, 4.5, 50.0),
            VehicleClass::Bus     => VehicleType::new(self, 1.0, 3.0, 0.5, 12.0, 25.0),
            VehicleClass::Scooter => VehicleType::new(self, 3.0, 4.5, 0.5, 2.0, 40.0),
            VehicleClass::Bike    => VehicleType::new(self, 2.0, 4.0, 0.5, 1.8, 15.0),
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = MsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleClass::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| MsError::UnknownClass(s.to_owned()))
    }
}

// ── VehicleType ───────────────────────────────────────────────────────────────

/// One `vType` record of the route file.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleType {
    pub class:         VehicleClass,
    /// Maximum acceleration, m/s².
    pub accel:         f64,
    /// Comfortable deceleration, m/s².
    pub decel:         f64,
    /// Driver imperfection in [0, 1].
    pub sigma:         f64,
    /// Vehicle length, m.
    pub length:        f64,
    /// Maximum speed, m/s.
    pub max_speed:     f64,
}

impl VehicleType {
    pub const fn new(
        class:     VehicleClass,
        accel:     f64,
        decel:     f64,
        sigma:     f64,
        length:    f64,
        max_speed: f64,
    ) -> Self {
        Self { class, accel, decel, sigma, length, max_speed }
    }

    /// The catalog for every class, in [`VehicleClass::ALL`] order.
    pub fn catalog() -> [VehicleType; VehicleClass::COUNT] {
        VehicleClass::ALL.map(VehicleClass::vehicle_type)
    }
}
