//! Vehicle-mix proportion vectors.
//!
//! A [`Proportions`] holds one non-negative weight per [`VehicleClass`], in
//! positional order.  Weights need not sum to one: raw vehicle counts from a
//! sampler or percentage scenarios are equally valid.  Normalization happens
//! when a [`ClassSampler`][crate::ClassSampler] is built from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{MsError, MsResult, VehicleClass};

/// Per-class weights of one sensitivity-study sample.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Proportions([f64; VehicleClass::COUNT]);

impl Proportions {
    /// Validate and wrap a weight array.
    ///
    /// Every entry must be finite and `>= 0`, and so must their sum.  An all-zero vector is accepted
    /// here and rejected only when a sampler is built from it, so a sample
    /// table can be loaded and reported on before any generation happens.
    pub fn new(weights: [f64; VehicleClass::COUNT]) -> MsResult<Self> {
        for class in VehicleClass::ALL {
            let value = weights[class.index()];
            if !value.is_finite() || value < 0.0 {
                return Err(MsError::InvalidProportion { class, value });
            }
        }
        let total: f64 = weights.iter().sum();
        if !total.is_finite() {
            return Err(MsError::NonFiniteTotal(total));
        }
        Ok(Self(weights))
    }

    /// Like [`new`][Self::new] but from a slice whose length is checked.
    pub fn from_slice(weights: &[f64]) -> MsResult<Self> {
        let array: [f64; VehicleClass::COUNT] =
            weights.try_into().map_err(|_| MsError::ProportionLength {
                expected: VehicleClass::COUNT,
                got:      weights.len(),
            })?;
        Self::new(array)
    }

    /// Build from a class → weight map; absent classes get weight 0.
    pub fn from_map(map: &BTreeMap<VehicleClass, f64>) -> MsResult<Self> {
        let mut weights = [0.0; VehicleClass::COUNT];
        for (class, weight) in map {
            weights[class.index()] = *weight;
        }
        Self::new(weights)
    }

    /// A vector assigning all weight to a single class.
    pub fn only(class: VehicleClass) -> Self {
        let mut weights = [0.0; VehicleClass::COUNT];
        weights[class.index()] = 1.0;
        Self(weights)
    }

    #[inline]
    pub fn get(&self, class: VehicleClass) -> f64 {
        self.0[class.index()]
    }

    #[inline]
    pub fn as_array(&self) -> &[f64; VehicleClass::COUNT] {
        &self.0
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// The weights scaled to sum to one.
    ///
    /// # Errors
    ///
    /// [`MsError::ZeroTotalWeight`] if every weight is zero.
    pub fn normalized(&self) -> MsResult<[f64; VehicleClass::COUNT]> {
        let total = self.total();
        if total <= 0.0 {
            return Err(MsError::ZeroTotalWeight);
        }
        Ok(self.0.map(|w| w / total))
    }

    /// `(class, weight)` pairs in positional order.
    pub fn iter(&self) -> impl Iterator<Item = (VehicleClass, f64)> + '_ {
        VehicleClass::ALL.into_iter().map(|c| (c, self.0[c.index()]))
    }
}

impl TryFrom<Vec<f64>> for Proportions {
    type Error = MsError;

    fn try_from(weights: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice(&weights)
    }
}

impl From<Proportions> for Vec<f64> {
    fn from(p: Proportions) -> Vec<f64> {
        p.0.to_vec()
    }
}

impl std::fmt::Display for Proportions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(c, w)| format!("{c}={w}")).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
