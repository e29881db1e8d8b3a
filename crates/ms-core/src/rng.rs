//! Deterministic study RNG and the shared weighted class sampler.
//!
//! # Determinism strategy
//!
//! Every study iteration gets its own independent `SmallRng` seeded by:
//!
//!   seed = study_seed XOR (run_index * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive run indices uniformly across the seed space.
//! Any single iteration can therefore be regenerated in isolation from the
//! study seed and its index, without replaying the iterations before it.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::{MsError, MsResult, Proportions, RunId, VehicleClass};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── StudyRng ──────────────────────────────────────────────────────────────────

/// Seeded RNG used for trip generation.
///
/// Implements [`RngCore`], so it can be handed to anything taking a
/// `rand::Rng` (including [`ClassSampler::sample`]).
pub struct StudyRng(SmallRng);

impl StudyRng {
    pub fn new(seed: u64) -> Self {
        StudyRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed deterministically from the study seed and an iteration index.
    pub fn for_run(study_seed: u64, run: RunId) -> Self {
        let seed = study_seed ^ (run.0 as u64).wrapping_mul(MIXING_CONSTANT);
        StudyRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Choose `amount` distinct elements (without replacement).
    pub fn choose_distinct<'a, T>(&mut self, slice: &'a [T], amount: usize) -> Vec<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose_multiple(&mut self.0, amount).collect()
    }
}

impl RngCore for StudyRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

// ── ClassSampler ──────────────────────────────────────────────────────────────

/// Discrete weighted distribution over [`VehicleClass`].
///
/// Built once per proportion vector and reused for every trip.  Classes with
/// zero weight are excluded outright: they are never returned, and an
/// all-zero vector is rejected rather than falling back to uniform choice.
#[derive(Clone, Debug)]
pub struct ClassSampler {
    dist:          WeightedIndex<f64>,
    probabilities: [f64; VehicleClass::COUNT],
}

impl ClassSampler {
    /// Normalize `proportions` and build the sampler.
    ///
    /// # Errors
    ///
    /// [`MsError::ZeroTotalWeight`] if no class has positive weight.
    pub fn new(proportions: &Proportions) -> MsResult<Self> {
        let probabilities = proportions.normalized()?;
        let dist = WeightedIndex::new(probabilities)
            .map_err(|e| MsError::Config(format!("invalid class weights: {e}")))?;
        Ok(Self { dist, probabilities })
    }

    /// Draw one class.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> VehicleClass {
        VehicleClass::ALL[self.dist.sample(rng)]
    }

    /// Normalized probability of `class`.
    #[inline]
    pub fn probability(&self, class: VehicleClass) -> f64 {
        self.probabilities[class.index()]
    }

    /// `true` if `class` can ever be drawn.
    #[inline]
    pub fn can_sample(&self, class: VehicleClass) -> bool {
        self.probabilities[class.index()] > 0.0
    }
}
