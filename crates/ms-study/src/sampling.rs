//! Proportion samples: one [`Sample`] per study run.
//!
//! | Source      | Producer                                           |
//! |-------------|----------------------------------------------------|
//! | `sobol`     | [`SobolSequence`] scaled by per-class bounds        |
//! | `csv`       | [`load_samples_csv`] (`pkw,bus,scooter,bike` table) |
//! | `scenarios` | `[[samples.scenarios]]` in the study config        |

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ms_core::{Proportions, VehicleClass};

use crate::config::{SampleSource, SamplesConfig};
use crate::{StudyError, StudyResult};

/// The proportion vector of one run and the label its per-vehicle output is
/// filed under.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub label:       String,
    pub proportions: Proportions,
}

impl SamplesConfig {
    /// Produce the study's samples in run order.
    pub fn resolve(&self) -> StudyResult<Vec<Sample>> {
        let samples = match self.source {
            SampleSource::Sobol => sobol_samples(self.count, self.skip, &self.bounds)?,
            SampleSource::Csv => {
                let path = self.csv.as_deref().ok_or_else(|| {
                    StudyError::Config("samples.source = \"csv\" needs samples.csv".into())
                })?;
                load_samples_csv(path)?
            }
            SampleSource::Scenarios => self
                .scenarios
                .iter()
                .map(|s| Sample { label: s.name.clone(), proportions: s.proportions })
                .collect(),
        };
        if samples.is_empty() {
            return Err(StudyError::Samples("no samples to run".into()));
        }
        Ok(samples)
    }
}

// ── Sobol ─────────────────────────────────────────────────────────────────────

const BITS: usize = 32;
const SCALE: f64 = (1u64 << BITS) as f64;

/// `(s, a, m)` per dimension after the first, from the Joe–Kuo table.
const DIRECTIONS: [(usize, u32, &[u32]); 5] = [
    (1, 0, &[1]),
    (2, 1, &[1, 3]),
    (3, 1, &[1, 3, 1]),
    (3, 2, &[1, 1, 1]),
    (4, 1, &[1, 1, 3, 3]),
];

/// Gray-code Sobol low-discrepancy sequence in `[0, 1)^dims`, starting at
/// the origin.
#[derive(Clone, Debug)]
pub struct SobolSequence {
    directions: Vec<[u32; BITS]>,
    state:      Vec<u32>,
    index:      u32,
}

impl SobolSequence {
    pub const MAX_DIMS: usize = DIRECTIONS.len() + 1;

    pub fn new(dims: usize) -> StudyResult<Self> {
        if dims == 0 || dims > Self::MAX_DIMS {
            return Err(StudyError::Samples(format!(
                "Sobol dimension {dims} outside 1..={}",
                Self::MAX_DIMS
            )));
        }
        Ok(Self {
            directions: (0..dims).map(direction_numbers).collect(),
            state:      vec![0; dims],
            index:      0,
        })
    }

    pub fn dims(&self) -> usize {
        self.state.len()
    }
}

impl Iterator for SobolSequence {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Vec<f64>> {
        let point = self.state.iter().map(|&x| x as f64 / SCALE).collect();
        // Flip along the direction of the lowest zero bit of the index.
        let c = self.index.trailing_ones() as usize;
        if c >= BITS {
            return None;
        }
        for (x, v) in self.state.iter_mut().zip(&self.directions) {
            *x ^= v[c];
        }
        self.index += 1;
        Some(point)
    }
}

fn direction_numbers(dim: usize) -> [u32; BITS] {
    let mut v = [0u32; BITS];
    if dim == 0 {
        for (i, vi) in v.iter_mut().enumerate() {
            *vi = 1 << (BITS - 1 - i);
        }
        return v;
    }

    let (s, a, m) = DIRECTIONS[dim - 1];
    for i in 0..s {
        v[i] = m[i] << (BITS - 1 - i);
    }
    for i in s..BITS {
        let mut x = v[i - s] ^ (v[i - s] >> s);
        for k in 1..s {
            if (a >> (s - 1 - k)) & 1 == 1 {
                x ^= v[i - k];
            }
        }
        v[i] = x;
    }
    v
}

/// `count` Sobol points over the four classes after skipping `skip`, each
/// coordinate scaled to its class's `(low, high)` bound (unit range when
/// `bounds` is empty).
pub fn sobol_samples(count: usize, skip: usize, bounds: &[(f64, f64)]) -> StudyResult<Vec<Sample>> {
    let bounds = match bounds.len() {
        0 => vec![(0.0, 1.0); VehicleClass::COUNT],
        n if n == VehicleClass::COUNT => bounds.to_vec(),
        n => {
            return Err(StudyError::Samples(format!(
                "samples.bounds has {n} entries, expected {}",
                VehicleClass::COUNT
            )));
        }
    };
    for (class, &(low, high)) in VehicleClass::ALL.iter().zip(&bounds) {
        if !(low.is_finite() && high.is_finite() && 0.0 <= low && low <= high) {
            return Err(StudyError::Samples(format!("invalid bounds for {class}: [{low}, {high}]")));
        }
    }

    SobolSequence::new(VehicleClass::COUNT)?
        .skip(skip)
        .take(count)
        .enumerate()
        .map(|(i, point)| -> StudyResult<Sample> {
            let mut weights = [0.0; VehicleClass::COUNT];
            for ((w, u), (low, high)) in weights.iter_mut().zip(&point).zip(&bounds) {
                *w = low + u * (high - low);
            }
            Ok(Sample {
                label:       format!("sobol_{i}"),
                proportions: Proportions::new(weights)?,
            })
        })
        .collect()
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SampleRecord {
    pkw:     f64,
    bus:     f64,
    scooter: f64,
    bike:    f64,
}

/// Load a `pkw,bus,scooter,bike` table, one sample per row.
pub fn load_samples_csv(path: &Path) -> StudyResult<Vec<Sample>> {
    let file = std::fs::File::open(path).map_err(|source| StudyError::File {
        path: path.to_path_buf(),
        source,
    })?;
    load_samples_reader(file)
}

/// Like [`load_samples_csv`] but from any `Read` source.
pub fn load_samples_reader<R: Read>(reader: R) -> StudyResult<Vec<Sample>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut samples = Vec::new();
    for (i, result) in csv_reader.deserialize::<SampleRecord>().enumerate() {
        let r = result.map_err(|e| StudyError::Samples(e.to_string()))?;
        samples.push(Sample {
            label:       format!("sample_{i}"),
            proportions: Proportions::new([r.pkw, r.bus, r.scooter, r.bike])?,
        });
    }
    Ok(samples)
}
