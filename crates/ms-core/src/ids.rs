//! Study iteration identifier.

use std::fmt;

/// Zero-based index of one sensitivity-study iteration.
///
/// Used to seed the iteration's RNG and to name its on-disk artifacts, so a
/// failing iteration can be inspected and re-run on its own.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct RunId(pub u32);

impl RunId {
    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// File-name stem shared by all artifacts of this run, e.g. `run_0007`.
    pub fn stem(self) -> String {
        format!("run_{:04}", self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RunId({})", self.0)
    }
}

impl TryFrom<usize> for RunId {
    type Error = std::num::TryFromIntError;
    fn try_from(n: usize) -> Result<RunId, Self::Error> {
        u32::try_from(n).map(RunId)
    }
}
