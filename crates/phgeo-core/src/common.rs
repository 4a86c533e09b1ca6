// crates/phgeo-core/src/common.rs
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Record counts per level.
///
/// Returned by [`GeoDb::stats`](crate::GeoDb::stats); the counts reflect the
/// in-memory store at the time of the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStats {
    pub regions: usize,
    pub provinces: usize,
    pub municipalities: usize,
    pub barangays: usize,
}

impl DbStats {
    pub fn total(&self) -> usize {
        self.regions + self.provinces + self.municipalities + self.barangays
    }
}

/// Records removed by one cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub regions: usize,
    pub provinces: usize,
    pub municipalities: usize,
    pub barangays: usize,
}

impl AddAssign for DeleteSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.regions += rhs.regions;
        self.provinces += rhs.provinces;
        self.municipalities += rhs.municipalities;
        self.barangays += rhs.barangays;
    }
}

/// Records inserted by a fixture run, one count per fixture step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub steps: Vec<(String, usize)>,
}

impl LoadSummary {
    pub fn total(&self) -> usize {
        self.steps.iter().map(|(_, n)| n).sum()
    }

    /// Count for the step loading `fixture`, if it ran.
    pub fn count(&self, fixture: &str) -> Option<usize> {
        self.steps
            .iter()
            .find(|(name, _)| name == fixture)
            .map(|(_, n)| *n)
    }
}
