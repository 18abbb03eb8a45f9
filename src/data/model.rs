use std::collections::BTreeSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RvDataset – the radial-velocity measurements
// ---------------------------------------------------------------------------

/// RV measurements from one or more instruments.
///
/// All four columns always have the same length. Instrument indices are
/// 1-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RvDataset {
    pub time: Vec<f64>,
    pub velocity: Vec<f64>,
    pub uncertainty: Vec<f64>,
    pub instrument: Vec<u32>,
}

impl RvDataset {
    /// Append one measurement.
    pub fn push(&mut self, time: f64, velocity: f64, uncertainty: f64, instrument: u32) {
        self.time.push(time);
        self.velocity.push(velocity);
        self.uncertainty.push(uncertainty);
        self.instrument.push(instrument);
    }

    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Sorted distinct instrument indices.
    pub fn instruments(&self) -> BTreeSet<u32> {
        self.instrument.iter().copied().collect()
    }

    /// Row indices measured by `instrument`.
    pub fn rows_for(&self, instrument: u32) -> Vec<usize> {
        self.instrument
            .iter()
            .enumerate()
            .filter(|(_, &i)| i == instrument)
            .map(|(row, _)| row)
            .collect()
    }

    /// Multiply velocities and uncertainties by `factor` (unit conversion).
    pub fn scale(&mut self, factor: f64) {
        for v in self.velocity.iter_mut().chain(self.uncertainty.iter_mut()) {
            *v *= factor;
        }
    }

    /// Earliest and latest observation time.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let min = self.time.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self.time.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }

    /// Midpoint of the observation window, the reference epoch of a trend.
    pub fn t_middle(&self) -> Option<f64> {
        self.time_span().map(|(min, max)| min + 0.5 * (max - min))
    }
}

// ---------------------------------------------------------------------------
// ColumnLayout – where each parameter lives in a posterior row
// ---------------------------------------------------------------------------

/// Column positions of the model parameters in the posterior sample table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// One jitter per instrument, or a single `extra_sigma` column.
    pub jitters: Range<usize>,
    pub slope: Option<usize>,
    pub fiber_offset: Option<usize>,
    /// `offset{j}` is added to instrument `j` (1..N-1); instrument N is the
    /// reference.
    pub offsets: Range<usize>,
    /// eta1..eta4 when the model has a GP.
    pub etas: Option<Range<usize>>,
    pub ndim: usize,
    pub max_np: usize,
    /// muP, wP, muK when hyperpriors are used.
    pub hyperpriors: Option<Range<usize>>,
    pub np: usize,
    /// First column of the planet block (P, K, phi, ecc, w; each `max_np` wide).
    pub planets_start: usize,
    /// Number of planet slots in the block.
    pub max_planets: usize,
    pub staleness: usize,
    pub vsys: usize,
    /// Total number of columns.
    pub width: usize,
}

/// The five per-planet parameters in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanetParam {
    Period,
    SemiAmplitude,
    Phi,
    Ecc,
    Omega,
}

impl PlanetParam {
    fn block(self) -> usize {
        match self {
            PlanetParam::Period => 0,
            PlanetParam::SemiAmplitude => 1,
            PlanetParam::Phi => 2,
            PlanetParam::Ecc => 3,
            PlanetParam::Omega => 4,
        }
    }
}

impl ColumnLayout {
    /// Column of `param` for planet slot `slot` (0-based).
    pub fn planet_column(&self, param: PlanetParam, slot: usize) -> Option<usize> {
        (slot < self.max_planets)
            .then(|| self.planets_start + param.block() * self.max_planets + slot)
    }
}

// ---------------------------------------------------------------------------
// PosteriorSamples – rows of the posterior sample file
// ---------------------------------------------------------------------------

/// Posterior samples, one row per sample, all rows equally wide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosteriorSamples {
    pub rows: Vec<Vec<f64>>,
}

impl PosteriorSamples {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns (0 when empty).
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// All values of column `col`.
    pub fn column(&self, col: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[col]).collect()
    }
}
