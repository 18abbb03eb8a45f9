//! Plot identifiers and the data behind each plot.
//!
//! Everything here is independent of the GUI: the viewer only turns these
//! series into `egui_plot` items.

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cli::ParsedArguments;
use crate::keplerian::model_curve;
use crate::results::KimaResults;
use crate::stats::percentile;

/// Date of the HARPS fiber change (BJD - 2400000); later observations carry
/// the fiber offset.
pub const HARPS_FIBER_CHANGE: f64 = 57170.0;

// ---------------------------------------------------------------------------
// PlotId
// ---------------------------------------------------------------------------

/// The numbered plots `1`..`7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlotId {
    /// 1: posterior for the number of planets.
    Np,
    /// 2: posterior for the orbital periods.
    Periods,
    /// 3: joint posterior of periods, semi-amplitudes and eccentricities.
    Orbital,
    /// 4: GP hyperparameter marginals.
    GpMarginal,
    /// 5: GP hyperparameter joint posterior.
    GpJoint,
    /// 6: posterior realizations over the RV data.
    DataSpace,
    /// 7: fiber offset, systemic velocity and jitter.
    Extra,
}

impl PlotId {
    pub const ALL: [PlotId; 7] = [
        PlotId::Np,
        PlotId::Periods,
        PlotId::Orbital,
        PlotId::GpMarginal,
        PlotId::GpJoint,
        PlotId::DataSpace,
        PlotId::Extra,
    ];

    /// Parse a command token `"1"`..`"7"`.
    pub fn from_token(token: &str) -> Option<Self> {
        let n: u8 = match token {
            "1" => 1,
            "2" => 2,
            "3" => 3,
            "4" => 4,
            "5" => 5,
            "6" => 6,
            "7" => 7,
            _ => return None,
        };
        Some(PlotId::ALL[(n - 1) as usize])
    }

    pub fn number(self) -> u8 {
        PlotId::ALL.iter().position(|&p| p == self).unwrap_or(0) as u8 + 1
    }

    pub fn title(self) -> &'static str {
        match self {
            PlotId::Np => "Number of planets",
            PlotId::Periods => "Orbital periods",
            PlotId::Orbital => "Orbital parameters",
            PlotId::GpMarginal => "GP hyperparameters",
            PlotId::GpJoint => "GP joint posterior",
            PlotId::DataSpace => "RV data and model",
            PlotId::Extra => "Offsets and noise",
        }
    }
}

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Plot groups requested by name, plus any numbered plots.
pub fn plot_selection(args: &ParsedArguments) -> BTreeSet<PlotId> {
    let groups: [(bool, &[PlotId]); 5] = [
        (args.planets, &[PlotId::Np]),
        (args.orbital, &[PlotId::Periods, PlotId::Orbital]),
        (args.gp, &[PlotId::GpMarginal, PlotId::GpJoint]),
        (args.rv, &[PlotId::DataSpace]),
        (args.extra, &[PlotId::Extra]),
    ];
    groups
        .iter()
        .filter(|(on, _)| *on)
        .flat_map(|(_, ids)| ids.iter().copied())
        .chain(args.plot_number.iter().copied())
        .collect()
}

// ---------------------------------------------------------------------------
// Plot data
// ---------------------------------------------------------------------------

/// One histogram bin: centre, width and count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub center: f64,
    pub width: f64,
    pub count: usize,
}

/// Equal-width histogram over the finite values' range.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return vec![Bin {
            center: min,
            width: 1.0,
            count: finite.len(),
        }];
    }
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in finite {
        let i = (((v - min) / width) as usize).min(bins - 1);
        counts[i] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            center: min + (i as f64 + 0.5) * width,
            width,
            count,
        })
        .collect()
}

/// Counts of each integer value `0..=max` (for the number of planets).
pub fn integer_counts(values: &[f64], max: usize) -> Vec<Bin> {
    let mut counts = vec![0usize; max + 1];
    for &v in values {
        if v >= 0.0 && (v as usize) <= max {
            counts[v as usize] += 1;
        }
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            center: i as f64,
            width: 0.8,
            count,
        })
        .collect()
}

/// Number of histogram bins for `n` samples (square-root rule, bounded).
pub fn bin_count(n: usize) -> usize {
    ((n as f64).sqrt().ceil() as usize).clamp(5, 100)
}

/// Evenly spaced grid of `n` points spanning `[start, end]`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Paired (x, y) points, skipping pairs with a non-finite coordinate.
pub fn scatter(x: &[f64], y: &[f64]) -> Vec<[f64; 2]> {
    x.iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| [a, b])
        .collect()
}

// ---------------------------------------------------------------------------
// Parameter series
// ---------------------------------------------------------------------------

/// Named posterior columns of the GP hyperparameters (empty without a GP).
pub fn gp_parameters(results: &KimaResults) -> Vec<(String, Vec<f64>)> {
    let Some(etas) = results.layout.as_ref().and_then(|l| l.etas.clone()) else {
        return Vec::new();
    };
    etas.enumerate()
        .map(|(i, col)| (format!("eta{}", i + 1), results.column(col)))
        .collect()
}

/// Named posterior columns of the fiber offset, systemic velocity, jitters
/// and instrument offsets.
pub fn extra_parameters(results: &KimaResults) -> Vec<(String, Vec<f64>)> {
    let Some(layout) = &results.layout else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if let Some(col) = layout.fiber_offset {
        out.push(("fiber offset [m/s]".to_string(), results.column(col)));
    }
    out.push(("vsys [m/s]".to_string(), results.column(layout.vsys)));
    if results.setup.multi_instrument {
        for (i, col) in layout.jitters.clone().enumerate() {
            out.push((format!("jitter{} [m/s]", i + 1), results.column(col)));
        }
    } else {
        out.push(("extra sigma [m/s]".to_string(), results.column(layout.jitters.start)));
    }
    for (i, col) in layout.offsets.clone().enumerate() {
        out.push((format!("offset{} [m/s]", i + 1), results.column(col)));
    }
    out
}

// ---------------------------------------------------------------------------
// Data space
// ---------------------------------------------------------------------------

/// Measurements of one instrument, shifted onto the last instrument's
/// velocity zero point.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSeries {
    pub instrument: u32,
    pub points: Vec<[f64; 2]>,
    /// `(time, low, high)` of each error bar.
    pub errors: Vec<[f64; 3]>,
}

/// RV data per instrument with the median posterior instrument and fiber
/// offsets removed.
pub fn aligned_data(results: &KimaResults) -> Vec<InstrumentSeries> {
    let data = &results.data;
    let median = |col: usize| percentile(&results.column(col), 50.0).unwrap_or(0.0);

    let (offsets, fiber): (Vec<f64>, f64) = match &results.layout {
        Some(l) => (
            l.offsets.clone().map(median).collect(),
            l.fiber_offset.map(median).unwrap_or(0.0),
        ),
        None => (Vec::new(), 0.0),
    };

    data.instruments()
        .into_iter()
        .map(|instrument| {
            let shift = offsets
                .get(instrument as usize - 1)
                .copied()
                .unwrap_or(0.0);
            let mut points = Vec::new();
            let mut errors = Vec::new();
            for row in data.rows_for(instrument) {
                let t = data.time[row];
                let mut v = data.velocity[row] - shift;
                if results.setup.obs_after_harps_fibers && t > HARPS_FIBER_CHANGE {
                    v -= fiber;
                }
                let e = data.uncertainty[row];
                points.push([t, v]);
                errors.push([t, v - e, v + e]);
            }
            InstrumentSeries {
                instrument,
                points,
                errors,
            }
        })
        .collect()
}

/// Pick up to `count` distinct posterior sample indices.
pub fn choose_realizations<R: Rng + ?Sized>(
    n_samples: usize,
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    let mut chosen = rand::seq::index::sample(rng, n_samples, count.min(n_samples)).into_vec();
    chosen.sort_unstable();
    chosen
}

/// Model curves of the given posterior samples on a grid of `n_points`
/// times spanning the data (with a 5% margin on each side).
pub fn realization_curves(
    results: &KimaResults,
    samples: &[usize],
    n_points: usize,
) -> Vec<Vec<[f64; 2]>> {
    let (Some(layout), Some((t_min, t_max))) = (&results.layout, results.data.time_span()) else {
        return Vec::new();
    };
    let margin = 0.05 * (t_max - t_min);
    let grid = linspace(t_min - margin, t_max + margin, n_points);
    let t0 = results.data.time[0];
    let t_middle = results.data.t_middle().unwrap_or(t0);
    let log_period = results.log_period();

    samples
        .iter()
        .filter_map(|&i| results.posterior.rows.get(i))
        .map(|row| {
            let orbits = layout.orbits(row, log_period);
            let slope = layout.slope.map(|c| (row[c], t_middle));
            let v = model_curve(&grid, &orbits, row[layout.vsys], slope, t0);
            grid.iter().zip(v).map(|(&t, v)| [t, v]).collect()
        })
        .collect()
}
