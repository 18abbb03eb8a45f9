//! Keplerian radial-velocity signal, used to draw posterior realizations over
//! the data.

use std::f64::consts::{PI, TAU};

/// Orbital parameters of one planet as stored in a posterior sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    /// Period in days.
    pub period: f64,
    /// Semi-amplitude in m/s.
    pub semi_amplitude: f64,
    /// Mean anomaly at the epoch, in radians.
    pub phi: f64,
    pub ecc: f64,
    /// Argument of periastron, in radians.
    pub omega: f64,
}

const MAX_ITERATIONS: usize = 100;

/// Solve Kepler's equation `E - e sin E = M` by Newton iteration.
pub fn eccentric_anomaly(mean_anomaly: f64, ecc: f64) -> f64 {
    let m = mean_anomaly.rem_euclid(TAU);
    let tol = if ecc < 0.8 { 1e-14 } else { 1e-13 };
    let mut e_anom = if ecc < 0.8 { m } else { PI };
    for _ in 0..MAX_ITERATIONS {
        let delta = (e_anom - ecc * e_anom.sin() - m) / (1.0 - ecc * e_anom.cos());
        e_anom -= delta;
        if delta.abs() < tol {
            break;
        }
    }
    e_anom
}

/// True anomaly in `[0, 2π)` at `time` for an orbit with periastron passage at
/// `t_peri`.
pub fn true_anomaly(time: f64, period: f64, ecc: f64, t_peri: f64) -> f64 {
    let m = TAU / period * (time - t_peri);
    let e_anom = eccentric_anomaly(m, ecc);
    let f = 2.0
        * ((1.0 + ecc).sqrt() * (e_anom / 2.0).sin())
            .atan2((1.0 - ecc).sqrt() * (e_anom / 2.0).cos());
    f.rem_euclid(TAU)
}

impl Orbit {
    /// Radial velocity contribution at `time`, with the periastron epoch
    /// anchored to `t0` (the first observation).
    pub fn radial_velocity(&self, time: f64, t0: f64) -> f64 {
        let t_peri = t0 - self.period * self.phi / TAU;
        let f = true_anomaly(time, self.period, self.ecc, t_peri);
        self.semi_amplitude * ((f + self.omega).cos() + self.ecc * self.omega.cos())
    }
}

/// Full RV model of one posterior sample evaluated at `times`.
///
/// `slope` is applied around `t_middle`.
pub fn model_curve(
    times: &[f64],
    orbits: &[Orbit],
    vsys: f64,
    slope: Option<(f64, f64)>,
    t0: f64,
) -> Vec<f64> {
    times
        .iter()
        .map(|&t| {
            let trend = slope.map_or(0.0, |(s, t_middle)| s * (t - t_middle));
            vsys + trend
                + orbits
                    .iter()
                    .map(|o| o.radial_velocity(t, t0))
                    .sum::<f64>()
        })
        .collect()
}
