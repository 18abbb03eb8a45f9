//! Derived planetary quantities from orbital parameters.
//!
//! Units throughout: period in days, semi-amplitude in m/s, stellar mass in
//! solar masses, planet mass in Jupiter (or Earth) masses, distances in AU.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::KimaError;
use crate::stats::{self, percentile68_ranges_latex};

/// One Jupiter mass expressed in Earth masses.
pub const MJUP_TO_MEARTH: f64 = 317.8284065946748;

/// Minimum-mass prefactor for P in days, K in m/s, M in Msun, result in Mjup.
const MASS_COEFF: f64 = 4.919e-3;

/// (G in AU^3 / (Msun day^2))^(1/3)
const SEMIMAJOR_COEFF: f64 = 0.0666378476025686;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A parameter given either as a single value or as one value per posterior
/// sample.
#[derive(Debug, Clone, Copy)]
pub enum Quantity<'a> {
    Scalar(f64),
    Samples(&'a [f64]),
}

impl From<f64> for Quantity<'_> {
    fn from(v: f64) -> Self {
        Quantity::Scalar(v)
    }
}

impl<'a> From<&'a [f64]> for Quantity<'a> {
    fn from(v: &'a [f64]) -> Self {
        Quantity::Samples(v)
    }
}

impl<'a> From<&'a Vec<f64>> for Quantity<'a> {
    fn from(v: &'a Vec<f64>) -> Self {
        Quantity::Samples(v.as_slice())
    }
}

impl Quantity<'_> {
    fn name(&self) -> &'static str {
        match self {
            Quantity::Scalar(_) => "scalar",
            Quantity::Samples(_) => "samples",
        }
    }

    /// Broadcast to `n` samples: a scalar repeats, samples must have length `n`.
    fn broadcast(&self, n: usize, what: &str) -> Result<Vec<f64>, KimaError> {
        match self {
            Quantity::Scalar(v) => Ok(vec![*v; n]),
            Quantity::Samples(s) if s.len() == n => Ok(s.to_vec()),
            Quantity::Samples(s) => Err(KimaError::QuantityMismatch(format!(
                "{what} has {} samples but the period has {n}",
                s.len()
            ))),
        }
    }
}

/// Stellar mass, optionally with a Gaussian uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StellarMass {
    Fixed(f64),
    Uncertain { mean: f64, sigma: f64 },
}

impl Default for StellarMass {
    fn default() -> Self {
        StellarMass::Fixed(1.0)
    }
}

impl From<f64> for StellarMass {
    fn from(v: f64) -> Self {
        StellarMass::Fixed(v)
    }
}

impl From<(f64, f64)> for StellarMass {
    fn from((mean, sigma): (f64, f64)) -> Self {
        StellarMass::Uncertain { mean, sigma }
    }
}

impl StellarMass {
    /// One stellar mass per sample; an uncertain mass draws `n` Gaussian
    /// perturbations from `rng`.
    fn draw<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        match *self {
            StellarMass::Fixed(m) => vec![m; n],
            StellarMass::Uncertain { mean, sigma } => (0..n)
                .map(|_| mean + sigma * standard_normal(rng))
                .collect(),
        }
    }
}

/// Standard normal draw (Box-Muller).
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Mean, population standard deviation and the raw per-sample values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub mean: f64,
    pub std: f64,
    pub values: Vec<f64>,
}

impl SampleSummary {
    pub fn from_values(values: Vec<f64>) -> Self {
        SampleSummary {
            mean: stats::mean(&values),
            std: stats::std(&values),
            values,
        }
    }
}

/// Minimum planet mass (Msini).
#[derive(Debug, Clone, PartialEq)]
pub enum PlanetMass {
    Scalar { jupiter: f64, earth: f64 },
    /// Per-sample masses in Jupiter units.
    Samples(SampleSummary),
}

impl PlanetMass {
    /// Mean and std in Earth masses (for samples), or the scalar Earth mass
    /// with zero spread.
    pub fn earth(&self) -> (f64, f64) {
        match self {
            PlanetMass::Scalar { earth, .. } => (*earth, 0.0),
            PlanetMass::Samples(s) => (s.mean * MJUP_TO_MEARTH, s.std * MJUP_TO_MEARTH),
        }
    }

    /// Mean and std in Jupiter masses.
    pub fn jupiter(&self) -> (f64, f64) {
        match self {
            PlanetMass::Scalar { jupiter, .. } => (*jupiter, 0.0),
            PlanetMass::Samples(s) => (s.mean, s.std),
        }
    }
}

/// Semi-major axis in AU.
#[derive(Debug, Clone, PartialEq)]
pub enum SemimajorAxis {
    Scalar(f64),
    Samples(SampleSummary),
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

fn mass_formula(star_mass: f64, period: f64, k: f64, ecc: f64) -> f64 {
    MASS_COEFF * star_mass.powf(2.0 / 3.0) * period.cbrt() * k * (1.0 - ecc * ecc).sqrt()
}

fn semimajor_formula(star_mass: f64, period: f64) -> f64 {
    SEMIMAJOR_COEFF * star_mass.cbrt() * (period / (2.0 * PI)).powf(2.0 / 3.0)
}

/// Minimum planet mass from period `P`, semi-amplitude `K` and eccentricity.
///
/// A scalar period requires scalar `K`, `e` and a fixed stellar mass. With
/// per-sample periods, `K` and `e` may be scalars (broadcast) or samples of
/// the same length, and an uncertain stellar mass draws one value per sample.
pub fn planet_mass<R: Rng + ?Sized>(
    period: Quantity<'_>,
    k: Quantity<'_>,
    ecc: Quantity<'_>,
    star_mass: StellarMass,
    rng: &mut R,
) -> Result<PlanetMass, KimaError> {
    log::debug!("Using star mass = {star_mass:?} solar mass");
    match period {
        Quantity::Scalar(p) => {
            let (Quantity::Scalar(k), Quantity::Scalar(e), StellarMass::Fixed(m)) =
                (k, ecc, star_mass)
            else {
                return Err(KimaError::QuantityMismatch(format!(
                    "scalar period with {} K, {} eccentricity and {star_mass:?}",
                    k.name(),
                    ecc.name()
                )));
            };
            let jupiter = mass_formula(m, p, k, e);
            Ok(PlanetMass::Scalar {
                jupiter,
                earth: jupiter * MJUP_TO_MEARTH,
            })
        }
        Quantity::Samples(periods) => {
            let n = periods.len();
            let ks = k.broadcast(n, "K")?;
            let eccs = ecc.broadcast(n, "eccentricity")?;
            let masses = star_mass.draw(n, rng);
            let values = periods
                .iter()
                .zip(&ks)
                .zip(&eccs)
                .zip(&masses)
                .map(|(((&p, &k), &e), &m)| mass_formula(m, p, k, e))
                .collect();
            Ok(PlanetMass::Samples(SampleSummary::from_values(values)))
        }
    }
}

/// Semi-major axis of the orbit from period and stellar mass.
pub fn semimajor_axis<R: Rng + ?Sized>(
    period: Quantity<'_>,
    star_mass: StellarMass,
    rng: &mut R,
) -> Result<SemimajorAxis, KimaError> {
    log::debug!("Using star mass = {star_mass:?} solar mass");
    match period {
        Quantity::Scalar(p) => {
            let StellarMass::Fixed(m) = star_mass else {
                return Err(KimaError::QuantityMismatch(format!(
                    "scalar period with {star_mass:?}"
                )));
            };
            Ok(SemimajorAxis::Scalar(semimajor_formula(m, p)))
        }
        Quantity::Samples(periods) => {
            let masses = star_mass.draw(periods.len(), rng);
            let values = periods
                .iter()
                .zip(&masses)
                .map(|(&p, &m)| semimajor_formula(m, p))
                .collect();
            Ok(SemimajorAxis::Samples(SampleSummary::from_values(values)))
        }
    }
}

/// Planet mass typeset for a table: `$value$` for scalars, the 68% credible
/// range for samples.
pub fn planet_mass_latex<R: Rng + ?Sized>(
    period: Quantity<'_>,
    k: Quantity<'_>,
    ecc: Quantity<'_>,
    star_mass: StellarMass,
    earth: bool,
    rng: &mut R,
) -> Result<String, KimaError> {
    match planet_mass(period, k, ecc, star_mass, rng)? {
        PlanetMass::Scalar { jupiter, earth: me } => {
            Ok(format!("${:.6}$", if earth { me } else { jupiter }))
        }
        PlanetMass::Samples(s) => {
            let values: Vec<f64> = if earth {
                s.values.iter().map(|m| m * MJUP_TO_MEARTH).collect()
            } else {
                s.values
            };
            percentile68_ranges_latex(&values, None, None)
                .ok_or_else(|| KimaError::QuantityMismatch("no period samples".into()))
        }
    }
}

/// Semi-major axis typeset as `$value$` (the sample mean for samples).
pub fn semimajor_axis_latex<R: Rng + ?Sized>(
    period: Quantity<'_>,
    star_mass: StellarMass,
    rng: &mut R,
) -> Result<String, KimaError> {
    let a = match semimajor_axis(period, star_mass, rng)? {
        SemimajorAxis::Scalar(a) => a,
        SemimajorAxis::Samples(s) => s.mean,
    };
    Ok(format!("${a:.6}$"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn scalar_mass(period: f64, k: f64, ecc: f64) -> PlanetMass {
        planet_mass(period.into(), k.into(), ecc.into(), 1.0_f64.into(), &mut rng()).unwrap()
    }

    #[test]
    fn earth_analog_mass() {
        let m = scalar_mass(365.25, 0.0894, 0.0);
        let PlanetMass::Scalar { jupiter, earth } = m else {
            panic!("expected scalar mass");
        };
        assert!((earth - 1.0).abs() < 0.01, "earth mass {earth}");
        assert!((jupiter - earth / MJUP_TO_MEARTH).abs() < 1e-15);
    }

    #[test]
    fn eccentricity_reduces_mass() {
        let circ = scalar_mass(10.0, 5.0, 0.0).jupiter().0;
        let ecc = scalar_mass(10.0, 5.0, 0.6).jupiter().0;
        assert!((ecc / circ - 0.8).abs() < 1e-12);
    }

    #[test]
    fn earth_orbit_is_one_au() {
        let a = semimajor_axis(365.25_f64.into(), 1.0_f64.into(), &mut rng()).unwrap();
        let SemimajorAxis::Scalar(a) = a else {
            panic!("expected scalar axis");
        };
        assert!((a - 1.0).abs() < 1e-3, "a = {a}");
    }

    #[test]
    fn scalar_period_with_sample_eccentricity_is_rejected() {
        let eccs = vec![0.1, 0.2];
        let err = planet_mass(
            365.25_f64.into(),
            1.0_f64.into(),
            (&eccs).into(),
            1.0_f64.into(),
            &mut rng(),
        )
        .unwrap_err();
        assert!(matches!(err, KimaError::QuantityMismatch(_)));

        let err = semimajor_axis(365.25_f64.into(), StellarMass::from((1.0, 0.1)), &mut rng())
            .unwrap_err();
        assert!(matches!(err, KimaError::QuantityMismatch(_)));
    }

    #[test]
    fn sample_lengths_must_agree() {
        let periods = vec![10.0, 20.0, 30.0];
        let ks = vec![1.0, 2.0];
        let err = planet_mass(
            (&periods).into(),
            (&ks).into(),
            0.0_f64.into(),
            1.0_f64.into(),
            &mut rng(),
        )
        .unwrap_err();
        assert!(matches!(err, KimaError::QuantityMismatch(_)));
    }

    #[test]
    fn samples_broadcast_scalars() {
        let periods = vec![365.25; 4];
        let m = planet_mass(
            (&periods).into(),
            0.0894_f64.into(),
            0.0_f64.into(),
            1.0_f64.into(),
            &mut rng(),
        )
        .unwrap();
        let PlanetMass::Samples(s) = &m else {
            panic!("expected samples");
        };
        assert_eq!(s.values.len(), 4);
        assert!(s.std.abs() < 1e-15);
        let (earth_mean, _) = m.earth();
        assert!((earth_mean - 1.0).abs() < 0.01);
    }

    #[test]
    fn uncertain_star_mass_spreads_samples() {
        let periods = vec![365.25; 5000];
        let a = semimajor_axis((&periods).into(), StellarMass::from((1.0, 0.1)), &mut rng())
            .unwrap();
        let SemimajorAxis::Samples(s) = a else {
            panic!("expected samples");
        };
        // a ∝ M^(1/3), so a 10% mass spread gives roughly 3.3% in a
        assert!((s.mean - 1.0).abs() < 0.01);
        assert!((s.std - 0.033).abs() < 0.005, "std {}", s.std);
    }

    #[test]
    fn same_seed_same_draws() {
        let periods = vec![100.0; 10];
        let a = semimajor_axis((&periods).into(), StellarMass::from((1.0, 0.2)), &mut rng())
            .unwrap();
        let b = semimajor_axis((&periods).into(), StellarMass::from((1.0, 0.2)), &mut rng())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn latex_strings_are_delimited() {
        let s = semimajor_axis_latex(365.25_f64.into(), 1.0_f64.into(), &mut rng()).unwrap();
        assert!(s.starts_with('$') && s.ends_with('$'));
        let periods = vec![3.0, 4.0, 5.0];
        let s = semimajor_axis_latex((&periods).into(), 1.0_f64.into(), &mut rng()).unwrap();
        assert!(s.starts_with('$') && s.ends_with('$'));

        let m = planet_mass_latex(
            365.25_f64.into(),
            0.0894_f64.into(),
            0.0_f64.into(),
            1.0_f64.into(),
            true,
            &mut rng(),
        )
        .unwrap();
        assert!(m.starts_with("$0.99") || m.starts_with("$1.00"), "{m}");

        let m = planet_mass_latex(
            (&periods).into(),
            1.0_f64.into(),
            0.0_f64.into(),
            1.0_f64.into(),
            false,
            &mut rng(),
        )
        .unwrap();
        assert!(m.contains("^{+") && m.contains("_{-"));
    }
}
