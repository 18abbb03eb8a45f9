//! Percentile-based summaries of posterior samples.

use serde::{Deserialize, Serialize};

/// Median with asymmetric distances to the 84th and 16th percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CredibleRange {
    pub median: f64,
    /// `p84 - median`
    pub plus: f64,
    /// `median - p16`
    pub minus: f64,
}

impl CredibleRange {
    /// Typeset as `$median ^{+plus} _{-minus}$`.
    pub fn to_latex(&self) -> String {
        format!(
            "${:.2} ^{{+{:.2}}} _{{-{:.2}}}$",
            self.median, self.plus, self.minus
        )
    }
}

/// Percentile `q` (0..=100) of `values` using linear interpolation between
/// closest ranks. Returns `None` for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, q)
}

fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Values strictly inside the optional `(min, max)` bounds.
fn masked(values: &[f64], min: Option<f64>, max: Option<f64>) -> Vec<f64> {
    values
        .iter()
        .copied()
        .filter(|&v| min.map_or(true, |lo| v > lo) && max.map_or(true, |hi| v < hi))
        .collect()
}

/// 68% credible range of `values`, optionally restricted to `min < v < max`.
///
/// Returns `None` when no value survives the mask.
pub fn percentile68_ranges(
    values: &[f64],
    min: Option<f64>,
    max: Option<f64>,
) -> Option<CredibleRange> {
    let mut kept = masked(values, min, max);
    kept.sort_by(|a, b| a.total_cmp(b));
    let lp = percentile_sorted(&kept, 16.0)?;
    let median = percentile_sorted(&kept, 50.0)?;
    let up = percentile_sorted(&kept, 84.0)?;
    Some(CredibleRange {
        median,
        plus: up - median,
        minus: median - lp,
    })
}

/// [`percentile68_ranges`] rendered with [`CredibleRange::to_latex`].
pub fn percentile68_ranges_latex(
    values: &[f64],
    min: Option<f64>,
    max: Option<f64>,
) -> Option<String> {
    percentile68_ranges(values, min, max).map(|r| r.to_latex())
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; NaN for an empty slice.
pub fn std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Mean of the values strictly between `min` and `max`.
pub fn clipped_mean(values: &[f64], min: f64, max: f64) -> f64 {
    mean(&masked(values, Some(min), Some(max)))
}

/// Standard deviation of the values strictly between `min` and `max`.
pub fn clipped_std(values: &[f64], min: f64, max: f64) -> f64 {
    std(&masked(values, Some(min), Some(max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::physics::standard_normal;

    #[test]
    fn percentile_interpolates_linearly() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&v, 0.0), Some(1.0));
        assert_eq!(percentile(&v, 100.0), Some(4.0));
        assert_eq!(percentile(&v, 50.0), Some(2.5));
        // rank = 0.16 * 3 = 0.48
        let p16 = percentile(&v, 16.0).unwrap();
        assert!((p16 - 1.48).abs() < 1e-12);
    }

    #[test]
    fn percentile_of_empty_is_none() {
        assert_eq!(percentile(&[], 50.0), None);
        assert!(percentile68_ranges(&[1.0, 2.0], Some(5.0), None).is_none());
    }

    #[test]
    fn standard_normal_gives_one_sigma_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let sample: Vec<f64> = (0..200_000).map(|_| standard_normal(&mut rng)).collect();
        let r = percentile68_ranges(&sample, None, None).unwrap();
        assert!(r.median.abs() < 0.02, "median {}", r.median);
        assert!((r.plus - 1.0).abs() < 0.03, "plus {}", r.plus);
        assert!((r.minus - 1.0).abs() < 0.03, "minus {}", r.minus);
    }

    #[test]
    fn bounds_are_strict() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        let r = percentile68_ranges(&v, Some(1.0), Some(5.0)).unwrap();
        assert_eq!(r.median, 3.0);
        assert_eq!(clipped_mean(&v, 1.0, 5.0), 3.0);
        let s = clipped_std(&v, 1.0, 5.0);
        assert!((s - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn latex_is_asymmetric_uncertainty() {
        let r = CredibleRange {
            median: 1.234,
            plus: 0.5,
            minus: 0.25,
        };
        assert_eq!(r.to_latex(), "$1.23 ^{+0.50} _{-0.25}$");
    }
}
