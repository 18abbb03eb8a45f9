use std::path::Path;

use anyhow::{Context, Result};

use super::loader::read_numeric_table;
use super::model::{ColumnLayout, PlanetParam, PosteriorSamples};
use crate::error::KimaError;
use crate::keplerian::Orbit;
use crate::setup::ModelSetup;

/// File name of the posterior samples inside a run directory.
pub const POSTERIOR_FILE: &str = "posterior_sample.txt";

/// Load `posterior_sample.txt` from `dir`.
pub fn load_posterior(dir: &Path) -> Result<PosteriorSamples> {
    let path = dir.join(POSTERIOR_FILE);
    let rows = read_numeric_table(&path, 0, 1)
        .with_context(|| format!("loading posterior samples from {}", path.display()))?;

    if let Some(first) = rows.first() {
        let width = first.len();
        if let Some((i, _)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(KimaError::Layout(format!(
                "sample {} has a different number of columns than the first",
                i + 1
            ))
            .into());
        }
    }

    log::info!("Loaded {} posterior samples", rows.len());
    Ok(PosteriorSamples { rows })
}

impl ColumnLayout {
    /// Derive the column positions for a model built with `setup` on data
    /// from `n_instruments` instruments.
    ///
    /// The number of planet slots is read from the `maxNp` column of
    /// `first_row`, and the result must account for every column.
    pub fn from_setup(
        setup: &ModelSetup,
        n_instruments: usize,
        first_row: &[f64],
    ) -> Result<Self, KimaError> {
        let mut next = 0usize;
        let mut take = |n: usize| {
            let range = next..next + n;
            next += n;
            range
        };

        let n_jitters = if setup.multi_instrument { n_instruments.max(1) } else { 1 };
        let jitters = take(n_jitters);
        let slope = setup.trend.then(|| take(1).start);
        let fiber_offset = setup.obs_after_harps_fibers.then(|| take(1).start);
        let offsets = take(if setup.multi_instrument { n_jitters - 1 } else { 0 });
        let etas = setup.gp.then(|| take(4));
        let ndim = take(1).start;
        let max_np = take(1).start;
        let hyperpriors = setup.hyperpriors.then(|| take(3));
        let np = take(1).start;
        let planets_start = take(0).start;

        let max_planets_value = *first_row.get(max_np).ok_or_else(|| {
            KimaError::Layout(format!(
                "expected a maxNp column at index {max_np}, but rows have {} columns",
                first_row.len()
            ))
        })?;
        if max_planets_value < 0.0 || max_planets_value.fract() != 0.0 {
            return Err(KimaError::Layout(format!(
                "maxNp column holds {max_planets_value}, not a planet count"
            )));
        }
        if max_planets_value > first_row.len() as f64 {
            return Err(KimaError::Layout(format!(
                "maxNp column holds {max_planets_value}, more than the {} columns of a row",
                first_row.len()
            )));
        }
        let max_planets = max_planets_value as usize;
        take(5 * max_planets);
        let staleness = take(1).start;
        let vsys = take(1).start;
        let width = take(0).start;

        if width != first_row.len() {
            return Err(KimaError::Layout(format!(
                "expected {width} columns, found {}",
                first_row.len()
            )));
        }

        let layout = ColumnLayout {
            jitters,
            slope,
            fiber_offset,
            offsets,
            etas,
            ndim,
            max_np,
            hyperpriors,
            np,
            planets_start,
            max_planets,
            staleness,
            vsys,
            width,
        };
        log::debug!("Posterior column layout: {layout:?}");
        Ok(layout)
    }

    /// Planets present in one posterior row, as orbits.
    pub fn orbits(&self, row: &[f64], log_period: bool) -> Vec<Orbit> {
        let n = self.planets_in(row);
        (0..n)
            .filter_map(|slot| {
                let get = |p| self.planet_column(p, slot).map(|c| row[c]);
                let raw_period = get(PlanetParam::Period)?;
                let period = if log_period { raw_period.exp() } else { raw_period };
                (period > 0.0).then(|| Orbit {
                    period,
                    semi_amplitude: get(PlanetParam::SemiAmplitude).unwrap_or(0.0),
                    phi: get(PlanetParam::Phi).unwrap_or(0.0),
                    ecc: get(PlanetParam::Ecc).unwrap_or(0.0),
                    omega: get(PlanetParam::Omega).unwrap_or(0.0),
                })
            })
            .collect()
    }

    /// Number of planets in a row (the `Np` column, capped at the slots).
    pub fn planets_in(&self, row: &[f64]) -> usize {
        (row[self.np].max(0.0) as usize).min(self.max_planets)
    }
}

impl PosteriorSamples {
    /// Values of `param` for planet `slot` over the samples where that planet
    /// exists. Periods are exponentiated when `log_period` is set.
    pub fn planet_parameter(
        &self,
        layout: &ColumnLayout,
        param: PlanetParam,
        slot: usize,
        log_period: bool,
    ) -> Vec<f64> {
        let Some(col) = layout.planet_column(param, slot) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter(|row| layout.planets_in(row) > slot)
            .map(|row| {
                let v = row[col];
                if log_period && param == PlanetParam::Period {
                    v.exp()
                } else {
                    v
                }
            })
            .collect()
    }

    /// Values of `param` for every planet in every sample.
    pub fn all_planets(
        &self,
        layout: &ColumnLayout,
        param: PlanetParam,
        log_period: bool,
    ) -> Vec<f64> {
        (0..layout.max_planets)
            .flat_map(|slot| self.planet_parameter(layout, param, slot, log_period))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(multi: bool, trend: bool, gp: bool, hyper: bool) -> ModelSetup {
        ModelSetup {
            multi_instrument: multi,
            trend,
            gp,
            hyperpriors: hyper,
            ..ModelSetup::default()
        }
    }

    #[test]
    fn single_instrument_layout() {
        // extra_sigma ndim maxNp Np P K phi ecc w staleness vsys
        let row = [1.0, 5.0, 1.0, 1.0, 10.0, 3.0, 0.1, 0.2, 0.3, 0.0, -2.0];
        let l = ColumnLayout::from_setup(&setup(false, false, false, false), 1, &row).unwrap();
        assert_eq!(l.jitters, 0..1);
        assert_eq!(l.ndim, 1);
        assert_eq!(l.max_np, 2);
        assert_eq!(l.np, 3);
        assert_eq!(l.max_planets, 1);
        assert_eq!(l.planet_column(PlanetParam::Period, 0), Some(4));
        assert_eq!(l.planet_column(PlanetParam::Omega, 0), Some(8));
        assert_eq!(l.planet_column(PlanetParam::Period, 1), None);
        assert_eq!(l.vsys, 10);
    }

    #[test]
    fn full_featured_layout() {
        // jit1 jit2 slope off1 eta1..4 ndim maxNp muP wP muK Np
        // P1 P2 K1 K2 phi1 phi2 e1 e2 w1 w2 staleness vsys
        let mut row = vec![0.0; 26];
        row[9] = 2.0; // maxNp
        let l = ColumnLayout::from_setup(&setup(true, true, true, true), 2, &row).unwrap();
        assert_eq!(l.jitters, 0..2);
        assert_eq!(l.slope, Some(2));
        assert_eq!(l.offsets, 3..4);
        assert_eq!(l.etas, Some(4..8));
        assert_eq!(l.hyperpriors, Some(10..13));
        assert_eq!(l.np, 13);
        assert_eq!(l.planet_column(PlanetParam::SemiAmplitude, 1), Some(17));
        assert_eq!(l.vsys, 25);
    }

    #[test]
    fn width_mismatch_is_a_layout_error() {
        let row = [1.0, 5.0, 0.0, 0.0, 0.0];
        let err = ColumnLayout::from_setup(&setup(false, true, false, false), 1, &row).unwrap_err();
        assert!(matches!(err, KimaError::Layout(_)));
    }

    #[test]
    fn absurd_planet_count_is_a_layout_error() {
        // extra_sigma ndim maxNp
        let row = [1.0, 5.0, 1e30, 0.0, 0.0, 0.0];
        let err =
            ColumnLayout::from_setup(&setup(false, false, false, false), 1, &row).unwrap_err();
        match err {
            KimaError::Layout(msg) => assert!(msg.contains("maxNp"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parameters_only_from_present_planets() {
        // extra_sigma ndim maxNp Np P1 P2 K1 K2 phi1 phi2 e1 e2 w1 w2 staleness vsys
        let rows = vec![
            vec![1.0, 5.0, 2.0, 1.0, 10.0, 20.0, 1.0, 2.0, 0.0, 0.0, 0.1, 0.2, 0.0, 0.0, 0.0, 0.0],
            vec![1.0, 5.0, 2.0, 2.0, 11.0, 21.0, 1.0, 2.0, 0.0, 0.0, 0.1, 0.2, 0.0, 0.0, 0.0, 0.0],
        ];
        let samples = PosteriorSamples { rows };
        let l = ColumnLayout::from_setup(&setup(false, false, false, false), 1, &samples.rows[0])
            .unwrap();
        assert_eq!(
            samples.planet_parameter(&l, PlanetParam::Period, 0, false),
            vec![10.0, 11.0]
        );
        assert_eq!(
            samples.planet_parameter(&l, PlanetParam::Period, 1, false),
            vec![21.0]
        );
        assert_eq!(samples.all_planets(&l, PlanetParam::Ecc, false), vec![0.1, 0.1, 0.2]);
        assert_eq!(l.orbits(&samples.rows[1], false).len(), 2);
    }

    #[test]
    fn ragged_posterior_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(POSTERIOR_FILE), "# a b\n1 2 3\n1 2\n").unwrap();
        let err = load_posterior(dir.path()).unwrap_err();
        assert!(err.downcast_ref::<KimaError>().is_some());
    }
}
