//! A loaded sampler run: setup, data, posterior samples and the numbers the
//! post-processing step reported.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::loader::read_datafile;
use crate::data::model::{ColumnLayout, PlanetParam, PosteriorSamples, RvDataset};
use crate::data::posterior::load_posterior;
use crate::physics::{self, PlanetMass, Quantity, SemimajorAxis, StellarMass, MJUP_TO_MEARTH};
use crate::plots::PlotId;
use crate::setup::ModelSetup;
use crate::stats::{percentile68_ranges, CredibleRange};

/// Results of one run, ready for plotting or saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KimaResults {
    pub run_dir: PathBuf,
    pub plots: BTreeSet<PlotId>,
    pub save_plots: bool,
    /// Whether the diagnostic plot was requested.
    pub diagnostic: bool,
    /// Log evidence, once the post-processing step has reported it.
    pub evidence: Option<f64>,
    pub information: Option<f64>,
    /// Effective sample size: the number of posterior samples.
    pub ess: usize,
    pub setup: ModelSetup,
    pub data: RvDataset,
    pub posterior: PosteriorSamples,
    /// `None` when there are no posterior samples.
    pub layout: Option<ColumnLayout>,
    pub logx_samples: Vec<f64>,
}

/// 68% credible ranges for one planet slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetSummary {
    /// 0-based planet slot.
    pub slot: usize,
    /// Samples in which this planet exists.
    pub samples: usize,
    pub period: Option<CredibleRange>,
    pub semi_amplitude: Option<CredibleRange>,
    pub ecc: Option<CredibleRange>,
    pub mass_jupiter: Option<CredibleRange>,
    pub mass_earth: Option<CredibleRange>,
    pub semimajor_axis: Option<CredibleRange>,
}

impl KimaResults {
    /// Load the run in `run_dir`. Evidence and information stay unset until
    /// the caller fills them in.
    pub fn load(run_dir: &Path, plots: BTreeSet<PlotId>, save_plots: bool) -> Result<Self> {
        let setup = ModelSetup::load(run_dir)?;

        let source = setup.data_source(run_dir)?;
        let mut data = read_datafile(&source, setup.skip).context("loading RV data")?;
        data.scale(setup.units.to_ms());

        let posterior = load_posterior(run_dir)?;
        let n_instruments = data.instrument.iter().copied().max().unwrap_or(1) as usize;
        let layout = match posterior.rows.first() {
            Some(first) => Some(ColumnLayout::from_setup(&setup, n_instruments, first)?),
            None => {
                log::warn!("No posterior samples in {}", run_dir.display());
                None
            }
        };

        Ok(KimaResults {
            run_dir: run_dir.to_path_buf(),
            plots,
            save_plots,
            diagnostic: false,
            evidence: None,
            information: None,
            ess: posterior.len(),
            setup,
            data,
            posterior,
            layout,
            logx_samples: Vec::new(),
        })
    }

    /// Write the results as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)
            .with_context(|| format!("writing results to {}", path.display()))?;
        log::info!("Saved results to {}", path.display());
        Ok(())
    }

    /// Read results written by [`KimaResults::save`].
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("parsing results from {}", path.display()))
    }

    /// Whether stored periods are log periods.
    pub fn log_period(&self) -> bool {
        self.setup.hyperpriors
    }

    /// Values of one column over all samples.
    pub fn column(&self, col: usize) -> Vec<f64> {
        self.posterior.column(col)
    }

    /// Values of `param` for every planet in every sample.
    pub fn planet_values(&self, param: PlanetParam) -> Vec<f64> {
        match &self.layout {
            Some(layout) => self.posterior.all_planets(layout, param, self.log_period()),
            None => Vec::new(),
        }
    }

    /// Credible ranges of the orbital and derived parameters of each planet
    /// slot.
    pub fn planet_summaries<R: Rng + ?Sized>(
        &self,
        star_mass: StellarMass,
        rng: &mut R,
    ) -> Vec<PlanetSummary> {
        let Some(layout) = &self.layout else {
            return Vec::new();
        };
        let log_period = self.log_period();

        (0..layout.max_planets)
            .map(|slot| {
                let get = |p| self.posterior.planet_parameter(layout, p, slot, log_period);
                let periods = get(PlanetParam::Period);
                let ks = get(PlanetParam::SemiAmplitude);
                let eccs = get(PlanetParam::Ecc);
                let range = |v: &[f64]| percentile68_ranges(v, None, None);

                let masses = match physics::planet_mass(
                    Quantity::Samples(&periods),
                    Quantity::Samples(&ks),
                    Quantity::Samples(&eccs),
                    star_mass,
                    &mut *rng,
                ) {
                    Ok(PlanetMass::Samples(s)) => s.values,
                    _ => Vec::new(),
                };
                let earth: Vec<f64> = masses.iter().map(|m| m * MJUP_TO_MEARTH).collect();
                let axes = match physics::semimajor_axis(
                    Quantity::Samples(&periods),
                    star_mass,
                    &mut *rng,
                ) {
                    Ok(SemimajorAxis::Samples(s)) => s.values,
                    _ => Vec::new(),
                };

                PlanetSummary {
                    slot,
                    samples: periods.len(),
                    period: range(&periods),
                    semi_amplitude: range(&ks),
                    ecc: range(&eccs),
                    mass_jupiter: range(&masses),
                    mass_earth: range(&earth),
                    semimajor_axis: range(&axes),
                }
            })
            .collect()
    }
}
