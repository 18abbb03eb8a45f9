use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::physics::StellarMass;

/// Default post-processing command, looked up on `PATH`.
pub const DEFAULT_POSTPROCESS: &str = "kima-postprocess";

/// Runtime settings loaded from environment variables.
///
/// Log verbosity is controlled separately through `RUST_LOG`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding the sampler outputs (`KIMA_RUN_DIR`, default `.`).
    pub run_dir: PathBuf,
    /// Post-processing command line (`KIMA_POSTPROCESS`).
    pub postprocess: String,
    /// Stellar mass for derived quantities (`KIMA_STAR_MASS`, default 1.0,
    /// with optional `KIMA_STAR_MASS_ERR`).
    pub star_mass: StellarMass,
    /// Fixed RNG seed (`KIMA_SEED`); entropy when unset.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            run_dir: PathBuf::from("."),
            postprocess: DEFAULT_POSTPROCESS.to_string(),
            star_mass: StellarMass::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through `lookup`, which returns a variable's value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mass = get("KIMA_STAR_MASS")
            .map(|v| parse_number::<f64>("KIMA_STAR_MASS", &v))
            .transpose()?;
        let mass_err = get("KIMA_STAR_MASS_ERR")
            .map(|v| parse_number::<f64>("KIMA_STAR_MASS_ERR", &v))
            .transpose()?;
        let star_mass = match (mass.unwrap_or(1.0), mass_err) {
            (m, Some(sigma)) if sigma > 0.0 => StellarMass::Uncertain { mean: m, sigma },
            (m, _) => StellarMass::Fixed(m),
        };

        Ok(Settings {
            run_dir: get("KIMA_RUN_DIR").map(PathBuf::from).unwrap_or(defaults.run_dir),
            postprocess: get("KIMA_POSTPROCESS").unwrap_or(defaults.postprocess),
            star_mass,
            seed: get("KIMA_SEED")
                .map(|v| parse_number::<u64>("KIMA_SEED", &v))
                .transpose()?,
        })
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key}: '{value}' is not a valid number"))
}
