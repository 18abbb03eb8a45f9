//! The `kima_model_setup.txt` file written by the sampler next to its outputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::data::loader::DataSource;
use crate::error::KimaError;

/// File name of the model setup inside a run directory.
pub const SETUP_FILE: &str = "kima_model_setup.txt";

/// Guidance printed when the setup file is missing.
pub const MISSING_SETUP_HELP: &str = "\
Probably didn't include a call to save_setup() in the
RVModel constructor (this is the recommended solution).
As a workaround, create a file called `kima_model_setup.txt`,
and add to it (after editting!) the following options:

[kima]
obs_after_HARPS_fibers: true / false
GP: true / false
hyperpriors: true / false
trend: true / false

file: filename.txt
units: ms / kms
skip: 0
";

/// Velocity units of the data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    #[default]
    MetersPerSecond,
    KilometersPerSecond,
}

impl Units {
    /// Factor that converts the file's velocities to m/s.
    pub fn to_ms(self) -> f64 {
        match self {
            Units::MetersPerSecond => 1.0,
            Units::KilometersPerSecond => 1e3,
        }
    }
}

/// Options the RV model was compiled with, plus where its data came from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelSetup {
    pub obs_after_harps_fibers: bool,
    pub gp: bool,
    pub hyperpriors: bool,
    pub trend: bool,
    pub multi_instrument: bool,
    pub file: Option<String>,
    pub files: Vec<String>,
    pub units: Units,
    pub skip: usize,
    pub multi: bool,
    /// Every `key: value` pair by section, including the ones above.
    pub sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl ModelSetup {
    /// Read `kima_model_setup.txt` from `dir`.
    ///
    /// A missing file is [`KimaError::MissingSetup`]; other failures carry
    /// context.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETUP_FILE);
        if !path.is_file() {
            return Err(KimaError::MissingSetup { path }.into());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse the INI-style contents of a setup file.
    pub fn parse(text: &str) -> Result<Self> {
        let sections = parse_ini(text)?;
        let Some(kima) = sections.get("kima") else {
            bail!("missing [kima] section");
        };

        let flag = |key: &str| -> Result<bool> {
            match kima.get(key).map(String::as_str) {
                None => Ok(false),
                Some("true") | Some("True") | Some("1") => Ok(true),
                Some("false") | Some("False") | Some("0") => Ok(false),
                Some(other) => bail!("{key}: expected true or false, found '{other}'"),
            }
        };

        let units = match kima.get("units").map(String::as_str) {
            None | Some("ms") => Units::MetersPerSecond,
            Some("kms") => Units::KilometersPerSecond,
            Some(other) => bail!("units: expected ms or kms, found '{other}'"),
        };

        let skip = match kima.get("skip") {
            Some(s) if !s.is_empty() => s
                .parse()
                .with_context(|| format!("skip: '{s}' is not a line count"))?,
            _ => 0,
        };

        let files = kima
            .get("files")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(ModelSetup {
            obs_after_harps_fibers: flag("obs_after_HARPS_fibers")?,
            gp: flag("GP")?,
            hyperpriors: flag("hyperpriors")?,
            trend: flag("trend")?,
            multi_instrument: flag("multi_instrument")?,
            file: kima.get("file").filter(|f| !f.is_empty()).cloned(),
            files,
            units,
            skip,
            multi: flag("multi")?,
            sections,
        })
    }

    /// Where to read the RV data from, relative to `dir`.
    ///
    /// Multiple files give one instrument each; a single file carries the
    /// instrument column only when the model is multi-instrument.
    pub fn data_source(&self, dir: &Path) -> Result<DataSource> {
        let resolve = |f: &String| -> PathBuf { dir.join(f) };
        if self.multi && !self.files.is_empty() {
            return Ok(DataSource::Separate(self.files.iter().map(resolve).collect()));
        }
        let Some(file) = &self.file else {
            bail!("the model setup names no data file");
        };
        if self.multi_instrument {
            Ok(DataSource::Combined(resolve(file)))
        } else {
            Ok(DataSource::Separate(vec![resolve(file)]))
        }
    }
}

/// `[section]` headers and `key: value` (or `key = value`) lines; `;` and
/// `#` start comments.
fn parse_ini(text: &str) -> Result<BTreeMap<String, BTreeMap<String, String>>> {
    let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        let Some(pos) = line.find([':', '=']) else {
            bail!("line {}: expected 'key: value', found '{line}'", i + 1);
        };
        let Some(section) = &current else {
            bail!("line {}: option outside of any section", i + 1);
        };
        let key = line[..pos].trim().to_string();
        let value = line[pos + 1..].trim().to_string();
        sections.entry(section.clone()).or_default().insert(key, value);
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETUP: &str = "\
;Mon Jan  1 00:00:00 2018

[kima]
obs_after_HARPS_fibers: false
GP: true
hyperpriors: false
trend: true
multi_instrument: false

file: data/BL2009_dataset1.kms.rv
units: kms
skip: 2
multi: false
files:

[priors.general]
Cprior: U(-10; 10)
Jprior: ModifiedJeffreys(1; 100)
";

    #[test]
    fn parses_kima_section() {
        let s = ModelSetup::parse(SETUP).unwrap();
        assert!(s.gp && s.trend);
        assert!(!s.obs_after_harps_fibers && !s.hyperpriors && !s.multi_instrument);
        assert_eq!(s.units, Units::KilometersPerSecond);
        assert_eq!(s.skip, 2);
        assert!(s.files.is_empty());
        assert_eq!(s.file.as_deref(), Some("data/BL2009_dataset1.kms.rv"));
        assert_eq!(
            s.sections["priors.general"]["Cprior"],
            "U(-10; 10)"
        );
    }

    #[test]
    fn multi_files_become_separate_sources() {
        let text = "[kima]\nmulti: true\nmulti_instrument: true\nfiles: a.txt,b.txt,\n";
        let s = ModelSetup::parse(text).unwrap();
        let src = s.data_source(Path::new("run")).unwrap();
        assert_eq!(
            src,
            DataSource::Separate(vec![PathBuf::from("run/a.txt"), PathBuf::from("run/b.txt")])
        );
    }

    #[test]
    fn single_multi_instrument_file_is_combined() {
        let text = "[kima]\nmulti_instrument: true\nfile: full.txt\n";
        let s = ModelSetup::parse(text).unwrap();
        assert_eq!(
            s.data_source(Path::new(".")).unwrap(),
            DataSource::Combined(PathBuf::from("./full.txt"))
        );
    }

    #[test]
    fn missing_setup_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelSetup::load(dir.path()).unwrap_err();
        let kima = err.downcast_ref::<KimaError>().unwrap();
        assert!(matches!(kima, KimaError::MissingSetup { .. }));
        assert!(kima.to_string().contains("[kima]"));
    }

    #[test]
    fn bad_flag_is_rejected() {
        let err = ModelSetup::parse("[kima]\nGP: maybe\n").unwrap_err();
        assert!(err.to_string().contains("GP"));
    }
}
