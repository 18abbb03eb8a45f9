//! Blocking boundaries of a `showresults` run: console prompts and the plot
//! window.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::app::{run_viewer, ViewerOptions};
use crate::physics::StellarMass;
use crate::results::KimaResults;

/// Everything `showresults` needs from the user or the display.
pub trait UserInteraction {
    /// Informational output such as tips.
    fn notify(&mut self, message: &str);

    /// Ask for a filename; blocks until the user answers.
    fn prompt_filename(&mut self, prompt: &str) -> io::Result<String>;

    /// Show the selected plots and block until they are dismissed.
    fn show_plots(&mut self, results: &KimaResults) -> Result<()>;

    /// Write the selected plots to image files instead of showing them.
    fn save_plots(&mut self, results: &KimaResults) -> Result<()>;
}

/// Standard input/output plus the eframe plot viewer.
pub struct ConsoleInteraction {
    pub star_mass: StellarMass,
    pub seed: Option<u64>,
}

impl ConsoleInteraction {
    fn viewer_options(&self, results: &KimaResults, export: bool) -> ViewerOptions {
        ViewerOptions {
            star_mass: self.star_mass,
            seed: self.seed,
            export_dir: export.then(|| results.run_dir.clone()),
        }
    }
}

impl UserInteraction for ConsoleInteraction {
    fn notify(&mut self, message: &str) {
        println!("{message}");
    }

    fn prompt_filename(&mut self, prompt: &str) -> io::Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn show_plots(&mut self, results: &KimaResults) -> Result<()> {
        run_viewer(results.clone(), self.viewer_options(results, false))
    }

    fn save_plots(&mut self, results: &KimaResults) -> Result<()> {
        run_viewer(results.clone(), self.viewer_options(results, true))
    }
}
