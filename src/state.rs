use std::path::PathBuf;

use rand::Rng;

use crate::color::InstrumentColors;
use crate::physics::StellarMass;
use crate::plots::{self, InstrumentSeries, PlotId};
use crate::results::{KimaResults, PlanetSummary};

/// Posterior realizations drawn over the data in plot 6.
pub const REALIZATIONS: usize = 10;

/// Time grid resolution of the realization curves.
const CURVE_POINTS: usize = 1000;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// One page of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Plot(PlotId),
    Diagnostic,
}

impl Tab {
    pub fn label(self) -> String {
        match self {
            Tab::Plot(id) => format!("{id}: {}", id.title()),
            Tab::Diagnostic => "Diagnostic".to_string(),
        }
    }

    /// File name used when the tab is exported.
    pub fn file_name(self) -> String {
        match self {
            Tab::Plot(id) => format!("kima-plot-{id}.png"),
            Tab::Diagnostic => "kima-plot-diagnostic.png".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Export progress
// ---------------------------------------------------------------------------

/// Progress of writing every tab to a PNG file.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub dir: PathBuf,
    /// Index of the tab being captured.
    pub next: usize,
    /// Frames to render before requesting the screenshot of `next`.
    pub settle_frames: u8,
    /// Whether a screenshot of `next` has been requested.
    pub requested: bool,
    pub written: Vec<PathBuf>,
}

impl ExportState {
    pub const SETTLE_FRAMES: u8 = 3;

    pub fn new(dir: PathBuf) -> Self {
        ExportState {
            dir,
            next: 0,
            settle_frames: Self::SETTLE_FRAMES,
            requested: false,
            written: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    pub results: KimaResults,
    pub tabs: Vec<Tab>,
    pub selected: usize,

    /// Credible ranges per planet slot for the summary panel.
    pub summaries: Vec<PlanetSummary>,
    pub star_mass: StellarMass,

    /// Data per instrument, aligned on the last instrument.
    pub data_series: Vec<InstrumentSeries>,
    /// Model curves of randomly chosen posterior samples.
    pub curves: Vec<Vec<[f64; 2]>>,
    pub instrument_colors: InstrumentColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set while writing plots to disk instead of showing them.
    pub export: Option<ExportState>,
}

impl ViewerState {
    /// Precompute everything the plots need.
    pub fn new<R: Rng + ?Sized>(
        results: KimaResults,
        star_mass: StellarMass,
        export_dir: Option<PathBuf>,
        rng: &mut R,
    ) -> Self {
        let mut tabs: Vec<Tab> = results.plots.iter().copied().map(Tab::Plot).collect();
        if results.diagnostic && !results.logx_samples.is_empty() {
            tabs.push(Tab::Diagnostic);
        }

        let summaries = results.planet_summaries(star_mass, &mut *rng);
        let data_series = plots::aligned_data(&results);
        let curves = if results.plots.contains(&PlotId::DataSpace) {
            let chosen =
                plots::choose_realizations(results.posterior.len(), REALIZATIONS, &mut *rng);
            plots::realization_curves(&results, &chosen, CURVE_POINTS)
        } else {
            Vec::new()
        };
        let instrument_colors = InstrumentColors::new(&results.data.instruments());

        ViewerState {
            results,
            tabs,
            selected: 0,
            summaries,
            star_mass,
            data_series,
            curves,
            instrument_colors,
            status_message: None,
            export: export_dir.map(ExportState::new),
        }
    }

    /// The tab currently on screen.
    pub fn current_tab(&self) -> Option<Tab> {
        self.tabs.get(self.selected).copied()
    }

    /// Save the results through a native file dialog.
    pub fn save_results_as(&mut self, path: PathBuf) {
        match self.results.save(&path) {
            Ok(()) => self.status_message = Some(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("Failed to save results: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
