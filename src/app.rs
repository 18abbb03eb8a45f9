use std::path::PathBuf;

use anyhow::{anyhow, Result};
use eframe::egui;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::physics::StellarMass;
use crate::results::KimaResults;
use crate::state::{ExportState, ViewerState};
use crate::ui::{panels, plot};

/// How the viewer is set up for one run.
#[derive(Debug, Clone, Default)]
pub struct ViewerOptions {
    pub star_mass: StellarMass,
    /// Seed for the realizations and mass perturbations; entropy when `None`.
    pub seed: Option<u64>,
    /// When set, every tab is written as a PNG into this directory and the
    /// window closes afterwards.
    pub export_dir: Option<PathBuf>,
}

/// Open the viewer on `results` and block until the window is closed.
pub fn run_viewer(results: KimaResults, options: ViewerOptions) -> Result<()> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let state = ViewerState::new(results, options.star_mass, options.export_dir, &mut rng);
    let title = format!("kima results: {}", state.results.run_dir.display());

    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native,
        Box::new(move |_cc| Ok(Box::new(ResultsApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ResultsApp {
    pub state: ViewerState,
}

impl ResultsApp {
    pub fn new(state: ViewerState) -> Self {
        Self { state }
    }

    /// Drive the PNG export: select each tab in turn, let it render, take a
    /// screenshot and write it, then close the window.
    fn export_step(&mut self, ctx: &egui::Context) {
        let Some(export) = self.state.export.as_mut() else {
            return;
        };

        let screenshot = ctx.input(|i| {
            i.raw.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });

        if let Some(shot) = screenshot.filter(|_| export.requested) {
            if let Some(tab) = self.state.tabs.get(export.next) {
                let path = export.dir.join(tab.file_name());
                let bytes: Vec<u8> = shot.pixels.iter().flat_map(|c| c.to_array()).collect();
                let [w, h] = shot.size;
                let written =
                    image::save_buffer(&path, &bytes, w as u32, h as u32, image::ColorType::Rgba8);
                match written {
                    Ok(()) => {
                        log::info!("Wrote {}", path.display());
                        export.written.push(path);
                    }
                    Err(e) => log::error!("Failed to write {}: {e}", path.display()),
                }
            }
            export.next += 1;
            export.requested = false;
            export.settle_frames = ExportState::SETTLE_FRAMES;
        }

        if export.next >= self.state.tabs.len() {
            log::info!("Saved {} plot(s)", export.written.len());
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.state.selected = export.next;
        if !export.requested {
            if export.settle_frames == 0 {
                ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
                export.requested = true;
            } else {
                export.settle_frames -= 1;
            }
        }
        ctx.request_repaint();
    }
}

impl eframe::App for ResultsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.export_step(ctx);

        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: run summary ----
        egui::SidePanel::left("summary_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::tab_view(ui, &self.state);
        });
    }
}
