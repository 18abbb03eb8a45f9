use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::physics::StellarMass;
use crate::stats::CredibleRange;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel: run summary
// ---------------------------------------------------------------------------

/// Render the run summary: evidence, information, sample counts and the
/// credible ranges of each planet.
pub fn side_panel(ui: &mut Ui, state: &ViewerState) {
    let res = &state.results;

    ui.heading("Run summary");
    ui.separator();

    egui::Grid::new("run_numbers")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("log(Z)");
            ui.label(optional(res.evidence, "nats"));
            ui.end_row();

            ui.label("Information");
            ui.label(optional(res.information, "nats"));
            ui.end_row();

            ui.label("Effective samples");
            ui.label(res.ess.to_string());
            ui.end_row();

            ui.label("Data points");
            ui.label(res.data.len().to_string());
            ui.end_row();

            ui.label("Instruments");
            ui.label(res.data.instruments().len().to_string());
            ui.end_row();

            ui.label("Star mass");
            ui.label(star_mass_text(state.star_mass));
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.strong("Planets (68% credible ranges)");
    ui.separator();

    if state.summaries.is_empty() {
        ui.label("No planets in the model.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for summary in &state.summaries {
                egui::CollapsingHeader::new(
                    RichText::new(format!(
                        "Planet {}  ({} samples)",
                        summary.slot + 1,
                        summary.samples
                    ))
                    .strong(),
                )
                .id_salt(summary.slot)
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    let rows = [
                        ("P [days]", &summary.period),
                        ("K [m/s]", &summary.semi_amplitude),
                        ("e", &summary.ecc),
                        ("M [Mjup]", &summary.mass_jupiter),
                        ("M [Mearth]", &summary.mass_earth),
                        ("a [AU]", &summary.semimajor_axis),
                    ];
                    TableBuilder::new(ui)
                        .id_salt(("planet_table", summary.slot))
                        .vscroll(false)
                        .striped(true)
                        .column(Column::auto().at_least(80.0))
                        .column(Column::remainder())
                        .body(|mut body| {
                            for (name, range) in rows {
                                body.row(18.0, |mut row| {
                                    row.col(|ui| {
                                        ui.label(name);
                                    });
                                    row.col(|ui| {
                                        ui.monospace(range_text(range.as_ref()));
                                    });
                                });
                            }
                        });
                });
            }
        });
}

fn optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.2} {unit}"),
        None => "n/a".to_string(),
    }
}

fn star_mass_text(mass: StellarMass) -> String {
    match mass {
        StellarMass::Fixed(m) => format!("{m:.2} Msun"),
        StellarMass::Uncertain { mean, sigma } => format!("{mean:.2} ± {sigma:.2} Msun"),
    }
}

fn range_text(range: Option<&CredibleRange>) -> String {
    match range {
        Some(r) => format!("{:.2} +{:.2} -{:.2}", r.median, r.plus, r.minus),
        None => "-".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the menu bar and the tab strip.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save results…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let labels: Vec<String> = state.tabs.iter().map(|t| t.label()).collect();
        for (i, label) in labels.into_iter().enumerate() {
            if ui.selectable_label(state.selected == i, label).clicked() {
                state.selected = i;
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Save kima results")
        .set_directory(&state.results.run_dir)
        .set_file_name("kima_results.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        state.save_results_as(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_and_number_formatting() {
        let r = CredibleRange {
            median: 10.0,
            plus: 1.234,
            minus: 0.5,
        };
        assert_eq!(range_text(Some(&r)), "10.00 +1.23 -0.50");
        assert_eq!(range_text(None), "-");
        assert_eq!(optional(None, "nats"), "n/a");
        assert_eq!(optional(Some(-3.5), "nats"), "-3.50 nats");
        assert_eq!(star_mass_text(StellarMass::Fixed(1.0)), "1.00 Msun");
    }
}
