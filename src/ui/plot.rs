use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::lighten_color;
use crate::data::model::PlanetParam;
use crate::plots::{self, Bin, PlotId};
use crate::state::{Tab, ViewerState};

const HIST_COLOR: Color32 = Color32::from_rgb(70, 130, 180);
const POINT_COLOR: Color32 = Color32::from_rgb(40, 40, 40);
const CURVE_COLOR: Color32 = Color32::from_rgb(230, 120, 30);

// ---------------------------------------------------------------------------
// Central panel: the selected tab
// ---------------------------------------------------------------------------

/// Render the selected tab in the central panel.
pub fn tab_view(ui: &mut Ui, state: &ViewerState) {
    let Some(tab) = state.current_tab() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No plots selected");
        });
        return;
    };

    ui.heading(tab.label());
    ui.separator();

    if state.results.layout.is_none() && tab != Tab::Diagnostic {
        notice(ui, "There are no posterior samples to plot.");
        return;
    }

    match tab {
        Tab::Plot(PlotId::Np) => np_plot(ui, state),
        Tab::Plot(PlotId::Periods) => period_plot(ui, state),
        Tab::Plot(PlotId::Orbital) => orbital_plot(ui, state),
        Tab::Plot(PlotId::GpMarginal) => gp_marginal_plot(ui, state),
        Tab::Plot(PlotId::GpJoint) => gp_joint_plot(ui, state),
        Tab::Plot(PlotId::DataSpace) => data_space_plot(ui, state),
        Tab::Plot(PlotId::Extra) => extra_plot(ui, state),
        Tab::Diagnostic => diagnostic_plot(ui, state),
    }
}

fn notice(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(text).italics());
    });
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

fn histogram(ui: &mut Ui, id: &str, x_label: &str, bins: &[Bin], height: f32) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| Bar::new(b.center, b.count as f64).width(b.width))
        .collect();
    let chart = BarChart::new(bars).color(HIST_COLOR).name(x_label);

    Plot::new(id)
        .height(height)
        .x_axis_label(x_label)
        .y_axis_label("Number of samples")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

fn scatter(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    points: Vec<[f64; 2]>,
    height: f32,
) {
    Plot::new(id)
        .height(height)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(1.5)
                    .color(HIST_COLOR),
            );
        });
}

/// Histograms of named series laid out in two columns.
fn histogram_grid(ui: &mut Ui, prefix: &str, series: &[(String, Vec<f64>)]) {
    let rows = series.len().div_ceil(2).max(1);
    let height = (ui.available_height() / rows as f32 - 30.0).max(120.0);
    ui.columns(2, |cols| {
        for (i, (name, values)) in series.iter().enumerate() {
            let bins = plots::histogram(values, plots::bin_count(values.len()));
            histogram(&mut cols[i % 2], &format!("{prefix}-{name}"), name, &bins, height);
        }
    });
}

// ---------------------------------------------------------------------------
// The numbered plots
// ---------------------------------------------------------------------------

fn np_plot(ui: &mut Ui, state: &ViewerState) {
    let Some(layout) = &state.results.layout else {
        return;
    };
    let np = state.results.column(layout.np);
    let bins = plots::integer_counts(&np, layout.max_planets);
    let height = ui.available_height();
    histogram(ui, "np", "Number of planets", &bins, height);
}

fn period_plot(ui: &mut Ui, state: &ViewerState) {
    let periods = state.results.planet_values(PlanetParam::Period);
    if periods.is_empty() {
        notice(ui, "No planets in the posterior samples.");
        return;
    }
    let log_periods: Vec<f64> = periods.iter().map(|p| p.log10()).collect();
    let bins = plots::histogram(&log_periods, plots::bin_count(log_periods.len()));
    let height = ui.available_height();
    histogram(ui, "periods", "log10 Period [days]", &bins, height);
}

fn orbital_plot(ui: &mut Ui, state: &ViewerState) {
    let periods = state.results.planet_values(PlanetParam::Period);
    if periods.is_empty() {
        notice(ui, "No planets in the posterior samples.");
        return;
    }
    let log_periods: Vec<f64> = periods.iter().map(|p| p.log10()).collect();
    let ks = state.results.planet_values(PlanetParam::SemiAmplitude);
    let eccs = state.results.planet_values(PlanetParam::Ecc);

    let height = ui.available_height() / 2.0 - 10.0;
    let x_label = "log10 Period [days]";
    let pk = plots::scatter(&log_periods, &ks);
    let pe = plots::scatter(&log_periods, &eccs);
    scatter(ui, "p-k", x_label, "Semi-amplitude [m/s]", pk, height);
    scatter(ui, "p-e", x_label, "Eccentricity", pe, height);
}

fn gp_marginal_plot(ui: &mut Ui, state: &ViewerState) {
    let series = plots::gp_parameters(&state.results);
    if series.is_empty() {
        log::warn!("Model has no GP component; plot 4 is empty");
        notice(ui, "This model does not have a GP component.");
        return;
    }
    histogram_grid(ui, "gp", &series);
}

fn gp_joint_plot(ui: &mut Ui, state: &ViewerState) {
    let series = plots::gp_parameters(&state.results);
    if series.len() < 2 {
        log::warn!("Model has no GP component; plot 5 is empty");
        notice(ui, "This model does not have a GP component.");
        return;
    }
    let pairs: Vec<(usize, usize)> = (0..series.len() - 1).map(|i| (i, i + 1)).collect();
    let height = (ui.available_height() / pairs.len() as f32 - 10.0).max(120.0);
    for (a, b) in pairs {
        let (xa, va) = &series[a];
        let (xb, vb) = &series[b];
        scatter(ui, &format!("gp-{xa}-{xb}"), xa, xb, plots::scatter(va, vb), height);
    }
}

fn data_space_plot(ui: &mut Ui, state: &ViewerState) {
    Plot::new("data_space")
        .legend(Legend::default())
        .x_axis_label("Time [days]")
        .y_axis_label("RV [m/s]")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for curve in &state.curves {
                plot_ui.line(
                    Line::new(PlotPoints::from(curve.clone()))
                        .color(CURVE_COLOR.gamma_multiply(0.6))
                        .width(1.0),
                );
            }

            for series in &state.data_series {
                let color = state.instrument_colors.color_for(series.instrument);
                let bar_color = lighten_color(color, 0.5);
                for &[t, lo, hi] in &series.errors {
                    plot_ui.line(
                        Line::new(PlotPoints::from(vec![[t, lo], [t, hi]]))
                            .color(bar_color)
                            .width(1.0),
                    );
                }
                let name = if state.data_series.len() > 1 {
                    format!("instrument {}", series.instrument)
                } else {
                    "data".to_string()
                };
                plot_ui.points(
                    Points::new(PlotPoints::from(series.points.clone()))
                        .radius(3.0)
                        .color(if state.data_series.len() > 1 { color } else { POINT_COLOR })
                        .name(name),
                );
            }
        });
}

fn extra_plot(ui: &mut Ui, state: &ViewerState) {
    let series = plots::extra_parameters(&state.results);
    if state.results.layout.as_ref().is_some_and(|l| l.fiber_offset.is_none()) {
        log::warn!("Model has no fiber offset; plot 7 shows the other parameters");
    }
    histogram_grid(ui, "extra", &series);
}

fn diagnostic_plot(ui: &mut Ui, state: &ViewerState) {
    let logx = &state.results.logx_samples;
    let points: Vec<[f64; 2]> = logx
        .iter()
        .enumerate()
        .map(|(i, &x)| [i as f64, x])
        .collect();
    Plot::new("diagnostic")
        .x_axis_label("Sample")
        .y_axis_label("log(X)")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(points)).color(HIST_COLOR).width(1.5));
        });
}
