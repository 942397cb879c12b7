use eframe::egui::{self, Ui};
use egui_plot::{HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points};

use rusty_iris::model::Primary;

use crate::color::{channel_color, hue_color, FIT, FLAGGED, MEASURED};
use crate::state::{AppState, GridView, SeriesView, View};

// ---------------------------------------------------------------------------
// Central panel dispatch
// ---------------------------------------------------------------------------

/// Render the plot for the active view.
pub fn central_plot(ui: &mut Ui, state: &AppState) {
    match state.view {
        View::ConeGrid => match &state.grid {
            Some(grid) => cone_grid(ui, grid, state.settings.level_max),
            None => placeholder(
                ui,
                "Open cone activations and a calibration record  (File → …)",
            ),
        },
        View::Isoslant => isoslant_plot(ui, state),
        View::ColorSeries => match &state.series {
            Some(series) => series_plot(ui, series),
            None => placeholder(ui, "Open a colour series  (File → Colour series…)"),
        },
    }
}

fn placeholder(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(text);
    });
}

// ---------------------------------------------------------------------------
// Cone × primary grid
// ---------------------------------------------------------------------------

/// 3 × 3 small multiples: measured scatter and dashed model curve per cell.
fn cone_grid(ui: &mut Ui, grid: &GridView, level_max: f64) {
    let spacing = ui.spacing().item_spacing;
    let cell_w = (ui.available_width() - 2.0 * spacing.x) / 3.0;
    let cell_h = (ui.available_height() - 3.0 * (spacing.y + 18.0)) / 3.0;

    egui::Grid::new("cone_grid")
        .spacing(spacing)
        .show(ui, |ui: &mut Ui| {
            for (i, cell) in grid.cells.iter().enumerate() {
                ui.vertical(|ui: &mut Ui| {
                    ui.label(format!(
                        "{}   max |residual| {:.3e}",
                        cell.label(),
                        grid.max_residual[i]
                    ));

                    let measured: PlotPoints = cell
                        .levels
                        .iter()
                        .zip(&cell.measured)
                        .map(|(&x, &y)| [x, y])
                        .collect();
                    let fitted: PlotPoints = grid
                        .xev
                        .iter()
                        .zip(&cell.curve.response)
                        .map(|(&x, &y)| [x, y])
                        .collect();

                    Plot::new(("cone_cell", i))
                        .width(cell_w.max(80.0))
                        .height(cell_h.max(60.0))
                        .include_x(0.0)
                        .include_x(level_max)
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.points(
                                Points::new(measured)
                                    .name("data")
                                    .color(MEASURED)
                                    .radius(1.5),
                            );
                            plot_ui.line(
                                Line::new(fitted)
                                    .name("fit")
                                    .color(FIT)
                                    .style(LineStyle::dashed_loose())
                                    .width(1.5),
                            );
                        });
                });

                if i % 3 == 2 {
                    ui.end_row();
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Isoslant
// ---------------------------------------------------------------------------

/// Samples coloured by hue, the baseline, and the model curve when present.
fn isoslant_plot(ui: &mut Ui, state: &AppState) {
    if state.isoslant.is_none() && state.isoslant_samples.is_empty() {
        placeholder(ui, "Open an isoslant record or samples  (File → …)");
        return;
    }

    let baseline = state.settings.isoslant_offset;
    let curve = state.isoslant_curve();

    Plot::new("isoslant_plot")
        .legend(Legend::default())
        .x_axis_label("Hue angle [rad]")
        .y_axis_label("Luminance")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for &[x, y] in &state.isoslant_samples {
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[x, y]]))
                        .color(hue_color(x))
                        .radius(3.0),
                );
            }

            plot_ui.hline(HLine::new(baseline).color(FIT).name("baseline"));

            if let (Some(points), Some(model)) = (curve, &state.isoslant) {
                let points: PlotPoints = points.into_iter().collect();
                plot_ui.line(
                    Line::new(points)
                        .name(format!("{} model", model.name()))
                        .color(FIT)
                        .style(LineStyle::dashed_loose())
                        .width(1.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Colour series
// ---------------------------------------------------------------------------

/// r, g, b traces over the series position, flagged rows marked.
fn series_plot(ui: &mut Ui, view: &SeriesView) {
    Plot::new("series_plot")
        .legend(Legend::default())
        .x_axis_label("Angle")
        .y_axis_label("Channel value")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for primary in Primary::ALL {
                let points: PlotPoints = view
                    .series
                    .iter()
                    .map(|s| [s.x, s.rgb()[primary.index()]])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(primary.label().to_lowercase())
                        .color(channel_color(primary))
                        .width(1.5),
                );
            }

            for primary in Primary::ALL {
                let flagged: PlotPoints = view
                    .report
                    .flagged
                    .iter()
                    .map(|f| [f.row.x, f.row.rgb()[primary.index()]])
                    .collect();
                plot_ui.points(
                    Points::new(flagged)
                        .name("equal step")
                        .color(FLAGGED)
                        .radius(3.5),
                );
            }
        });
}
