use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_iris::model::{CalibrationCoefficients, Cone, IsoslantModel, Primary};

use crate::state::{AppState, InputKind, View};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            for kind in InputKind::ALL {
                if ui.button(kind.title()).clicked() {
                    open_file_dialog(state, kind);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.view, View::ConeGrid, "Cone grid");
        ui.selectable_value(&mut state.view, View::Isoslant, "Isoslant");
        ui.selectable_value(&mut state.view, View::ColorSeries, "Colour series");

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – parameters of the active view
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    match state.view {
        View::ConeGrid => grid_details(ui, state),
        View::Isoslant => isoslant_details(ui, state),
        View::ColorSeries => series_details(ui, state),
    }
}

fn grid_details(ui: &mut Ui, state: &AppState) {
    ui.heading("Calibration");
    ui.separator();

    match &state.measured {
        Some(ds) => ui.label(format!("Measured: 3×3×{}", ds.samples_per_cell())),
        None => ui.label("No cone activations loaded."),
    };

    let Some(c) = &state.coefficients else {
        ui.label("No coefficients loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            coefficient_table(ui, c);
        });
}

fn coefficient_table(ui: &mut Ui, c: &CalibrationCoefficients) {
    egui::Grid::new("coefficients")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("");
            ui.strong("A₀");
            for primary in Primary::ALL {
                ui.strong(format!("A·{primary}"));
            }
            ui.end_row();

            for cone in Cone::ALL {
                ui.strong(cone.label());
                ui.label(format!("{:.4e}", c.offset[cone.index()]));
                for primary in Primary::ALL {
                    ui.label(format!("{:.4e}", c.gain[cone.index()][primary.index()]));
                }
                ui.end_row();
            }

            ui.strong("ɣ");
            ui.label("");
            for primary in Primary::ALL {
                ui.label(format!("{:.4}", c.exponent[primary.index()]));
            }
            ui.end_row();
        });
}

fn isoslant_details(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Isoslant");
    ui.separator();

    let mut offset = state.settings.isoslant_offset;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Baseline");
        if ui
            .add(egui::DragValue::new(&mut offset).speed(0.005).max_decimals(4))
            .changed()
        {
            state.set_isoslant_offset(offset);
        }
    });

    match &state.isoslant {
        Some(IsoslantModel::Cosine {
            amplitude, phase, ..
        }) => {
            ui.label("y = offset + a·cos(x − φ)");
            ui.label(format!("a = {amplitude:.4}"));
            ui.label(format!("φ = {phase:.4} rad"));
        }
        Some(IsoslantModel::Sine {
            amplitude,
            phase,
            frequency,
            ..
        }) => {
            ui.label("y = offset + a·sin(f·x − φ)");
            ui.label(format!("a = {amplitude:.4}"));
            ui.label(format!("φ = {phase:.4} rad"));
            ui.label(format!("f = {frequency:.4}"));
        }
        None => {
            ui.label("No isoslant record loaded.");
        }
    }

    ui.separator();
    ui.label(format!("{} samples", state.isoslant_samples.len()));
}

fn series_details(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Equal steps");
    ui.separator();

    let mut tolerance = state.settings.anomaly_tolerance;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Tolerance");
        let response = ui.add(
            egui::DragValue::new(&mut tolerance)
                .speed(1e-4)
                .range(0.0..=1.0)
                .max_decimals(6),
        );
        if response.changed() {
            if let Err(e) = state.set_anomaly_tolerance(tolerance) {
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    });
    if tolerance == 0.0 {
        ui.small("exact equality");
    }

    let Some(view) = &state.series else {
        ui.label("No colour series loaded.");
        return;
    };

    ui.label(format!(
        "{} of {} steps flagged",
        view.report.len(),
        view.series.len().saturating_sub(1)
    ));
    ui.separator();

    let with_sml = state.coefficients.is_some();
    let mut table = TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .columns(Column::auto(), 5);
    if with_sml {
        table = table.columns(Column::auto(), 3);
    }

    table
        .header(18.0, |mut header| {
            let mut titles = vec!["#", "x", "r", "g", "b", "Δ"];
            if with_sml {
                titles.extend(["S", "M", "L"]);
            }
            for title in titles {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for flag in &view.report.flagged {
                let sml = state.sml_for(&flag.row);
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(flag.index.to_string());
                    });
                    for value in [flag.row.x, flag.row.r, flag.row.g, flag.row.b, flag.delta] {
                        row.col(|ui| {
                            ui.label(format!("{value:.4}"));
                        });
                    }
                    if with_sml {
                        for k in 0..3 {
                            row.col(|ui| {
                                match &sml {
                                    Some(Ok(v)) => ui.label(format!("{:.4}", v[k])),
                                    Some(Err(e)) => ui
                                        .label(RichText::new("out of range").color(Color32::RED))
                                        .on_hover_text(e.to_string()),
                                    None => ui.label("–"),
                                };
                            });
                        }
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, kind: InputKind) {
    let file = rfd::FileDialog::new()
        .set_title(kind.title().trim_end_matches('…'))
        .add_filter("Supported files", kind.extensions())
        .pick_file();

    if let Some(path) = file {
        match state.load(kind, &path) {
            Ok(()) => {
                log::info!("Loaded {:?} from {}", kind, path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
