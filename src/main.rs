mod app;
mod color;
mod state;
mod ui;

use app::RustyIrisApp;
use eframe::egui;
use rusty_iris::settings::Settings;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings: {e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Iris – Calibration Diagnostics",
        options,
        Box::new(|_cc| Ok(Box::new(RustyIrisApp::new(AppState::new(settings))))),
    )
}
