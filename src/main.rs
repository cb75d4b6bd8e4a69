#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use factory_timeline::Settings;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    let (settings, settings_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    // RUST_LOG wins over the persisted filter.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(e) = settings_error {
        warn!(error = %e, "could not load settings, using defaults");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Factory Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Factory Timeline",
        options,
        Box::new(move |cc| Ok(Box::new(app::PlannerApp::new(cc, settings)))),
    )
}
