mod app;
mod state;
mod ui;

use app::TheatreDashApp;
use eframe::egui;
use theatre_dash::config::AppConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration, using defaults: {e:#}");
            AppConfig::default()
        }
    };
    log::info!("data directory: {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NHS Theatre Utilisation",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render png/jpg from disk.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(TheatreDashApp::new(config)))
        }),
    )
}
