mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::QuakeVizApp;
use config::ViewerConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(QuakeVizApp::new(config)))),
    )
}
