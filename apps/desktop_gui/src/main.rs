mod backend_bridge;
mod controller;
mod ui;

use crossbeam_channel::bounded;
use eframe::egui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::StarPlotApp;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

fn resolve_server_url() -> String {
    std::env::var("STARPLOT_SERVER_URL")
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let server_url = resolve_server_url();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);

    backend_bridge::runtime::launch(server_url.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Exoplanet Star Plotter")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([880.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Exoplanet Star Plotter",
        options,
        Box::new(move |_cc| Ok(Box::new(StarPlotApp::new(cmd_tx, ui_rx, server_url)))),
    )
}
