mod app;
mod data;
mod figure;
mod menus;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::ObsDiagApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

/// Plot the time evolution of forecast and analysis RMSE from an obs_diag file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Diagnostic file: obs_diag netCDF output or a JSON export
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let dataset = data::loader::load_file(&cli.file)
        .with_context(|| format!("loading {}", cli.file.display()))?;
    let mut state = AppState::default();
    state.set_dataset(dataset)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "RMSE Time Evolution Plotter",
        options,
        Box::new(move |cc| {
            // White figure background, like a printed chart.
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(ObsDiagApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
