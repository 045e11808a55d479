mod app;
mod color;
mod config;
mod export;
mod state;
mod ui;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use influencer_dashboard::data::shared_table;

use app::DashboardApp;
use config::Args;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(out) = &args.export {
        return export::run(&args, out);
    }

    let mut state = AppState::new(args.view_settings(), args.load_options());
    if let Some(path) = &args.data {
        let table = shared_table()
            .get_or_load(path, &args.load_options())
            .with_context(|| format!("loading {}", path.display()))?;
        state.set_table(table);
        if let Some(table) = state.table.clone() {
            state.filter = Some(args.filter_spec(&table));
            state.refresh();
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Influencer ROI Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
