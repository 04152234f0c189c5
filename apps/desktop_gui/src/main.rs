use std::sync::Arc;

mod backend_bridge;
mod config;
mod controller;
mod media;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::HttpGenerationClient;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use config::{Args, StartupConfig};
use controller::events::UiEvent;
use controller::form::FormController;
use controller::schedule::SystemClock;
use ui::EmojiGeneratorApp;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = StartupConfig::from_args(Args::parse())?;
    let service = HttpGenerationClient::new(&config.server_url)
        .with_context(|| format!("failed to set up client for {}", config.server_url))?;
    tracing::info!(
        endpoint = %service.endpoint(),
        location = %config.location,
        "starting emoji maker"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let _backend = backend_bridge::runtime::launch(cmd_rx, ui_tx, Arc::new(service));

    let controller = FormController::new(config.location, Arc::new(SystemClock));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Emoji Maker")
            .with_inner_size([720.0, 860.0])
            .with_min_inner_size([480.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Emoji Maker",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(EmojiGeneratorApp::bootstrap(cmd_tx, ui_rx, controller)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to run the window: {err}"))
}
