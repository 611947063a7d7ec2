// GUI main entry point using Dioxus
#![allow(non_snake_case)] // Common for Dioxus components

use dioxus::prelude::*;
use dioxus_desktop::{Config as DesktopConfig, LogicalSize, WindowBuilder};

mod app;
mod chart;
mod components;
mod config;
mod state;

use app::App;
use config::AppConfig;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting OTC Trader GUI (Dioxus Desktop)...");

    let app_config = AppConfig::load_default().map_err(|e| {
        tracing::error!("Failed to load default configuration: {}", e);
        e
    })?;
    tracing::info!(
        version = %app_config.version,
        assets = app_config.assets.len(),
        "Loaded default configuration."
    );

    let desktop_config = DesktopConfig::default().with_window(
        WindowBuilder::new()
            .with_title("OTC Trader")
            .with_inner_size(LogicalSize::new(app_config.chart.width + 40.0, app_config.chart.height + 120.0)),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_config)
        .with_context(app_config)
        .launch(App);

    tracing::info!("OTC Trader GUI finished.");
    Ok(())
}
