// Engine main entry point: market-feed gRPC server
use engine::config::settings::EngineSettings;
use engine::data::csv_export;
use engine::data::market_data::MarketSimulator;
use engine::services::market_feed_service::{MarketState, MyMarketFeed};
use engine::services::MarketFeedServer;
use shared::utils::now_ms;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tonic::transport::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    info!("Starting OTC market engine...");

    let settings = EngineSettings::from_env()?;
    settings.validate()?;
    let addr = settings.addr().parse()?;
    info!("Engine will listen on {}", addr);

    let simulator = MarketSimulator::from_settings(&settings, now_ms());
    let state = Arc::new(RwLock::new(MarketState::new(simulator)));

    // Background stepping keeps prices moving between requests.
    let stepper = {
        let state = state.clone();
        let speed_factor = settings.speed_factor;
        let period = Duration::from_millis(settings.step_interval_ms.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let appended = state.write().await.simulator.step_all(now_ms(), speed_factor);
                tracing::trace!(appended, "Stepped all engines");
            }
        })
    };

    let market_feed_service = MyMarketFeed::new(state.clone(), &settings);

    Server::builder()
        .add_service(MarketFeedServer::new(market_feed_service))
        .serve_with_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await?;

    stepper.abort();
    let mut guard = state.write().await;
    guard.orders.shutdown();
    if let Some(dir) = settings.export_dir.as_deref() {
        let files = csv_export::export_all(&guard.simulator, Path::new(dir), settings.export_timeframe_seconds)?;
        info!(files = files.len(), dir = %dir, "Candle history exported");
    }

    info!("Engine stopped.");
    Ok(())
}
