// Candle history export for offline inspection
use csv::WriterBuilder;
use serde::Serialize;
use shared::models::Candle;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::data::market_data::MarketSimulator;
use crate::error::EngineError;

#[derive(Debug, Serialize)]
struct CandleRecord<'a> {
    symbol: &'a str,
    bucket_start: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Writes `candles` to `path` with a header row. Returns the number of rows written.
pub fn export_candles_csv(path: &Path, symbol: &str, candles: &[Candle]) -> Result<usize, EngineError> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(BufWriter::new(file));
    for candle in candles {
        writer.serialize(CandleRecord {
            symbol,
            bucket_start: candle.bucket_start,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        })?;
    }
    writer.flush()?;
    Ok(candles.len())
}

/// Exports every asset's candles into `dir` as `<asset id>_<timeframe>s.csv`.
pub fn export_all(simulator: &MarketSimulator, dir: &Path, timeframe_seconds: u32) -> Result<Vec<PathBuf>, EngineError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(simulator.len());
    for engine in simulator.engines() {
        let path = dir.join(format!("{}_{}s.csv", engine.id(), timeframe_seconds));
        let candles = engine.build_candles(timeframe_seconds, 0.0);
        let rows = export_candles_csv(&path, engine.id(), &candles)?;
        tracing::info!(symbol = %engine.id(), rows, path = %path.display(), "Exported candles");
        written.push(path);
    }
    Ok(written)
}
