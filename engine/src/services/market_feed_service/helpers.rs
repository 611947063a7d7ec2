// Conversions between domain models and generated protobuf types
use shared::models::{Candle as DomainCandle, Order as DomainOrder};

use crate::error::EngineError;
use crate::services::{ProtoAsset, ProtoCandle, ProtoOrder};
use crate::sim::SymbolEngine;

pub fn to_proto_candle(candle: &DomainCandle) -> ProtoCandle {
    ProtoCandle {
        bucket_start: candle.bucket_start,
        open: candle.open,
        high: candle.high,
        low: candle.low,
        close: candle.close,
        volume: candle.volume,
    }
}

pub fn to_proto_order(order: &DomainOrder) -> ProtoOrder {
    ProtoOrder {
        id: order.id.clone(),
        symbol: order.symbol.clone(),
        direction: order.direction.to_string(),
        stake: order.stake,
        strike_price: order.strike_price,
        placed_at: order.placed_at,
        end_time: order.end_time,
        timeframe_seconds: order.timeframe_seconds,
    }
}

pub fn to_proto_asset(engine: &SymbolEngine) -> ProtoAsset {
    let asset = engine.asset();
    ProtoAsset {
        id: asset.id.clone(),
        name: asset.name.clone(),
        price: engine.price(),
        payout: asset.payout,
        volatility: asset.volatility,
    }
}

/// Keeps only the `limit` most recent candles; zero keeps them all.
pub fn tail(candles: Vec<DomainCandle>, limit: u32) -> Vec<DomainCandle> {
    let limit = limit as usize;
    if limit == 0 || candles.len() <= limit {
        candles
    } else {
        candles[candles.len() - limit..].to_vec()
    }
}

pub fn unknown_symbol(symbol: &str) -> EngineError {
    EngineError::UnknownSymbol(symbol.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(bucket_start: i64) -> DomainCandle {
        DomainCandle { bucket_start, open: 1.0, high: 1.0, low: 1.0, close: 1.0, volume: 1 }
    }

    #[test]
    fn tail_keeps_most_recent() {
        let candles: Vec<DomainCandle> = (0..5).map(candle).collect();
        let kept = tail(candles.clone(), 2);
        assert_eq!(kept.iter().map(|c| c.bucket_start).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(tail(candles.clone(), 0).len(), 5);
        assert_eq!(tail(candles, 10).len(), 5);
    }
}
