// Handlers for the candle RPCs: GetCandles, StreamCandles and GetClosePrice
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Response, Status};

use super::helpers::{tail, to_proto_candle, unknown_symbol};
use super::MarketState;
use crate::services::{CandleRequest, CandleResponse, ClosePriceRequest, ClosePriceResponse};
use shared::utils::now_ms;

/// Steps the requested engine up to now and aggregates its candles.
async fn build_response(req: &CandleRequest, state: &Arc<RwLock<MarketState>>, speed_factor: f64) -> Result<CandleResponse, Status> {
    let mut guard = state.write().await;
    let engine = guard
        .simulator
        .engine_mut(&req.symbol)
        .ok_or_else(|| unknown_symbol(&req.symbol))?;
    engine.step(now_ms(), speed_factor);
    let candles = tail(engine.build_candles(req.timeframe_seconds, req.tz_offset_hours), req.limit);
    Ok(CandleResponse {
        symbol: req.symbol.clone(),
        timeframe_seconds: req.timeframe_seconds.max(1),
        price: engine.price(),
        candles: candles.iter().map(to_proto_candle).collect(),
    })
}

pub async fn handle_get_candles(
    req_payload: CandleRequest,
    state: Arc<RwLock<MarketState>>,
    speed_factor: f64,
) -> Result<Response<CandleResponse>, Status> {
    tracing::debug!(symbol = %req_payload.symbol, timeframe = req_payload.timeframe_seconds, "Handling GetCandlesRequest");
    let response = build_response(&req_payload, &state, speed_factor).await?;
    tracing::debug!(symbol = %response.symbol, candles = response.candles.len(), "Candles aggregated");
    Ok(Response::new(response))
}

pub async fn handle_stream_candles(
    req_payload: CandleRequest,
    state: Arc<RwLock<MarketState>>,
    speed_factor: f64,
    interval: Duration,
) -> Result<Response<ReceiverStream<Result<CandleResponse, Status>>>, Status> {
    // fail fast on unknown symbols instead of opening an empty stream
    if state.read().await.simulator.engine(&req_payload.symbol).is_none() {
        return Err(unknown_symbol(&req_payload.symbol).into());
    }

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let message = build_response(&req_payload, &state, speed_factor).await;
            let finished = message.is_err();
            if tx.send(message).await.is_err() {
                tracing::debug!(symbol = %req_payload.symbol, "Candle subscriber went away");
                break;
            }
            if finished {
                tracing::info!(symbol = %req_payload.symbol, "Ending candle stream, asset no longer simulated");
                break;
            }
        }
    });

    Ok(Response::new(ReceiverStream::new(rx)))
}

pub async fn handle_get_close_price(
    req_payload: ClosePriceRequest,
    state: Arc<RwLock<MarketState>>,
) -> Result<Response<ClosePriceResponse>, Status> {
    let guard = state.read().await;
    let engine = guard
        .simulator
        .engine(&req_payload.symbol)
        .ok_or_else(|| unknown_symbol(&req_payload.symbol))?;
    let close = engine.close_price_at(req_payload.time_ms, req_payload.timeframe_seconds);
    tracing::debug!(symbol = %req_payload.symbol, time_ms = req_payload.time_ms, found = close.is_some(), "Close price lookup");
    Ok(Response::new(ClosePriceResponse {
        found: close.is_some(),
        price: close.unwrap_or_default(),
    }))
}
