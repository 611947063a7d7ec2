// engine/src/services/market_feed_service/mod.rs
// MyMarketFeed implements the generated MarketFeed trait and dispatches
// each RPC to its handler module.

use super::{
    CandleRequest, CandleResponse, ClosePriceRequest, ClosePriceResponse, ListAssetsRequest,
    ListAssetsResponse, ListOrdersRequest, ListOrdersResponse, MarketFeed, OrderResponse,
    PlaceOrderRequest,
};
use crate::config::EngineSettings;
use crate::data::market_data::MarketSimulator;
use crate::orders::OrderBook;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

pub mod get_candles;
pub mod helpers;
pub mod place_order;

/// Everything the handlers mutate, kept behind one lock so settling an
/// order sees the same engine state that struck it.
pub struct MarketState {
    pub simulator: MarketSimulator,
    pub orders: OrderBook,
}

impl MarketState {
    pub fn new(simulator: MarketSimulator) -> Self {
        MarketState {
            simulator,
            orders: OrderBook::new(),
        }
    }
}

pub struct MyMarketFeed {
    state: Arc<RwLock<MarketState>>,
    speed_factor: f64,
    stream_interval: Duration,
}

impl MyMarketFeed {
    pub fn new(state: Arc<RwLock<MarketState>>, settings: &EngineSettings) -> Self {
        MyMarketFeed {
            state,
            speed_factor: settings.speed_factor,
            stream_interval: Duration::from_millis(settings.stream_interval_ms.max(1)),
        }
    }
}

#[tonic::async_trait]
impl MarketFeed for MyMarketFeed {
    async fn list_assets(&self, _request: Request<ListAssetsRequest>) -> Result<Response<ListAssetsResponse>, Status> {
        let guard = self.state.read().await;
        let assets = guard.simulator.engines().map(helpers::to_proto_asset).collect();
        Ok(Response::new(ListAssetsResponse { assets }))
    }

    async fn get_candles(&self, request: Request<CandleRequest>) -> Result<Response<CandleResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            timeframe_seconds = req_payload.timeframe_seconds,
            tz_offset_hours = req_payload.tz_offset_hours,
            "Received GetCandlesRequest, dispatching to handler."
        );
        get_candles::handle_get_candles(req_payload, self.state.clone(), self.speed_factor).await
    }

    type StreamCandlesStream = ReceiverStream<Result<CandleResponse, Status>>;
    async fn stream_candles(&self, request: Request<CandleRequest>) -> Result<Response<Self::StreamCandlesStream>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            timeframe_seconds = req_payload.timeframe_seconds,
            "Received StreamCandlesRequest, dispatching to handler."
        );
        get_candles::handle_stream_candles(req_payload, self.state.clone(), self.speed_factor, self.stream_interval).await
    }

    async fn get_close_price(&self, request: Request<ClosePriceRequest>) -> Result<Response<ClosePriceResponse>, Status> {
        let req_payload = request.into_inner();
        get_candles::handle_get_close_price(req_payload, self.state.clone()).await
    }

    async fn place_order(&self, request: Request<PlaceOrderRequest>) -> Result<Response<OrderResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            direction = %req_payload.direction,
            stake = req_payload.stake,
            expiry_seconds = req_payload.expiry_seconds,
            "Received PlaceOrderRequest, dispatching to handler."
        );
        place_order::handle_place_order(req_payload, self.state.clone(), self.speed_factor).await
    }

    async fn list_orders(&self, request: Request<ListOrdersRequest>) -> Result<Response<ListOrdersResponse>, Status> {
        let req_payload = request.into_inner();
        place_order::handle_list_orders(req_payload, self.state.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::utils::now_ms;
    use tokio_stream::StreamExt;

    fn create_test_feed() -> (MyMarketFeed, Arc<RwLock<MarketState>>) {
        let mut settings = EngineSettings::default();
        settings.stream_interval_ms = 10;
        let simulator = MarketSimulator::from_settings(&settings, now_ms());
        let state = Arc::new(RwLock::new(MarketState::new(simulator)));
        (MyMarketFeed::new(state.clone(), &settings), state)
    }

    fn candle_request(symbol: &str, timeframe_seconds: u32, limit: u32) -> CandleRequest {
        CandleRequest { symbol: symbol.to_string(), timeframe_seconds, tz_offset_hours: 0.0, limit }
    }

    #[tokio::test]
    async fn test_list_assets_returns_catalog() {
        let (feed, _) = create_test_feed();
        let response = feed.list_assets(Request::new(ListAssetsRequest {})).await.unwrap().into_inner();
        assert_eq!(response.assets.len(), EngineSettings::default().assets.len());
        assert!(response.assets.iter().all(|a| a.price > 0.0));
    }

    #[tokio::test]
    async fn test_get_candles_success_with_limit() {
        let (feed, _) = create_test_feed();
        let response = feed
            .get_candles(Request::new(candle_request("EURUSD-OTC", 60, 0)))
            .await
            .unwrap()
            .into_inner();
        assert!(response.candles.len() >= 60);
        assert!(response.candles.windows(2).all(|w| w[0].bucket_start < w[1].bucket_start));

        let limited = feed
            .get_candles(Request::new(candle_request("EURUSD-OTC", 60, 5)))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(limited.candles.len(), 5);
    }

    #[tokio::test]
    async fn test_get_candles_unknown_symbol() {
        let (feed, _) = create_test_feed();
        let status = feed.get_candles(Request::new(candle_request("NOPE", 60, 0))).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::NotFound);
        assert!(status.message().contains("NOPE"));
    }

    #[tokio::test]
    async fn test_stream_candles_pushes_updates() {
        let (feed, _) = create_test_feed();
        let mut stream = feed
            .stream_candles(Request::new(candle_request("BTCUSD-OTC", 5, 3)))
            .await
            .unwrap()
            .into_inner();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.symbol, "BTCUSD-OTC");
        assert_eq!(first.candles.len(), 3);
        assert!(stream.next().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_stream_candles_ends_when_asset_removed() {
        let (feed, state) = create_test_feed();
        let mut stream = feed
            .stream_candles(Request::new(candle_request("XAUUSD-OTC", 5, 1)))
            .await
            .unwrap()
            .into_inner();
        assert!(stream.next().await.unwrap().is_ok());
        state.write().await.simulator.remove("XAUUSD-OTC");
        // at most one in-flight update, then the NotFound status and the end of the stream
        let mut saw_error = false;
        while let Some(message) = stream.next().await {
            if let Err(status) = message {
                assert_eq!(status.code(), tonic::Code::NotFound);
                saw_error = true;
            }
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn test_get_close_price() {
        let (feed, state) = create_test_feed();
        let last_tick = state.read().await.simulator.engine("EURUSD-OTC").unwrap().last_tick();
        let found = feed
            .get_close_price(Request::new(ClosePriceRequest { symbol: "EURUSD-OTC".to_string(), time_ms: last_tick, timeframe_seconds: 60 }))
            .await
            .unwrap()
            .into_inner();
        assert!(found.found);
        assert!(found.price > 0.0);

        let missing = feed
            .get_close_price(Request::new(ClosePriceRequest { symbol: "EURUSD-OTC".to_string(), time_ms: last_tick + 86_400_000, timeframe_seconds: 60 }))
            .await
            .unwrap()
            .into_inner();
        assert!(!missing.found);
    }

    #[tokio::test]
    async fn test_place_order_and_list() {
        let (feed, _) = create_test_feed();
        let placed = feed
            .place_order(Request::new(PlaceOrderRequest {
                symbol: "GBPUSD-OTC".to_string(),
                direction: "call".to_string(),
                stake: 10.0,
                expiry_seconds: 60,
                timeframe_seconds: 15,
            }))
            .await
            .unwrap()
            .into_inner()
            .order
            .unwrap();
        assert_eq!(placed.direction, "CALL");
        assert_eq!(placed.end_time - placed.placed_at, 60_000);

        let listed = feed
            .list_orders(Request::new(ListOrdersRequest { symbol: "GBPUSD-OTC".to_string() }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(listed.orders.len(), 1);
        assert_eq!(listed.orders[0].id, placed.id);

        let other = feed
            .list_orders(Request::new(ListOrdersRequest { symbol: "EURUSD-OTC".to_string() }))
            .await
            .unwrap()
            .into_inner();
        assert!(other.orders.is_empty());
    }

    #[tokio::test]
    async fn test_place_order_invalid_direction() {
        let (feed, _) = create_test_feed();
        let status = feed
            .place_order(Request::new(PlaceOrderRequest {
                symbol: "GBPUSD-OTC".to_string(),
                direction: "sideways".to_string(),
                stake: 10.0,
                expiry_seconds: 60,
                timeframe_seconds: 15,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_order_settles_at_expiry() {
        let (feed, state) = create_test_feed();
        feed.place_order(Request::new(PlaceOrderRequest {
            symbol: "EURUSD-OTC".to_string(),
            direction: "PUT".to_string(),
            stake: 5.0,
            expiry_seconds: 1,
            timeframe_seconds: 5,
        }))
        .await
        .unwrap();
        assert_eq!(state.read().await.orders.len(), 1);
        tokio::time::sleep(Duration::from_millis(1_300)).await;
        assert!(state.read().await.orders.is_empty());
    }

    #[tokio::test]
    async fn test_timer_after_shutdown_leaves_order() {
        let (feed, state) = create_test_feed();
        feed.place_order(Request::new(PlaceOrderRequest {
            symbol: "EURUSD-OTC".to_string(),
            direction: "CALL".to_string(),
            stake: 5.0,
            expiry_seconds: 1,
            timeframe_seconds: 5,
        }))
        .await
        .unwrap();
        state.write().await.orders.shutdown();
        tokio::time::sleep(Duration::from_millis(1_300)).await;
        assert_eq!(state.read().await.orders.len(), 1);
    }
}
