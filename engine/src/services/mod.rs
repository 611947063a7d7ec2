// gRPC surface of the market simulator.
// Generated code lands in OUT_DIR via build.rs and is included here.
pub mod generated {
    tonic::include_proto!("market_feed");
}

pub mod market_feed_service;

pub use generated::market_feed_client::MarketFeedClient;
pub use generated::market_feed_server::{MarketFeed, MarketFeedServer};
pub use generated::{
    Asset as ProtoAsset, Candle as ProtoCandle, CandleRequest, CandleResponse, ClosePriceRequest,
    ClosePriceResponse, ListAssetsRequest, ListAssetsResponse, ListOrdersRequest, ListOrdersResponse,
    Order as ProtoOrder, OrderResponse, PlaceOrderRequest,
};
