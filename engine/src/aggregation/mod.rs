// Candle aggregation over simulated ticks
pub mod candles;

pub use candles::{build_candles, close_price_at, price_range};
