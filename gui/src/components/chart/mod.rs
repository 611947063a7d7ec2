// Chart components
pub mod candlestick;
pub mod order_overlay;

pub use candlestick::ChartView;
