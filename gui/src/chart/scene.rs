// Declarative description of one chart frame, drawn as SVG by the chart component
use super::overlay::OrderOverlay;

#[derive(Debug, Clone, PartialEq)]
pub struct CandleShape {
    pub index: usize,
    /// Horizontal centre of the candle.
    pub x: f64,
    pub body_top: f64,
    pub body_height: f64,
    pub body_width: f64,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub bullish: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub price: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeLabel {
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LivePriceLine {
    pub y: f64,
    pub label: String,
}

/// Time left in the forming bucket, drawn next to the newest candle.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownBox {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub plot_width: f64,
    pub plot_height: f64,
    pub candles: Vec<CandleShape>,
    pub grid: Vec<GridLine>,
    /// Bumped every time the gridlines are rebuilt.
    pub grid_generation: u64,
    pub time_labels: Vec<TimeLabel>,
    pub live_line: Option<LivePriceLine>,
    pub countdown: Option<CountdownBox>,
    /// Most recent order first.
    pub overlays: Vec<OrderOverlay>,
    pub show_return_to_follow: bool,
}
