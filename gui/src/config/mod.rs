// GUI configuration module
pub mod theme;

use engine::config::SimulationParams;
use serde::Deserialize;
use shared::models::AssetConfig;

/// Mirrors assets/config/default.json.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub version: String,
    pub app: AppSettings,
    pub chart: ChartConfig,
    pub trading: TradingConfig,
    pub simulation: SimulationParams,
    pub assets: Vec<AssetConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    pub theme: String, // "dark" or "light"
    pub language: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub price_axis_width: f64,
    pub time_axis_height: f64,
    pub fps: u32,
    /// Gridlines and price labels are rebuilt once every this many frames.
    pub grid_refresh_frames: u32,
    pub grid_lines: usize,
    pub candle: CandleStyle,
    pub viewport: ViewportConfig,
    pub autoscale: AutoscaleConfig,
    pub overlay: OverlayConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CandleStyle {
    pub bullish_color: String,
    pub bearish_color: String,
    pub body_width_ratio: f64,
    pub wick_width: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub initial_scale_x: f64,
    pub min_scale_x: f64,
    pub max_scale_x: f64,
    /// Offset from the plot centre where the newest candle's right edge sits in follow mode.
    pub follow_offset_px: f64,
    /// Pixels of the oldest/newest candle that panning always leaves on screen.
    pub min_visible_px: f64,
    pub zoom_step: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct AutoscaleConfig {
    /// Half-width of the price band used when the visible range is flat, as a fraction of price.
    pub degenerate_band: f64,
    pub padding_ratio: f64,
    /// Newest candles left out of the min/max scan.
    pub exclude_recent: usize,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    pub collision_px: f64,
    pub fan_offset_px: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TradingConfig {
    pub default_symbol: String,
    pub default_timeframe_seconds: u32,
    pub default_stake: f64,
    pub expiry_seconds: u32,
    pub starting_balance: f64,
    pub speed_factor: f64,
    pub tz_offset_hours: f64,
    pub history_size: usize,
}

impl AppConfig {
    /// Loads the embedded default configuration.
    pub fn load_default() -> Result<Self, anyhow::Error> {
        let config_str = include_str!("../../assets/config/default.json");
        Self::from_json(config_str)
    }

    pub fn from_json(raw: &str) -> Result<Self, anyhow::Error> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let vp = &self.chart.viewport;
        if !(vp.min_scale_x > 0.0 && vp.min_scale_x <= vp.max_scale_x) {
            anyhow::bail!("viewport scale bounds are invalid: [{}, {}]", vp.min_scale_x, vp.max_scale_x);
        }
        if !(vp.zoom_step > 1.0) {
            anyhow::bail!("zoom_step must be greater than 1, got {}", vp.zoom_step);
        }
        if self.chart.fps == 0 {
            anyhow::bail!("fps must be positive");
        }
        let max_speed = self.simulation.max_speed_factor;
        if !(max_speed.is_finite() && max_speed > 0.0) {
            anyhow::bail!("max_speed_factor must be finite and positive, got {}", max_speed);
        }
        if !(self.trading.speed_factor >= 0.0 && self.trading.speed_factor <= max_speed) {
            anyhow::bail!("speed_factor {} is outside [0, {}]", self.trading.speed_factor, max_speed);
        }
        if self.assets.is_empty() {
            anyhow::bail!("asset catalog is empty");
        }
        if !self.assets.iter().any(|a| a.id == self.trading.default_symbol) {
            anyhow::bail!("default symbol '{}' is not in the asset catalog", self.trading.default_symbol);
        }
        Ok(())
    }
}
