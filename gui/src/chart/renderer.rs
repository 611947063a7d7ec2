// Per-frame chart pipeline: step the engine, aggregate, transform, emit a Scene
use engine::SymbolEngine;
use shared::models::{Candle, Order};
use shared::utils::{bucket_start, bucket_width_ms, format_countdown, format_price, format_time_label, tz_offset_ms};

use super::overlay::{OverlayFrame, OverlayLayer};
use super::scale::PriceScale;
use super::scene::{CandleShape, CountdownBox, GridLine, LivePriceLine, Scene, TimeLabel};
use super::viewport::Viewport;
use crate::config::ChartConfig;

/// Minimum spacing between time-axis labels.
const TIME_LABEL_SPACING_PX: f64 = 90.0;

/// Pixel size of the drawing area. Owned by the renderer and resized in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSurface {
    width: f64,
    height: f64,
}

impl RenderSurface {
    pub fn new(width: f64, height: f64) -> Self {
        RenderSurface {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Returns true when the size actually changed.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let (width, height) = (width.max(1.0), height.max(1.0));
        if (width - self.width).abs() < 0.5 && (height - self.height).abs() < 0.5 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

pub struct ChartRenderer {
    surface: RenderSurface,
    viewport: Viewport,
    chart: ChartConfig,
    timeframe_seconds: u32,
    tz_offset_hours: f64,
    last_frame_ms: Option<i64>,
    frames_since_grid: u32,
    /// Price levels of the gridlines; mapped to pixels with each frame's scale.
    grid_levels: Vec<f64>,
    grid_dirty: bool,
    grid_generation: u64,
    last_candle_count: usize,
    overlays: OverlayLayer,
}

impl ChartRenderer {
    pub fn new(chart: ChartConfig, timeframe_seconds: u32, tz_offset_hours: f64) -> Self {
        ChartRenderer {
            surface: RenderSurface::new(chart.width, chart.height),
            viewport: Viewport::new(chart.viewport),
            chart,
            timeframe_seconds,
            tz_offset_hours,
            last_frame_ms: None,
            frames_since_grid: 0,
            grid_levels: Vec::new(),
            grid_dirty: true,
            grid_generation: 0,
            last_candle_count: 0,
            overlays: OverlayLayer::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn timeframe_seconds(&self) -> u32 {
        self.timeframe_seconds
    }

    pub fn overlays(&self) -> &OverlayLayer {
        &self.overlays
    }

    fn frame_interval_ms(&self) -> i64 {
        (1000 / i64::from(self.chart.fps.max(1))).max(1)
    }

    fn plot_width(&self) -> f64 {
        (self.surface.width() - self.chart.price_axis_width).max(1.0)
    }

    fn plot_height(&self) -> f64 {
        (self.surface.height() - self.chart.time_axis_height).max(1.0)
    }

    /// Renders one frame, or returns `None` when throttled or when there is
    /// nothing to draw. Steps the engine as a side effect.
    pub fn frame(&mut self, now: i64, engine: Option<&mut SymbolEngine>, orders: &[Order], speed_factor: f64) -> Option<Scene> {
        if let Some(last) = self.last_frame_ms {
            if now >= last && now - last < self.frame_interval_ms() {
                return None;
            }
        }
        let engine = engine?;
        self.last_frame_ms = Some(now);

        engine.step(now, speed_factor);
        let candles = engine.build_candles(self.timeframe_seconds, self.tz_offset_hours);
        if candles.is_empty() {
            return None;
        }
        let count = candles.len();
        self.last_candle_count = count;

        let plot_width = self.plot_width();
        let plot_height = self.plot_height();
        self.viewport.follow(count, plot_width);
        self.viewport.clamp_translate(count, plot_width);

        let range = self.viewport.visible_range(count, plot_width);
        let price = engine.price();
        let scale = PriceScale::fit(&candles[range.clone()], price, &self.chart.autoscale, 0.0, plot_height);

        self.refresh_grid(&scale);
        let grid = self.grid_lines(&scale, plot_height);

        let candle_shapes = range
            .clone()
            .map(|i| self.candle_shape(i, &candles[i], &scale))
            .collect();
        let time_labels = self.time_labels(&candles, range);

        let live_y = scale.price_to_y(price);
        let live_line = LivePriceLine { y: live_y, label: format_price(price) };

        let width_ms = bucket_width_ms(self.timeframe_seconds);
        let forming_end = bucket_start(now, width_ms, tz_offset_ms(self.tz_offset_hours)) + width_ms;
        let countdown = CountdownBox {
            x: self.viewport.world_x(count as f64),
            y: live_y,
            label: format_countdown(forming_end - now),
        };

        self.overlays.layout(
            &OverlayFrame {
                symbol: engine.id(),
                candles: &candles,
                timeframe_seconds: self.timeframe_seconds,
                viewport: &self.viewport,
                scale: &scale,
                config: &self.chart.overlay,
                now,
            },
            orders,
        );

        Some(Scene {
            width: self.surface.width(),
            height: self.surface.height(),
            plot_width,
            plot_height,
            candles: candle_shapes,
            grid,
            grid_generation: self.grid_generation,
            time_labels,
            live_line: Some(live_line),
            countdown: Some(countdown),
            overlays: self.overlays.ordered(),
            show_return_to_follow: self.viewport.needs_return_to_follow(count, plot_width),
        })
    }

    /// Grid price levels are picked every `grid_refresh_frames`
    /// frames, or right away after a resize or timeframe change.
    fn refresh_grid(&mut self, scale: &PriceScale) {
        let due = self.frames_since_grid + 1 >= self.chart.grid_refresh_frames.max(1);
        if !(self.grid_dirty || due) {
            self.frames_since_grid += 1;
            return;
        }
        self.grid_levels = scale.grid_levels(self.chart.grid_lines);
        self.grid_dirty = false;
        self.frames_since_grid = 0;
        self.grid_generation += 1;
    }

    fn grid_lines(&self, scale: &PriceScale, plot_height: f64) -> Vec<GridLine> {
        self.grid_levels
            .iter()
            .map(|&level| GridLine { price: level, y: scale.price_to_y(level), label: format_price(level) })
            .filter(|line| (0.0..=plot_height).contains(&line.y))
            .collect()
    }

    fn candle_shape(&self, index: usize, candle: &Candle, scale: &PriceScale) -> CandleShape {
        let x = self.viewport.world_x(index as f64 + 0.5);
        let open_y = scale.price_to_y(candle.open);
        let close_y = scale.price_to_y(candle.close);
        CandleShape {
            index,
            x,
            body_top: open_y.min(close_y),
            body_height: (open_y - close_y).abs().max(1.0),
            body_width: (self.viewport.scale_x() * self.chart.candle.body_width_ratio).max(1.0),
            wick_top: scale.price_to_y(candle.high),
            wick_bottom: scale.price_to_y(candle.low),
            bullish: candle.is_bullish(),
        }
    }

    fn time_labels(&self, candles: &[Candle], range: std::ops::Range<usize>) -> Vec<TimeLabel> {
        let every = (TIME_LABEL_SPACING_PX / self.viewport.scale_x()).ceil().max(1.0) as usize;
        let with_seconds = self.timeframe_seconds < 60;
        range
            .filter(|i| i % every == 0)
            .map(|i| TimeLabel {
                x: self.viewport.world_x(i as f64 + 0.5),
                label: format_time_label(candles[i].bucket_start, self.tz_offset_hours, with_seconds),
            })
            .collect()
    }

    /// Wheel zoom around the cursor; scrolling up (negative delta) zooms in.
    pub fn on_wheel(&mut self, cursor_x: f64, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let step = self.chart.viewport.zoom_step;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        let plot_width = self.plot_width();
        self.viewport.zoom_at(cursor_x, factor, self.last_candle_count, plot_width);
    }

    pub fn begin_drag(&mut self, x: f64) {
        self.viewport.begin_drag(x);
    }

    pub fn drag_to(&mut self, x: f64) {
        let plot_width = self.plot_width();
        self.viewport.drag_to(x, self.last_candle_count, plot_width);
    }

    pub fn end_drag(&mut self) {
        self.viewport.end_drag();
    }

    pub fn return_to_follow(&mut self) {
        self.viewport.return_to_follow();
    }

    pub fn set_timeframe(&mut self, timeframe_seconds: u32) {
        if self.timeframe_seconds != timeframe_seconds {
            self.timeframe_seconds = timeframe_seconds;
            self.viewport.return_to_follow();
            self.invalidate();
        }
    }

    /// Forces the next call to `frame` to render and rebuild the grid.
    pub fn invalidate(&mut self) {
        self.grid_dirty = true;
        self.last_frame_ms = None;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if self.surface.resize(width, height) {
            tracing::debug!(width, height, "Chart surface resized.");
            self.invalidate();
        }
    }
}
