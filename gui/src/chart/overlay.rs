// Order markers positioned through the chart transform
use std::collections::BTreeMap;

use shared::models::{Candle, Direction, Order};
use shared::utils::{bucket_width_ms, format_countdown};

use super::scale::PriceScale;
use super::viewport::Viewport;
use crate::config::OverlayConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderOverlay {
    pub order_id: String,
    pub direction: Direction,
    pub placed_at: i64,
    /// Placement time at the strike price.
    pub start: Point,
    /// Expiry time at the strike price.
    pub end: Point,
    pub badge: Point,
    pub label: String,
    /// Number of earlier badges this one was shifted past.
    pub fan_level: usize,
}

/// Everything the layout needs from the current frame.
pub struct OverlayFrame<'a> {
    pub symbol: &'a str,
    pub candles: &'a [Candle],
    pub timeframe_seconds: u32,
    pub viewport: &'a Viewport,
    pub scale: &'a PriceScale,
    pub config: &'a OverlayConfig,
    pub now: i64,
}

/// Fractional candle index of `time_ms`. Times past the newest candle are
/// extrapolated one bucket per index; times before the oldest have no position.
pub fn index_for_time(candles: &[Candle], time_ms: i64, width_ms: i64) -> Option<f64> {
    let first = candles.first()?;
    if time_ms < first.bucket_start {
        return None;
    }
    let idx = candles.partition_point(|c| c.bucket_start <= time_ms) - 1;
    let offset = (time_ms - candles[idx].bucket_start) as f64 / width_ms as f64;
    let pos = idx as f64 + offset;
    if idx + 1 < candles.len() {
        // inside a gap the marker waits at the next candle
        Some(pos.min((idx + 1) as f64))
    } else {
        Some(pos)
    }
}

/// Overlays keyed by order id, rebuilt from the pending orders every frame.
#[derive(Debug, Clone, Default)]
pub struct OverlayLayer {
    overlays: BTreeMap<String, OrderOverlay>,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&mut self, frame: &OverlayFrame<'_>, orders: &[Order]) {
        self.overlays.clear();
        let width_ms = bucket_width_ms(frame.timeframe_seconds);

        let mut relevant: Vec<&Order> = orders.iter().filter(|o| o.symbol == frame.symbol).collect();
        relevant.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then_with(|| a.id.cmp(&b.id)));

        let mut placed_badges: Vec<f64> = Vec::with_capacity(relevant.len());
        for order in relevant {
            let Some(start_idx) = index_for_time(frame.candles, order.placed_at, width_ms) else {
                continue;
            };
            let end_idx = index_for_time(frame.candles, order.end_time, width_ms).unwrap_or(start_idx);
            let y = frame.scale.price_to_y(order.strike_price);
            let start = Point { x: frame.viewport.world_x(start_idx), y };
            let end = Point { x: frame.viewport.world_x(end_idx), y };

            let fan_level = placed_badges
                .iter()
                .filter(|other_y| (**other_y - y).abs() < frame.config.collision_px)
                .count();
            placed_badges.push(y);

            let badge = Point {
                x: start.x - fan_level as f64 * frame.config.fan_offset_px,
                y,
            };
            let label = format!(
                "{} {:.2} {}",
                order.direction,
                order.stake,
                format_countdown(order.end_time - frame.now)
            );
            self.overlays.insert(
                order.id.clone(),
                OrderOverlay {
                    order_id: order.id.clone(),
                    direction: order.direction,
                    placed_at: order.placed_at,
                    start,
                    end,
                    badge,
                    label,
                    fan_level,
                },
            );
        }
    }

    pub fn get(&self, order_id: &str) -> Option<&OrderOverlay> {
        self.overlays.get(order_id)
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Overlays with the most recent order first.
    pub fn ordered(&self) -> Vec<OrderOverlay> {
        let mut list: Vec<OrderOverlay> = self.overlays.values().cloned().collect();
        list.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then_with(|| a.order_id.cmp(&b.order_id)));
        list
    }
}
