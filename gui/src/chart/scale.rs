// Vertical price <-> pixel mapping fitted to the visible candles
use engine::aggregation::price_range;
use shared::models::Candle;

use crate::config::AutoscaleConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    min: f64,
    max: f64,
    top: f64,
    height: f64,
}

impl PriceScale {
    /// Fits the visible candles and the live price. A flat or empty range
    /// falls back to a band of `degenerate_band` around the live price.
    pub fn fit(visible: &[Candle], live_price: f64, autoscale: &AutoscaleConfig, top: f64, height: f64) -> Self {
        let (mut min, mut max) = match price_range(visible, autoscale.exclude_recent) {
            Some((lo, hi)) => (lo.min(live_price), hi.max(live_price)),
            None => (live_price, live_price),
        };
        if !(max > min) {
            let reference = if live_price.is_finite() && live_price > 0.0 { live_price } else { min.abs().max(1.0) };
            let half_band = (reference * autoscale.degenerate_band).max(f64::EPSILON);
            min = reference - half_band;
            max = reference + half_band;
        }
        let pad = (max - min) * autoscale.padding_ratio;
        PriceScale {
            min: min - pad,
            max: max + pad,
            top,
            height: height.max(1.0),
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn price_to_y(&self, price: f64) -> f64 {
        self.top + (self.max - price) / (self.max - self.min) * self.height
    }

    pub fn y_to_price(&self, y: f64) -> f64 {
        self.max - (y - self.top) / self.height * (self.max - self.min)
    }

    /// Gridline prices on a 1/2/5 step, ascending, all inside the range.
    pub fn grid_levels(&self, target_lines: usize) -> Vec<f64> {
        let step = nice_step((self.max - self.min) / target_lines.max(1) as f64);
        if !(step.is_finite() && step > 0.0) {
            return Vec::new();
        }
        let mut levels = Vec::new();
        let mut level = (self.min / step).ceil() * step;
        while level <= self.max && levels.len() <= target_lines * 3 {
            levels.push(level);
            level += step;
        }
        levels
    }
}

/// Smallest 1, 2 or 5 times a power of ten that is at least `raw`.
pub fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 0.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    fn autoscale() -> AutoscaleConfig {
        AutoscaleConfig { degenerate_band: 0.001, padding_ratio: 0.1, exclude_recent: 0 }
    }

    fn candle(low: f64, high: f64) -> Candle {
        Candle { bucket_start: 0, open: low, high, low, close: high, volume: 1 }
    }

    #[test]
    fn pads_visible_range() {
        let scale = PriceScale::fit(&[candle(10.0, 20.0)], 15.0, &autoscale(), 0.0, 100.0);
        assert!((scale.min() - 9.0).abs() < 1e-9);
        assert!((scale.max() - 21.0).abs() < 1e-9);
    }

    #[test]
    fn live_price_extends_range() {
        let scale = PriceScale::fit(&[candle(10.0, 20.0)], 30.0, &autoscale(), 0.0, 100.0);
        assert!(scale.max() > 30.0);
    }

    #[test]
    fn flat_range_uses_band_around_price() {
        let scale = PriceScale::fit(&[candle(100.0, 100.0)], 100.0, &autoscale(), 0.0, 100.0);
        assert!(scale.min() < 100.0 && scale.max() > 100.0);
        assert!((scale.max() - 100.12).abs() < 1e-9);

        let empty = PriceScale::fit(&[], 50.0, &autoscale(), 0.0, 100.0);
        assert!(empty.min() < 50.0 && empty.max() > 50.0);
    }

    #[test]
    fn y_mapping_inverts() {
        let scale = PriceScale::fit(&[candle(1.0, 2.0)], 1.5, &autoscale(), 10.0, 200.0);
        assert!((scale.price_to_y(scale.max()) - 10.0).abs() < 1e-9);
        assert!((scale.price_to_y(scale.min()) - 210.0).abs() < 1e-9);
        assert!((scale.y_to_price(scale.price_to_y(1.23)) - 1.23).abs() < 1e-9);
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(0.7), 1.0);
        assert_eq!(nice_step(1.5), 2.0);
        assert_eq!(nice_step(30.0), 50.0);
        assert_eq!(nice_step(0.0), 0.0);
        assert!((nice_step(0.00013) - 0.0002).abs() < 1e-12);
    }

    #[test]
    fn grid_levels_stay_in_range() {
        let scale = PriceScale::fit(&[candle(10.0, 20.0)], 15.0, &autoscale(), 0.0, 100.0);
        let levels = scale.grid_levels(8);
        assert!(!levels.is_empty());
        assert!(levels.iter().all(|l| *l >= scale.min() && *l <= scale.max()));
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
    }
}
