// Per-asset synthetic price walk and its retention-bounded tick buffer
use std::collections::VecDeque;

use shared::models::{AssetConfig, Candle, Tick};

use super::rng::SeededRng;
use crate::aggregation;
use crate::config::SimulationParams;

/// Owns one asset's RNG state, current price and tick history.
///
/// The buffer only ever holds ticks inside `[now - keep_ms, now]`, tick
/// times never decrease, and `price` never drops below the configured
/// positive floor.
#[derive(Debug, Clone)]
pub struct SymbolEngine {
    asset: AssetConfig,
    params: SimulationParams,
    volatility: f64,
    rng: SeededRng,
    price: f64,
    last_tick: i64,
    ticks: VecDeque<Tick>,
}

impl SymbolEngine {
    /// Builds the engine and back-fills its history up to `now`, so every
    /// reasonable timeframe has candles from the first frame on.
    pub fn new(asset: AssetConfig, params: SimulationParams, now: i64) -> Self {
        let seed = asset.seed.unwrap_or_else(|| SeededRng::seed_for(&asset.id));
        let floor = positive_floor(params.price_floor);
        let price = if asset.initial_price.is_finite() && asset.initial_price > floor {
            asset.initial_price
        } else {
            floor
        };
        let volatility = if asset.volatility.is_finite() { asset.volatility.abs() } else { 0.0 };

        let mut engine = SymbolEngine {
            asset,
            params,
            volatility,
            rng: SeededRng::new(seed),
            price,
            last_tick: now,
            ticks: VecDeque::new(),
        };
        engine.backfill(now);
        tracing::debug!(
            symbol = %engine.asset.id,
            seed,
            ticks = engine.ticks.len(),
            price = engine.price,
            "Symbol engine initialised"
        );
        engine
    }

    fn backfill(&mut self, now: i64) {
        let lookback = self.params.backfill_ms.min(self.params.keep_ms).max(0);
        let interval = self.params.sample_interval_ms.max(1);
        let mut t = now - lookback;
        loop {
            self.ticks.push_back(Tick { time_ms: t, price: self.price });
            if t >= now {
                break;
            }
            self.price = self.perturb(self.price);
            t = (t + interval).min(now);
        }
        self.last_tick = now;
    }

    fn max_speed(&self) -> f64 {
        let max = self.params.max_speed_factor;
        if max.is_finite() && max > 0.0 {
            max
        } else {
            1.0
        }
    }

    fn perturb(&mut self, price: f64) -> f64 {
        let delta = (self.rng.next_f64() - 0.5) * self.volatility * self.params.scale_constant;
        let next = price + delta;
        let floor = positive_floor(self.params.price_floor);
        if next.is_finite() && next > floor {
            next
        } else {
            floor
        }
    }

    /// Advances the walk to `now`. Returns the number of ticks appended.
    ///
    /// Calls closer than `min_step_gap_ms` to the previous step do nothing.
    /// After a long pause only the last `keep_ms` worth of steps is
    /// generated, since anything older would be pruned straight away.
    /// `speed_factor` is capped at `max_speed_factor`, so one call appends
    /// at most `keep_ms / unit_interval_ms * max_speed_factor` ticks.
    pub fn step(&mut self, now: i64, speed_factor: f64) -> usize {
        let elapsed = now - self.last_tick;
        if elapsed < self.params.min_step_gap_ms.max(0) || elapsed <= 0 {
            return 0;
        }
        if !(speed_factor.is_finite() && speed_factor > 0.0) {
            return 0;
        }

        let span = elapsed.min(self.params.keep_ms.max(1));
        let unit = self.params.unit_interval_ms.max(1) as f64;
        let speed = speed_factor.min(self.max_speed());
        let steps = (span as f64 / unit * speed).floor() as usize;
        if steps == 0 {
            return 0;
        }

        let start = now - span;
        for k in 1..=steps {
            let offset = (i128::from(span) * k as i128 / steps as i128) as i64;
            self.price = self.perturb(self.price);
            self.ticks.push_back(Tick { time_ms: start + offset, price: self.price });
        }
        self.last_tick = now;
        self.prune(now);
        steps
    }

    fn prune(&mut self, now: i64) {
        let cutoff = now - self.params.keep_ms;
        while self.ticks.front().is_some_and(|t| t.time_ms < cutoff) {
            self.ticks.pop_front();
        }
    }

    /// Candles for `timeframe_seconds`, bucketed up to the last step.
    pub fn build_candles(&self, timeframe_seconds: u32, tz_offset_hours: f64) -> Vec<Candle> {
        aggregation::build_candles(&self.ticks, self.last_tick, timeframe_seconds, tz_offset_hours)
    }

    /// Close of the bucket containing `time_ms`; `None` if that bucket has no ticks.
    pub fn close_price_at(&self, time_ms: i64, timeframe_seconds: u32) -> Option<f64> {
        aggregation::close_price_at(&self.ticks, time_ms, timeframe_seconds, 0.0)
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn last_tick(&self) -> i64 {
        self.last_tick
    }

    pub fn ticks(&self) -> &VecDeque<Tick> {
        &self.ticks
    }

    pub fn asset(&self) -> &AssetConfig {
        &self.asset
    }

    pub fn id(&self) -> &str {
        &self.asset.id
    }
}

fn positive_floor(floor: f64) -> f64 {
    if floor.is_finite() && floor > 0.0 {
        floor
    } else {
        f64::MIN_POSITIVE
    }
}
