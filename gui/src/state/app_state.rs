// Application state owned by the desktop render loop.
// The loop is the only writer: it steps the engines, renders the active chart
// and settles expired orders against the in-process balance.

use std::collections::VecDeque;

use anyhow::Context;
use engine::orders::{OrderBook, OrderRequest};
use engine::MarketSimulator;
use serde::{Deserialize, Serialize};
use shared::models::{AssetConfig, Direction, Order, Settlement};

use crate::chart::{ChartRenderer, Scene};
use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("light") {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

pub struct AppState {
    pub config: AppConfig,
    simulator: MarketSimulator,
    orders: OrderBook,
    renderer: ChartRenderer,
    pub active_symbol: String,
    pub balance: f64,
    pub stake: f64,
    pub expiry_seconds: u32,
    pub speed_factor: f64,
    /// Settled orders, newest first.
    pub history: VecDeque<Settlement>,
    /// Last rendered frame of the active chart.
    pub scene: Option<Scene>,
    pub command_palette_visible: bool,
    pub current_theme: Theme,
    pub error_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig, now: i64) -> Self {
        let mut simulator = MarketSimulator::new(config.simulation.clone());
        for asset in &config.assets {
            simulator.insert(asset.clone(), now);
        }
        let trading = &config.trading;
        let renderer = ChartRenderer::new(config.chart.clone(), trading.default_timeframe_seconds, trading.tz_offset_hours);
        tracing::info!(
            assets = simulator.len(),
            symbol = %trading.default_symbol,
            "Market simulator initialised."
        );
        AppState {
            active_symbol: trading.default_symbol.clone(),
            balance: trading.starting_balance,
            stake: trading.default_stake,
            expiry_seconds: trading.expiry_seconds,
            speed_factor: trading.speed_factor,
            history: VecDeque::with_capacity(trading.history_size),
            scene: None,
            command_palette_visible: false,
            current_theme: Theme::from_name(&config.app.theme),
            error_message: None,
            simulator,
            orders: OrderBook::new(),
            renderer,
            config,
        }
    }

    pub fn simulator(&self) -> &MarketSimulator {
        &self.simulator
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut ChartRenderer {
        &mut self.renderer
    }

    pub fn active_asset(&self) -> Option<&AssetConfig> {
        self.simulator.engine(&self.active_symbol).map(|e| e.asset())
    }

    pub fn active_price(&self) -> Option<f64> {
        self.simulator.engine(&self.active_symbol).map(|e| e.price())
    }

    pub fn timeframe_seconds(&self) -> u32 {
        self.renderer.timeframe_seconds()
    }

    /// Pending orders on the active chart.
    pub fn pending_orders(&self) -> Vec<Order> {
        self.orders.pending_for(&self.active_symbol)
    }

    /// Switches the chart to another asset. Unknown ids are ignored.
    pub fn select_asset(&mut self, symbol: &str) -> bool {
        if self.simulator.engine(symbol).is_none() {
            tracing::warn!(symbol, "Ignoring selection of unknown asset.");
            return false;
        }
        if self.active_symbol != symbol {
            tracing::info!(from = %self.active_symbol, to = symbol, "Switching active asset.");
            self.active_symbol = symbol.to_string();
            self.renderer.return_to_follow();
            self.renderer.invalidate();
        }
        self.command_palette_visible = false;
        true
    }

    pub fn set_timeframe(&mut self, timeframe_seconds: u32) {
        self.renderer.set_timeframe(timeframe_seconds);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.current_theme = theme;
    }

    /// Places an order on the active asset and debits the stake.
    pub fn place_trade(&mut self, direction: Direction, now: i64) -> Result<Order, anyhow::Error> {
        if !(self.stake.is_finite() && self.stake > 0.0) {
            anyhow::bail!("Stake must be positive");
        }
        if self.stake > self.balance {
            anyhow::bail!("Insufficient balance: stake {:.2} exceeds {:.2}", self.stake, self.balance);
        }
        let engine = self
            .simulator
            .engine(&self.active_symbol)
            .with_context(|| format!("Asset '{}' is not available", self.active_symbol))?;
        let request = OrderRequest {
            symbol: self.active_symbol.clone(),
            direction,
            stake: self.stake,
            expiry_seconds: self.expiry_seconds,
            timeframe_seconds: self.renderer.timeframe_seconds(),
        };
        let order = self.orders.place(request, engine, now)?;
        self.balance -= order.stake;
        tracing::info!(
            order_id = %order.id,
            symbol = %order.symbol,
            direction = %order.direction,
            stake = order.stake,
            strike = order.strike_price,
            "Order placed."
        );
        Ok(order)
    }

    /// Settles expired orders and credits their payouts.
    pub fn settle_due(&mut self, now: i64) -> Vec<Settlement> {
        let settled = self.orders.settle_due(now, &self.simulator);
        for settlement in &settled {
            self.balance += settlement.payout_amount;
            tracing::debug!(order_id = %settlement.order.id, balance = self.balance, "Balance credited.");
            self.history.push_front(settlement.clone());
        }
        self.history.truncate(self.config.trading.history_size);
        settled
    }

    /// One tick of the render loop. Returns true when a new scene was produced.
    pub fn frame(&mut self, now: i64) -> bool {
        let pending = self.orders.pending_for(&self.active_symbol);
        let engine = self.simulator.engine_mut(&self.active_symbol);
        let rendered = self.renderer.frame(now, engine, &pending, self.speed_factor);
        let updated = rendered.is_some();
        if let Some(scene) = rendered {
            self.scene = Some(scene);
            // background assets keep evolving while another one is on screen
            self.simulator.step_all(now, self.speed_factor);
            self.settle_due(now);
        }
        updated
    }

    pub fn resize_chart(&mut self, width: f64, height: f64) {
        self.renderer.resize(width, height);
    }

    /// Stops accepting and settling orders. Late timers become no-ops.
    pub fn teardown(&mut self) {
        tracing::info!(pending = self.orders.len(), "Tearing down trading state.");
        self.orders.shutdown();
        self.scene = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Outcome;

    const NOW: i64 = 1_700_000_000_000;

    fn state() -> AppState {
        AppState::new(AppConfig::load_default().unwrap(), NOW)
    }

    #[test]
    fn starts_on_default_asset() {
        let s = state();
        assert_eq!(s.active_symbol, "EURUSD-OTC");
        assert_eq!(s.simulator().len(), 5);
        assert!(s.active_price().unwrap() > 0.0);
        assert_eq!(s.balance, 1000.0);
    }

    #[test]
    fn selecting_unknown_asset_is_ignored() {
        let mut s = state();
        assert!(!s.select_asset("DOGE-OTC"));
        assert_eq!(s.active_symbol, "EURUSD-OTC");
        assert!(s.select_asset("BTCUSD-OTC"));
        assert_eq!(s.active_asset().unwrap().id, "BTCUSD-OTC");
    }

    #[test]
    fn placing_a_trade_debits_stake() {
        let mut s = state();
        let order = s.place_trade(Direction::Call, NOW).unwrap();
        assert_eq!(s.balance, 990.0);
        assert_eq!(order.end_time, NOW + 60_000);
        assert_eq!(s.pending_orders().len(), 1);
    }

    #[test]
    fn stake_above_balance_is_rejected() {
        let mut s = state();
        s.stake = 5_000.0;
        assert!(s.place_trade(Direction::Put, NOW).is_err());
        assert_eq!(s.balance, 1000.0);
        assert!(s.orders().is_empty());
    }

    #[test]
    fn settlement_credits_payout_and_records_history() {
        let mut s = state();
        let order = s.place_trade(Direction::Call, NOW).unwrap();
        assert!(s.settle_due(NOW + 1_000).is_empty());

        let settled = s.settle_due(order.end_time);
        assert_eq!(settled.len(), 1);
        let payout = s.active_asset().unwrap().payout;
        let expected = match settled[0].outcome {
            Outcome::Win => 10.0 * (1.0 + payout / 100.0),
            Outcome::Draw => 10.0,
            Outcome::Loss => 0.0,
        };
        assert!((settled[0].payout_amount - expected).abs() < 1e-9);
        assert!((s.balance - (990.0 + expected)).abs() < 1e-9);
        assert_eq!(s.history.len(), 1);
        assert!(s.pending_orders().is_empty());
    }

    #[test]
    fn frame_renders_and_steps() {
        let mut s = state();
        assert!(s.frame(NOW + 1_000));
        assert!(s.scene.is_some());
        assert!(!s.frame(NOW + 1_001));
    }

    #[test]
    fn teardown_blocks_new_orders() {
        let mut s = state();
        s.place_trade(Direction::Call, NOW).unwrap();
        s.teardown();
        assert!(s.place_trade(Direction::Call, NOW).is_err());
        assert!(s.settle_due(NOW + 120_000).is_empty());
        assert_eq!(s.orders().len(), 1);
    }
}
