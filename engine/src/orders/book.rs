// Pending binary orders, keyed by id
use shared::models::{Direction, Order, Settlement};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::settlement;
use crate::data::market_data::MarketSimulator;
use crate::error::EngineError;
use crate::sim::SymbolEngine;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub direction: Direction,
    pub stake: f64,
    pub expiry_seconds: u32,
    /// Chart timeframe the order was placed from; used for marker placement.
    pub timeframe_seconds: u32,
}

/// Orders waiting for expiry. Once shut down, placing fails and settling
/// does nothing, so timers that fire after teardown are harmless.
#[derive(Debug)]
pub struct OrderBook {
    orders: BTreeMap<String, Order>,
    live: bool,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook {
            orders: BTreeMap::new(),
            live: true,
        }
    }

    /// Records a new order struck at the engine's current price.
    pub fn place(&mut self, req: OrderRequest, engine: &SymbolEngine, now: i64) -> Result<Order, EngineError> {
        if !self.live {
            return Err(EngineError::OrderBookClosed);
        }
        if req.symbol != engine.id() {
            return Err(EngineError::InvalidOrder(format!(
                "order for '{}' routed to engine '{}'",
                req.symbol,
                engine.id()
            )));
        }
        if !(req.stake.is_finite() && req.stake > 0.0) {
            return Err(EngineError::InvalidOrder(format!("stake must be positive, got {}", req.stake)));
        }
        if req.expiry_seconds == 0 {
            return Err(EngineError::InvalidOrder("expiry must be at least one second".to_string()));
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            symbol: req.symbol,
            direction: req.direction,
            stake: req.stake,
            strike_price: engine.price(),
            placed_at: now,
            end_time: now + i64::from(req.expiry_seconds) * 1000,
            timeframe_seconds: req.timeframe_seconds.max(1),
        };
        tracing::info!(
            order_id = %order.id,
            symbol = %order.symbol,
            direction = %order.direction,
            stake = order.stake,
            strike = order.strike_price,
            end_time = order.end_time,
            "Order placed"
        );
        self.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn cancel(&mut self, id: &str) -> Option<Order> {
        self.orders.remove(id)
    }

    /// Pending orders, oldest first.
    pub fn pending(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.values().collect();
        orders.sort_by_key(|o| (o.placed_at, o.end_time));
        orders
    }

    pub fn pending_for(&self, symbol: &str) -> Vec<Order> {
        self.pending().into_iter().filter(|o| o.symbol == symbol).cloned().collect()
    }

    /// Settles and removes every order whose expiry is at or before `now`.
    pub fn settle_due(&mut self, now: i64, simulator: &MarketSimulator) -> Vec<Settlement> {
        if !self.live {
            return Vec::new();
        }
        let due: Vec<String> = self
            .orders
            .values()
            .filter(|o| o.end_time <= now)
            .map(|o| o.id.clone())
            .collect();

        let mut settled = Vec::with_capacity(due.len());
        for id in due {
            let Some(order) = self.orders.remove(&id) else { continue };
            if let Some(result) = settle_removed(order, simulator) {
                tracing::info!(
                    order_id = %result.order.id,
                    symbol = %result.order.symbol,
                    close = result.close_price,
                    outcome = ?result.outcome,
                    payout = result.payout_amount,
                    "Order settled"
                );
                settled.push(result);
            }
        }
        settled
    }

    /// Settles one order if it is due; used by per-order expiry timers.
    pub fn settle_one(&mut self, id: &str, now: i64, simulator: &MarketSimulator) -> Option<Settlement> {
        if !self.live {
            return None;
        }
        let due = self.orders.get(id).is_some_and(|o| o.end_time <= now);
        if !due {
            return None;
        }
        let order = self.orders.remove(id)?;
        settle_removed(order, simulator)
    }

    pub fn shutdown(&mut self) {
        self.live = false;
        tracing::info!(pending = self.orders.len(), "Order book shut down");
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Settles an order already taken out of the book. Orders whose asset is gone are dropped.
fn settle_removed(order: Order, simulator: &MarketSimulator) -> Option<Settlement> {
    match simulator.engine(&order.symbol) {
        Some(engine) => Some(settlement::settle(order, engine)),
        None => {
            tracing::warn!(order_id = %order.id, symbol = %order.symbol, "Dropping order for an asset that is no longer simulated");
            None
        }
    }
}
