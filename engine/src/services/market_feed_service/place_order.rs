// Handlers for PlaceOrder and ListOrders, plus the per-order expiry timer
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use super::helpers::{to_proto_order, unknown_symbol};
use super::MarketState;
use crate::error::EngineError;
use crate::orders::OrderRequest;
use crate::services::{ListOrdersRequest, ListOrdersResponse, OrderResponse, PlaceOrderRequest};
use shared::models::Direction;
use shared::utils::now_ms;

pub async fn handle_place_order(
    req_payload: PlaceOrderRequest,
    state: Arc<RwLock<MarketState>>,
    speed_factor: f64,
) -> Result<Response<OrderResponse>, Status> {
    let direction: Direction = req_payload
        .direction
        .parse()
        .map_err(|e: anyhow::Error| EngineError::InvalidOrder(e.to_string()))?;

    let order = {
        let mut guard = state.write().await;
        let MarketState { simulator, orders } = &mut *guard;
        let now = now_ms();
        let engine = simulator
            .engine_mut(&req_payload.symbol)
            .ok_or_else(|| unknown_symbol(&req_payload.symbol))?;
        // strike at the freshest price
        engine.step(now, speed_factor);
        let request = OrderRequest {
            symbol: req_payload.symbol.clone(),
            direction,
            stake: req_payload.stake,
            expiry_seconds: req_payload.expiry_seconds,
            timeframe_seconds: req_payload.timeframe_seconds,
        };
        orders.place(request, engine, now)?
    };

    spawn_expiry_timer(order.id.clone(), order.symbol.clone(), order.end_time, state, speed_factor);
    Ok(Response::new(OrderResponse {
        order: Some(to_proto_order(&order)),
    }))
}

/// Settles the order once its expiry passes. A timer firing after the
/// order book was shut down (or after the order was cancelled) does nothing.
fn spawn_expiry_timer(order_id: String, symbol: String, end_time: i64, state: Arc<RwLock<MarketState>>, speed_factor: f64) {
    tokio::spawn(async move {
        let wait_ms = (end_time - now_ms()).max(0) as u64 + 1;
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;

        let mut guard = state.write().await;
        let MarketState { simulator, orders } = &mut *guard;
        if !orders.is_live() {
            tracing::debug!(order_id = %order_id, "Expiry timer fired after shutdown, ignoring");
            return;
        }
        let now = now_ms().max(end_time);
        if let Some(engine) = simulator.engine_mut(&symbol) {
            engine.step(now, speed_factor);
        }
        match orders.settle_one(&order_id, now, simulator) {
            Some(settlement) => tracing::info!(
                order_id = %order_id,
                symbol = %symbol,
                strike = settlement.order.strike_price,
                close = settlement.close_price,
                outcome = ?settlement.outcome,
                payout = settlement.payout_amount,
                "Order settled at expiry"
            ),
            None => tracing::debug!(order_id = %order_id, "Order already resolved or cancelled"),
        }
    });
}

pub async fn handle_list_orders(
    req_payload: ListOrdersRequest,
    state: Arc<RwLock<MarketState>>,
) -> Result<Response<ListOrdersResponse>, Status> {
    let guard = state.read().await;
    let orders = guard
        .orders
        .pending()
        .into_iter()
        .filter(|o| req_payload.symbol.is_empty() || o.symbol == req_payload.symbol)
        .map(to_proto_order)
        .collect();
    Ok(Response::new(ListOrdersResponse { orders }))
}
