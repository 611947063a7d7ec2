// Expiry resolution of binary orders
use shared::models::{Direction, Order, Outcome, Settlement};

use crate::sim::SymbolEngine;

/// Width of the bucket whose close is taken as the expiry price.
pub const SETTLEMENT_TIMEFRAME_SECONDS: u32 = 1;

pub fn outcome_for(direction: Direction, strike_price: f64, close_price: f64) -> Outcome {
    if close_price == strike_price {
        return Outcome::Draw;
    }
    let went_up = close_price > strike_price;
    match (direction, went_up) {
        (Direction::Call, true) | (Direction::Put, false) => Outcome::Win,
        _ => Outcome::Loss,
    }
}

/// Amount credited back: stake plus payout on a win, the stake on a draw, nothing on a loss.
pub fn payout_amount(outcome: Outcome, stake: f64, payout_percent: f64) -> f64 {
    match outcome {
        Outcome::Win => stake * (1.0 + payout_percent / 100.0),
        Outcome::Draw => stake,
        Outcome::Loss => 0.0,
    }
}

/// Resolves `order` against its engine. The close of the bucket holding the
/// expiry instant is used; when that bucket has no ticks yet the current
/// price stands in.
pub fn settle(order: Order, engine: &SymbolEngine) -> Settlement {
    let close_price = engine
        .close_price_at(order.end_time, SETTLEMENT_TIMEFRAME_SECONDS)
        .unwrap_or_else(|| engine.price());
    let outcome = outcome_for(order.direction, order.strike_price, close_price);
    let payout_amount = payout_amount(outcome, order.stake, engine.asset().payout);
    Settlement {
        order,
        close_price,
        outcome,
        payout_amount,
    }
}
