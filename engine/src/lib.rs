// Engine library root: simulation, aggregation, orders and the gRPC feed.

pub mod aggregation;
pub mod config;
pub mod data;
pub mod error;
pub mod orders;
pub mod services;
pub mod sim;

pub use data::market_data::MarketSimulator;
pub use error::EngineError;
pub use sim::SymbolEngine;
