// Order placement and settlement
pub mod book;
pub mod settlement;

pub use book::{OrderBook, OrderRequest};
