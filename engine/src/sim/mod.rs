// Synthetic tick generation
pub mod rng;
pub mod symbol_engine;

pub use rng::SeededRng;
pub use symbol_engine::SymbolEngine;
