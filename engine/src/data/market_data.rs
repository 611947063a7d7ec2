// Registry of per-asset simulation engines
use shared::models::AssetConfig;
use std::collections::BTreeMap;

use crate::config::{EngineSettings, SimulationParams};
use crate::sim::SymbolEngine;

/// One independent `SymbolEngine` per tradable asset, keyed by asset id.
/// Engines never interact; stepping one has no effect on another.
pub struct MarketSimulator {
    params: SimulationParams,
    engines: BTreeMap<String, SymbolEngine>,
}

impl MarketSimulator {
    pub fn new(params: SimulationParams) -> Self {
        MarketSimulator {
            params,
            engines: BTreeMap::new(),
        }
    }

    pub fn from_settings(settings: &EngineSettings, now: i64) -> Self {
        let mut simulator = Self::new(settings.simulation.clone());
        for asset in &settings.assets {
            simulator.insert(asset.clone(), now);
        }
        tracing::info!(assets = simulator.engines.len(), "Market simulator ready");
        simulator
    }

    /// Creates (or recreates) the engine for `asset`.
    pub fn insert(&mut self, asset: AssetConfig, now: i64) {
        let id = asset.id.clone();
        let engine = SymbolEngine::new(asset, self.params.clone(), now);
        if self.engines.insert(id.clone(), engine).is_some() {
            tracing::debug!(symbol = %id, "Replaced existing symbol engine");
        }
    }

    /// Tears down one asset's engine and its tick history.
    pub fn remove(&mut self, id: &str) -> Option<SymbolEngine> {
        self.engines.remove(id)
    }

    /// Steps every engine; returns the total number of ticks appended.
    pub fn step_all(&mut self, now: i64, speed_factor: f64) -> usize {
        self.engines.values_mut().map(|engine| engine.step(now, speed_factor)).sum()
    }

    pub fn engine(&self, id: &str) -> Option<&SymbolEngine> {
        self.engines.get(id)
    }

    pub fn engine_mut(&mut self, id: &str) -> Option<&mut SymbolEngine> {
        self.engines.get_mut(id)
    }

    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetConfig> {
        self.engines.values().map(SymbolEngine::asset)
    }

    pub fn engines(&self) -> impl Iterator<Item = &SymbolEngine> {
        self.engines.values()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
