// Engine settings, loaded from a JSON file or falling back to defaults
use crate::error::EngineError;
use serde::Deserialize;
use shared::models::AssetConfig;
use std::collections::HashSet;
use std::path::Path;

/// Environment variable naming the JSON settings file.
pub const CONFIG_ENV_VAR: &str = "OTC_ENGINE_CONFIG";

/// Tunables of the synthetic random walk shared by every asset.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationParams {
    /// Retention window of the tick buffer.
    pub keep_ms: i64,
    /// Upper bound of the history back-filled at start (capped by `keep_ms`).
    pub backfill_ms: i64,
    /// Spacing of back-filled ticks.
    pub sample_interval_ms: i64,
    /// Simulated time represented by one live step.
    pub unit_interval_ms: i64,
    /// Elapsed time below which `step` does nothing.
    pub min_step_gap_ms: i64,
    pub scale_constant: f64,
    /// Strictly positive lower bound for every generated price.
    pub price_floor: f64,
    /// Largest speed factor a single `step` honours.
    pub max_speed_factor: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            keep_ms: 2 * 3_600_000,
            backfill_ms: 3_600_000,
            sample_interval_ms: 1_000,
            unit_interval_ms: 250,
            min_step_gap_ms: 80,
            scale_constant: 1.0,
            price_floor: 0.000_01,
            max_speed_factor: 64.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    pub simulation: SimulationParams,
    /// Multiplier applied to the number of steps per elapsed unit.
    pub speed_factor: f64,
    /// Cadence of the background stepping task.
    pub step_interval_ms: u64,
    /// Cadence of `StreamCandles` pushes.
    pub stream_interval_ms: u64,
    /// Where candle history is written on shutdown; disabled when unset.
    pub export_dir: Option<String>,
    pub export_timeframe_seconds: u32,
    pub assets: Vec<AssetConfig>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "127.0.0.1".to_string(),
            port: 50051,
            simulation: SimulationParams::default(),
            speed_factor: 1.0,
            step_interval_ms: 100,
            stream_interval_ms: 500,
            export_dir: None,
            export_timeframe_seconds: 60,
            assets: default_assets(),
        }
    }
}

impl EngineSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let settings: EngineSettings = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads the file named by `OTC_ENGINE_CONFIG`, or returns the defaults when it is unset.
    pub fn from_env() -> Result<Self, EngineError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!(path = %path, "Loading engine settings from file");
                Self::load(path)
            }
            _ => {
                tracing::info!("{} not set, using default engine settings", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let sim = &self.simulation;
        if sim.keep_ms <= 0 || sim.sample_interval_ms <= 0 || sim.unit_interval_ms <= 0 {
            return Err(EngineError::ConfigError(
                "keep_ms, sample_interval_ms and unit_interval_ms must be positive".to_string(),
            ));
        }
        if !(sim.price_floor > 0.0) {
            return Err(EngineError::ConfigError("price_floor must be strictly positive".to_string()));
        }
        if !(sim.max_speed_factor.is_finite() && sim.max_speed_factor > 0.0) {
            return Err(EngineError::ConfigError("max_speed_factor must be finite and positive".to_string()));
        }
        if !(self.speed_factor >= 0.0 && self.speed_factor <= sim.max_speed_factor) {
            return Err(EngineError::ConfigError(format!(
                "speed_factor must be within [0, {}]",
                sim.max_speed_factor
            )));
        }
        if self.assets.is_empty() {
            return Err(EngineError::ConfigError("asset catalog is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for asset in &self.assets {
            if !seen.insert(asset.id.as_str()) {
                return Err(EngineError::ConfigError(format!("duplicate asset id '{}'", asset.id)));
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn default_assets() -> Vec<AssetConfig> {
    let asset = |id: &str, name: &str, initial_price: f64, volatility: f64, payout: f64| AssetConfig {
        id: id.to_string(),
        name: name.to_string(),
        initial_price,
        volatility,
        payout,
        seed: None,
    };
    vec![
        asset("EURUSD-OTC", "EUR/USD (OTC)", 1.0850, 0.0004, 87.0),
        asset("GBPUSD-OTC", "GBP/USD (OTC)", 1.2650, 0.0005, 85.0),
        asset("USDJPY-OTC", "USD/JPY (OTC)", 151.20, 0.04, 82.0),
        asset("BTCUSD-OTC", "Bitcoin (OTC)", 65_000.0, 18.0, 80.0),
        asset("XAUUSD-OTC", "Gold (OTC)", 2_350.0, 0.6, 84.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let settings = EngineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.addr(), "127.0.0.1:50051");
        assert!(settings.simulation.backfill_ms <= settings.simulation.keep_ms);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "port": 6000, "simulation": {{ "keep_ms": 600000 }} }}"#).unwrap();
        let settings = EngineSettings::load(file.path()).unwrap();
        assert_eq!(settings.port, 6000);
        assert_eq!(settings.simulation.keep_ms, 600_000);
        assert_eq!(settings.simulation.unit_interval_ms, 250);
        assert_eq!(settings.assets.len(), default_assets().len());
    }

    #[test]
    fn duplicate_asset_ids_are_rejected() {
        let mut settings = EngineSettings::default();
        let first = settings.assets[0].clone();
        settings.assets.push(first);
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate asset id"));
    }

    #[test]
    fn non_positive_floor_is_rejected() {
        let mut settings = EngineSettings::default();
        settings.simulation.price_floor = 0.0;
        assert!(matches!(settings.validate(), Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn speed_factor_outside_limit_is_rejected() {
        let mut settings = EngineSettings::default();
        for speed in [1.0e9, f64::NAN, f64::INFINITY, -1.0] {
            settings.speed_factor = speed;
            assert!(matches!(settings.validate(), Err(EngineError::ConfigError(_))), "{speed}");
        }
        settings.speed_factor = settings.simulation.max_speed_factor;
        assert!(settings.validate().is_ok());
        settings.simulation.max_speed_factor = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();
        let err = EngineSettings::load(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::ConfigParseError { .. }));
    }
}
