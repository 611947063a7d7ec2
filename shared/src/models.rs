use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One simulated price observation. Times are epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub time_ms: i64,
    pub price: f64,
}

/// OHLCV summary of the ticks that fell inside one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub bucket_start: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Static catalog entry for a tradable asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub id: String,
    pub name: String,
    pub initial_price: f64,
    pub volatility: f64,
    /// Payout in percent of the stake paid on a winning order.
    pub payout: f64,
    /// Fixed RNG seed. When absent the seed is derived from the asset id.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Call,
    Put,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Call => write!(f, "CALL"),
            Direction::Put => write!(f, "PUT"),
        }
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CALL" | "UP" | "BUY" => Ok(Direction::Call),
            "PUT" | "DOWN" | "SELL" => Ok(Direction::Put),
            other => Err(anyhow::anyhow!("Unknown order direction '{}'", other)),
        }
    }
}

/// A pending binary order. Read-only for the chart; resolved by the order book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub direction: Direction,
    pub stake: f64,
    pub strike_price: f64,
    pub placed_at: i64,
    pub end_time: i64,
    pub timeframe_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub order: Order,
    pub close_price: f64,
    pub outcome: Outcome,
    /// Amount credited back to the trader (0 on a loss, the stake on a draw).
    pub payout_amount: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    Second5,
    Second15,
    Second30,
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 8] = [
        TimeFrame::Second5,
        TimeFrame::Second15,
        TimeFrame::Second30,
        TimeFrame::Minute1,
        TimeFrame::Minute5,
        TimeFrame::Minute15,
        TimeFrame::Minute30,
        TimeFrame::Hour1,
    ];

    pub fn seconds(&self) -> u32 {
        match self {
            TimeFrame::Second5 => 5,
            TimeFrame::Second15 => 15,
            TimeFrame::Second30 => 30,
            TimeFrame::Minute1 => 60,
            TimeFrame::Minute5 => 300,
            TimeFrame::Minute15 => 900,
            TimeFrame::Minute30 => 1800,
            TimeFrame::Hour1 => 3600,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::Second5 => "5s",
            TimeFrame::Second15 => "15s",
            TimeFrame::Second30 => "30s",
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Minute30 => "30m",
            TimeFrame::Hour1 => "1h",
        }
    }

    pub fn from_seconds(seconds: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|tf| tf.seconds() == seconds)
    }
}

impl FromStr for TimeFrame {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TimeFrame::ALL
            .iter()
            .copied()
            .find(|tf| tf.label() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Unknown timeframe '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_labels_parse_back() {
        for tf in TimeFrame::ALL {
            assert_eq!(tf.label().parse::<TimeFrame>().unwrap(), tf);
            assert_eq!(TimeFrame::from_seconds(tf.seconds()), Some(tf));
        }
        assert!("2m".parse::<TimeFrame>().is_err());
    }

    #[test]
    fn direction_accepts_aliases() {
        assert_eq!("call".parse::<Direction>().unwrap(), Direction::Call);
        assert_eq!(" Sell ".parse::<Direction>().unwrap(), Direction::Put);
        assert!("hold".parse::<Direction>().is_err());
    }

    #[test]
    fn asset_config_seed_is_optional() {
        let json = r#"{"id":"EURUSD-OTC","name":"EUR/USD (OTC)","initial_price":1.085,"volatility":0.0004,"payout":87.0}"#;
        let asset: AssetConfig = serde_json::from_str(json).unwrap();
        assert_eq!(asset.seed, None);
        assert_eq!(asset.payout, 87.0);
    }

    #[test]
    fn direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Put).unwrap(), "\"PUT\"");
    }
}
