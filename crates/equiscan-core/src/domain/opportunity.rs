use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{FundamentalSnapshot, Symbol, ValidationError};

/// MACD classification on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MacdSignal {
    BullishCrossover,
    BearishCrossover,
    Bullish,
    Bearish,
    Neutral,
}

impl MacdSignal {
    pub const fn is_bullish(self) -> bool {
        matches!(self, Self::BullishCrossover | Self::Bullish)
    }

    pub const fn is_bearish(self) -> bool {
        matches!(self, Self::BearishCrossover | Self::Bearish)
    }
}

/// Moving-average trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaTrend {
    StrongUptrend,
    Uptrend,
    Sideways,
    Downtrend,
    StrongDowntrend,
    Neutral,
}

impl MaTrend {
    pub const fn is_up(self) -> bool {
        matches!(self, Self::StrongUptrend | Self::Uptrend)
    }

    pub const fn is_down(self) -> bool {
        matches!(self, Self::StrongDowntrend | Self::Downtrend)
    }
}

/// Technical feature set derived from one price window.
///
/// Computed fresh per scan; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub rsi: f64,
    pub macd_signal: MacdSignal,
    pub ma_trend: MaTrend,
    pub volume_surge: bool,
}

impl TechnicalSnapshot {
    /// Degrade default for empty, short, or unparseable price history.
    pub const fn neutral() -> Self {
        Self {
            rsi: 50.0,
            macd_signal: MacdSignal::Neutral,
            ma_trend: MaTrend::Neutral,
            volume_surge: false,
        }
    }
}

/// Component and composite scores, each clamped to [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpportunityScore {
    pub technical: f64,
    pub fundamental: f64,
    pub overall: f64,
}

/// Discrete trading signal derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSignal {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl TradeSignal {
    pub const ALL: [Self; 5] = [
        Self::StrongBuy,
        Self::Buy,
        Self::Hold,
        Self::Sell,
        Self::StrongSell,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG_SELL",
        }
    }

    pub const fn is_buy(self) -> bool {
        matches!(self, Self::StrongBuy | Self::Buy)
    }
}

impl Display for TradeSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSignal {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "STRONG_BUY" => Ok(Self::StrongBuy),
            "BUY" => Ok(Self::Buy),
            "HOLD" => Ok(Self::Hold),
            "SELL" => Ok(Self::Sell),
            "STRONG_SELL" => Ok(Self::StrongSell),
            other => Err(ValidationError::InvalidSignal {
                value: other.to_owned(),
            }),
        }
    }
}

/// Signal plus the human-readable reasoning trail and trade levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub signal: TradeSignal,
    pub confidence: f64,
    pub buy_reasons: Vec<String>,
    pub risk_factors: Vec<String>,
    pub target_price: f64,
    pub stop_loss: f64,
}

/// One fully scored, signaled candidate produced by a scan.
///
/// Immutable after creation; superseded wholesale by the next scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub symbol: Symbol,
    pub company_name: String,
    pub current_price: f64,
    pub market_cap: Option<f64>,
    pub sector: String,
    pub technical: TechnicalSnapshot,
    pub fundamental: FundamentalSnapshot,
    pub score: OpportunityScore,
    pub signal: TradeSignal,
    pub confidence: f64,
    pub buy_reasons: Vec<String>,
    pub risk_factors: Vec<String>,
    pub target_price: f64,
    pub stop_loss: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_tokens_round_trip() {
        for signal in TradeSignal::ALL {
            let parsed: TradeSignal = signal.as_str().parse().expect("token should parse");
            assert_eq!(parsed, signal);
        }
    }

    #[test]
    fn signal_parse_rejects_unknown_token() {
        let err = "MEGA_BUY".parse::<TradeSignal>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSignal { .. }));
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&MacdSignal::BullishCrossover).expect("serialize");
        assert_eq!(json, "\"BULLISH_CROSSOVER\"");

        let json = serde_json::to_string(&TradeSignal::StrongBuy).expect("serialize");
        assert_eq!(json, "\"STRONG_BUY\"");
    }

    #[test]
    fn neutral_snapshot_matches_degrade_contract() {
        let neutral = TechnicalSnapshot::neutral();
        assert_eq!(neutral.rsi, 50.0);
        assert_eq!(neutral.macd_signal, MacdSignal::Neutral);
        assert_eq!(neutral.ma_trend, MaTrend::Neutral);
        assert!(!neutral.volume_surge);
    }
}
