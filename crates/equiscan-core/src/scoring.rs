//! Rule-based opportunity scoring.
//!
//! Fully deterministic: no learned model, no randomness. Component
//! scores start at a base of 50 and take additive adjustments, are
//! clamped to [0, 100] *before* combining, and only then averaged so
//! that each component stays independently meaningful in the reasoning
//! trail.

use serde::{Deserialize, Serialize};

use crate::{FundamentalSnapshot, OpportunityScore, TechnicalSnapshot, ValidationError};

const BASE_SCORE: f64 = 50.0;

/// Relative weight of the two component scores in the overall score.
///
/// The default is the unweighted mean. Earlier revisions of the scoring
/// rules weighted fundamentals 0.6/0.4; that combination remains
/// expressible here but is not the default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub technical: f64,
    pub fundamental: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            technical: 0.5,
            fundamental: 0.5,
        }
    }
}

impl ScoreWeights {
    pub fn new(technical: f64, fundamental: f64) -> Result<Self, ValidationError> {
        let sum = technical + fundamental;
        let valid = technical.is_finite()
            && fundamental.is_finite()
            && technical > 0.0
            && fundamental > 0.0
            && sum > 0.0;
        if !valid {
            return Err(ValidationError::InvalidScoreWeights);
        }
        Ok(Self {
            technical,
            fundamental,
        })
    }

    fn combine(self, technical: f64, fundamental: f64) -> f64 {
        (technical * self.technical + fundamental * self.fundamental)
            / (self.technical + self.fundamental)
    }
}

/// Deterministic scorer over the two feature sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    weights: ScoreWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn score(
        &self,
        technical: &TechnicalSnapshot,
        fundamental: &FundamentalSnapshot,
    ) -> OpportunityScore {
        let technical_score = clamp(technical_score(technical));
        let fundamental_score = clamp(fundamental_score(fundamental));
        let overall = clamp(self.weights.combine(technical_score, fundamental_score));

        OpportunityScore {
            technical: technical_score,
            fundamental: fundamental_score,
            overall,
        }
    }
}

fn technical_score(snapshot: &TechnicalSnapshot) -> f64 {
    let mut score = BASE_SCORE;

    // RSI: healthy band rewards most, oversold still rewards a
    // potential reversal, overbought penalizes.
    if (30.0..=70.0).contains(&snapshot.rsi) {
        score += 20.0;
    } else if snapshot.rsi < 30.0 {
        score += 15.0;
    } else if snapshot.rsi > 70.0 {
        score -= 15.0;
    }

    if snapshot.macd_signal.is_bullish() {
        score += 15.0;
    } else if snapshot.macd_signal.is_bearish() {
        score -= 15.0;
    }

    if snapshot.ma_trend.is_up() {
        score += 15.0;
    } else if snapshot.ma_trend.is_down() {
        score -= 15.0;
    }

    if snapshot.volume_surge {
        score += 10.0;
    }

    score
}

fn fundamental_score(snapshot: &FundamentalSnapshot) -> f64 {
    let mut score = BASE_SCORE;

    if let Some(pe) = snapshot.pe_ratio {
        if (10.0..=20.0).contains(&pe) {
            score += 20.0;
        } else if pe < 10.0 {
            score += 15.0;
        } else if pe > 30.0 {
            score -= 15.0;
        }
    }

    if let Some(roe) = snapshot.roe {
        if roe > 20.0 {
            score += 20.0;
        } else if roe > 15.0 {
            score += 10.0;
        } else if roe < 10.0 {
            score -= 10.0;
        }
    }

    if let Some(de) = snapshot.debt_to_equity {
        if de < 0.3 {
            score += 15.0;
        } else if de > 1.0 {
            score -= 15.0;
        }
    }

    if let Some(growth) = snapshot.revenue_growth {
        if growth > 20.0 {
            score += 15.0;
        } else if growth > 10.0 {
            score += 10.0;
        } else if growth < 5.0 {
            score -= 10.0;
        }
    }

    score
}

fn clamp(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
