use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// OHLCV bar record for one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl Bar {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Chronologically ordered price series for a symbol. May be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, bars: Vec<Bar>) -> Self {
        Self { symbol, bars }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }
}

/// One entry of the screening universe before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStock {
    pub symbol: Symbol,
    pub company_name: String,
    pub sector: String,
}

impl CandidateStock {
    pub fn new(symbol: Symbol, company_name: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            symbol,
            company_name: company_name.into(),
            sector: sector.into(),
        }
    }
}

/// Per-symbol valuation and profitability metrics as scraped from the
/// fundamentals provider. Monetary fields are in crores of the listing
/// currency (1 crore = 10,000,000).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub symbol: Symbol,
    pub as_of: UtcDateTime,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub roe: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub roce: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub sales: Option<f64>,
    pub net_profit: Option<f64>,
    pub sector: Option<String>,
}

impl FundamentalSnapshot {
    pub fn new(symbol: Symbol, as_of: UtcDateTime) -> Self {
        Self {
            symbol,
            as_of,
            price: None,
            market_cap: None,
            pe_ratio: None,
            debt_to_equity: None,
            roe: None,
            revenue_growth: None,
            roce: None,
            dividend_yield: None,
            sales: None,
            net_profit: None,
            sector: None,
        }
    }

    /// Validity gate for scoring: `price` and `pe_ratio` must be present.
    /// Candidates failing this are excluded, never defaulted.
    pub fn is_scorable(&self) -> bool {
        matches!(self.price, Some(p) if p.is_finite())
            && matches!(self.pe_ratio, Some(pe) if pe.is_finite())
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> UtcDateTime {
        UtcDateTime::parse("2024-06-01T00:00:00Z").expect("timestamp")
    }

    #[test]
    fn rejects_inverted_bar_range() {
        let err = Bar::new(ts(), 100.0, 95.0, 105.0, 102.0, Some(1_000)).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidBarRange));
    }

    #[test]
    fn rejects_close_outside_range() {
        let err = Bar::new(ts(), 100.0, 105.0, 95.0, 110.0, Some(1_000)).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidBarBounds));
    }

    #[test]
    fn snapshot_scorable_requires_price_and_pe() {
        let symbol = Symbol::parse("INFY").expect("symbol");
        let mut snapshot = FundamentalSnapshot::new(symbol, ts());
        assert!(!snapshot.is_scorable());

        snapshot.price = Some(1500.0);
        assert!(!snapshot.is_scorable());

        snapshot.pe_ratio = Some(24.0);
        assert!(snapshot.is_scorable());

        snapshot.pe_ratio = Some(f64::NAN);
        assert!(!snapshot.is_scorable());
    }
}
