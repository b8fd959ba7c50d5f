//! Canonical domain types for the screening pipeline.
//!
//! All models are strongly typed and validated at construction:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated exchange ticker |
//! | [`UtcDateTime`] | RFC3339 UTC timestamp |
//! | [`Bar`] / [`PriceSeries`] | OHLCV history |
//! | [`CandidateStock`] | Universe entry before scoring |
//! | [`FundamentalSnapshot`] | Scraped valuation/profitability metrics |
//! | [`TechnicalSnapshot`] | Momentum/trend/volume features |
//! | [`OpportunityScore`] | Clamped component and composite scores |
//! | [`TradeSignal`] / [`SignalReport`] | Discrete signal with reasoning |
//! | [`Opportunity`] | One fully scored scan result |

mod models;
mod opportunity;
mod symbol;
mod timestamp;

pub use models::{Bar, CandidateStock, FundamentalSnapshot, PriceSeries};
pub use opportunity::{
    MaTrend, MacdSignal, Opportunity, OpportunityScore, SignalReport, TechnicalSnapshot,
    TradeSignal,
};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
