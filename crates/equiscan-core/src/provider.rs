//! Data provider traits and request types.
//!
//! The pipeline consumes three external collaborators, each behind its
//! own trait so tests and offline runs can substitute fakes:
//!
//! | Trait | Supplies |
//! |-------|----------|
//! | [`UniverseSource`] | The full exchange listing |
//! | [`FundamentalsProvider`] | Per-symbol valuation metrics |
//! | [`PriceHistoryProvider`] | OHLCV history over a date range |
//!
//! Implementations must be `Send + Sync`; the orchestrator shares them
//! across concurrent work units.

use std::future::Future;
use std::pin::Pin;

use crate::{
    CandidateStock, FundamentalSnapshot, PriceSeries, ProviderError, Symbol, UtcDateTime,
    ValidationError,
};

/// Boxed future alias used by all provider trait methods.
pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Validated date range for a price-history fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub start: UtcDateTime,
    pub end: UtcDateTime,
}

impl HistoryRequest {
    pub fn new(
        symbol: Symbol,
        start: UtcDateTime,
        end: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidHistoryRange);
        }
        Ok(Self { symbol, start, end })
    }

    /// Window ending now and spanning `days` calendar days back.
    pub fn trailing_days(symbol: Symbol, days: u64) -> Self {
        let end = UtcDateTime::now();
        let start = end.minus(std::time::Duration::from_secs(days.max(1) * 86_400));
        Self { symbol, start, end }
    }
}

/// Supplies the exchange universe listing.
pub trait UniverseSource: Send + Sync {
    fn instruments<'a>(&'a self) -> ProviderFuture<'a, Vec<CandidateStock>>;
}

/// Supplies per-symbol fundamentals.
///
/// Implementations should be idempotent-cacheable: repeated calls for
/// the same symbol within a scan may be served from a provider-side
/// cache. Missing `price`/`pe_ratio` is reported in the snapshot, not
/// as an error; callers apply the validity gate.
pub trait FundamentalsProvider: Send + Sync {
    fn fundamentals<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, FundamentalSnapshot>;
}

/// Supplies OHLCV history. The returned series may be empty.
pub trait PriceHistoryProvider: Send + Sync {
    fn price_history<'a>(&'a self, request: HistoryRequest) -> ProviderFuture<'a, PriceSeries>;
}
