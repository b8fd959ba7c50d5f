//! Programmable in-memory market data for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::provider::{
    FundamentalsProvider, HistoryRequest, PriceHistoryProvider, ProviderFuture, UniverseSource,
};
use crate::{CandidateStock, FundamentalSnapshot, PriceSeries, ProviderError, Symbol};

#[derive(Debug, Default)]
struct FixtureState {
    listing: Vec<CandidateStock>,
    listing_failure: Option<ProviderError>,
    fundamentals: HashMap<Symbol, Result<FundamentalSnapshot, ProviderError>>,
    series: HashMap<Symbol, Result<PriceSeries, ProviderError>>,
}

/// In-memory implementation of all three provider traits.
///
/// Every response is scripted per symbol, calls are counted, and an
/// in-flight gauge records the concurrency high-water mark so tests can
/// assert the orchestrator's fan-out bound.
#[derive(Debug, Default)]
pub struct FixtureMarketData {
    state: Mutex<FixtureState>,
    listing_calls: AtomicUsize,
    fundamentals_calls: AtomicUsize,
    history_calls: AtomicUsize,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
    call_delay: Duration,
}

impl FixtureMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every provider call, giving concurrent
    /// work units time to overlap so the gauge is meaningful.
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    pub fn set_listing(&self, listing: Vec<CandidateStock>) {
        self.lock().listing = listing;
    }

    pub fn fail_listing(&self, error: ProviderError) {
        self.lock().listing_failure = Some(error);
    }

    pub fn set_fundamentals(&self, snapshot: FundamentalSnapshot) {
        let symbol = snapshot.symbol.clone();
        self.lock().fundamentals.insert(symbol, Ok(snapshot));
    }

    pub fn fail_fundamentals(&self, symbol: Symbol, error: ProviderError) {
        self.lock().fundamentals.insert(symbol, Err(error));
    }

    pub fn set_series(&self, series: PriceSeries) {
        let symbol = series.symbol.clone();
        self.lock().series.insert(symbol, Ok(series));
    }

    pub fn fail_series(&self, symbol: Symbol, error: ProviderError) {
        self.lock().series.insert(symbol, Err(error));
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn fundamentals_calls(&self) -> usize {
        self.fundamentals_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Highest number of provider calls observed in flight at once.
    pub fn high_water_mark(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    async fn gauge<T>(&self, work: T) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        work
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FixtureState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl UniverseSource for FixtureMarketData {
    fn instruments<'a>(&'a self) -> ProviderFuture<'a, Vec<CandidateStock>> {
        Box::pin(async move {
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            let result = {
                let state = self.lock();
                match &state.listing_failure {
                    Some(error) => Err(error.clone()),
                    None => Ok(state.listing.clone()),
                }
            };
            self.gauge(result).await
        })
    }
}

impl FundamentalsProvider for FixtureMarketData {
    fn fundamentals<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, FundamentalSnapshot> {
        Box::pin(async move {
            self.fundamentals_calls.fetch_add(1, Ordering::SeqCst);
            let result = match self.lock().fundamentals.get(symbol) {
                Some(scripted) => scripted.clone(),
                None => Err(ProviderError::not_found(format!(
                    "no fixture fundamentals for {symbol}"
                ))),
            };
            self.gauge(result).await
        })
    }
}

impl PriceHistoryProvider for FixtureMarketData {
    fn price_history<'a>(&'a self, request: HistoryRequest) -> ProviderFuture<'a, PriceSeries> {
        Box::pin(async move {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            let result = match self.lock().series.get(&request.symbol) {
                Some(scripted) => scripted.clone(),
                None => Ok(PriceSeries::empty(request.symbol)),
            };
            self.gauge(result).await
        })
    }
}
