//! HTTP JSON adapter for a live market-data feed.
//!
//! Implements all three provider traits against a single base URL:
//!
//! - `GET /instruments` for the exchange listing
//! - `GET /fundamentals?symbol=X` for per-symbol metrics
//! - `GET /history?symbol=X&from=..&to=..` for OHLCV bars
//!
//! Fundamentals pass through a TTL cache and a request budget; the feed
//! is scraped upstream and throttles aggressively.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::cache::FundamentalsCache;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::provider::{
    FundamentalsProvider, HistoryRequest, PriceHistoryProvider, ProviderFuture, UniverseSource,
};
use crate::throttling::RequestBudget;
use crate::{
    Bar, CandidateStock, FundamentalSnapshot, PriceSeries, ProviderError, Symbol, UtcDateTime,
};

/// Connection settings for one feed.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketFeedConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Requests allowed per quota window.
    pub quota_limit: u32,
    pub quota_window: Duration,
    pub cache_ttl: Duration,
}

impl Default for MarketFeedConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8000"),
            timeout_ms: 5_000,
            quota_limit: 60,
            quota_window: Duration::from_secs(60),
            cache_ttl: Duration::from_secs(3_600),
        }
    }
}

/// Feed-backed implementation of the provider traits.
pub struct MarketFeedAdapter {
    client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
    budget: RequestBudget,
    cache: FundamentalsCache,
}

#[derive(Debug, Deserialize)]
struct InstrumentPayload {
    symbol: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sector: String,
}

#[derive(Debug, Deserialize)]
struct FundamentalsPayload {
    symbol: String,
    as_of: UtcDateTime,
    price: Option<f64>,
    market_cap: Option<f64>,
    pe_ratio: Option<f64>,
    debt_to_equity: Option<f64>,
    roe: Option<f64>,
    revenue_growth: Option<f64>,
    roce: Option<f64>,
    dividend_yield: Option<f64>,
    sales: Option<f64>,
    net_profit: Option<f64>,
    sector: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BarPayload {
    ts: UtcDateTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<u64>,
}

impl MarketFeedAdapter {
    pub fn new(client: Arc<dyn HttpClient>, config: MarketFeedConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            timeout_ms: config.timeout_ms,
            budget: RequestBudget::new(config.quota_window, config.quota_limit),
            cache: FundamentalsCache::new(config.cache_ttl),
        }
    }

    async fn get(&self, url: String) -> Result<HttpResponse, ProviderError> {
        // Re-check after every backoff; proceeding without a cell would
        // let concurrent callers stampede the feed once the first delay
        // elapses.
        while let Err(delay) = self.budget.try_acquire() {
            debug!(?delay, "request budget exhausted, backing off");
            tokio::time::sleep(delay).await;
        }

        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ProviderError::unavailable(e.message().to_owned()))?;

        match response.status {
            404 => Err(ProviderError::not_found("feed returned 404")),
            429 => Err(ProviderError::rate_limited("feed returned 429")),
            _ if !response.is_success() => Err(ProviderError::unavailable(format!(
                "feed returned status {}",
                response.status
            ))),
            _ => Ok(response),
        }
    }
}

impl UniverseSource for MarketFeedAdapter {
    fn instruments<'a>(&'a self) -> ProviderFuture<'a, Vec<CandidateStock>> {
        Box::pin(async move {
            let response = self.get(format!("{}/instruments", self.base_url)).await?;
            let payload: Vec<InstrumentPayload> = serde_json::from_str(&response.body)
                .map_err(|e| ProviderError::invalid_response(format!("bad listing: {e}")))?;

            let mut listing = Vec::with_capacity(payload.len());
            for instrument in payload {
                match Symbol::parse(&instrument.symbol) {
                    Ok(symbol) => {
                        let name = if instrument.name.is_empty() {
                            symbol.as_str().to_owned()
                        } else {
                            instrument.name
                        };
                        listing.push(CandidateStock::new(symbol, name, instrument.sector));
                    }
                    Err(error) => {
                        debug!(symbol = instrument.symbol, %error, "skipping unparseable listing entry");
                    }
                }
            }
            Ok(listing)
        })
    }
}

impl FundamentalsProvider for MarketFeedAdapter {
    fn fundamentals<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, FundamentalSnapshot> {
        Box::pin(async move {
            if let Some(cached) = self.cache.get(symbol).await {
                return Ok(cached);
            }

            let url = format!(
                "{}/fundamentals?symbol={}",
                self.base_url,
                urlencoding::encode(symbol.as_str())
            );
            let response = self.get(url).await?;
            let payload: FundamentalsPayload = serde_json::from_str(&response.body)
                .map_err(|e| ProviderError::invalid_response(format!("bad fundamentals: {e}")))?;

            let parsed_symbol = Symbol::parse(&payload.symbol)
                .map_err(|e| ProviderError::invalid_response(format!("bad symbol in payload: {e}")))?;
            if parsed_symbol != *symbol {
                return Err(ProviderError::invalid_response(format!(
                    "payload symbol {parsed_symbol} does not match requested {symbol}"
                )));
            }

            let mut snapshot = FundamentalSnapshot::new(parsed_symbol, payload.as_of);
            snapshot.price = payload.price;
            snapshot.market_cap = payload.market_cap;
            snapshot.pe_ratio = payload.pe_ratio;
            snapshot.debt_to_equity = payload.debt_to_equity;
            snapshot.roe = payload.roe;
            snapshot.revenue_growth = payload.revenue_growth;
            snapshot.roce = payload.roce;
            snapshot.dividend_yield = payload.dividend_yield;
            snapshot.sales = payload.sales;
            snapshot.net_profit = payload.net_profit;
            snapshot.sector = payload.sector;

            self.cache.put(snapshot.clone(), None).await;
            Ok(snapshot)
        })
    }
}

impl PriceHistoryProvider for MarketFeedAdapter {
    fn price_history<'a>(&'a self, request: HistoryRequest) -> ProviderFuture<'a, PriceSeries> {
        Box::pin(async move {
            let url = format!(
                "{}/history?symbol={}&from={}&to={}",
                self.base_url,
                urlencoding::encode(request.symbol.as_str()),
                urlencoding::encode(&request.start.format_rfc3339()),
                urlencoding::encode(&request.end.format_rfc3339()),
            );
            let response = self.get(url).await?;
            let payload: Vec<BarPayload> = serde_json::from_str(&response.body)
                .map_err(|e| ProviderError::invalid_response(format!("bad history: {e}")))?;

            let mut bars = Vec::with_capacity(payload.len());
            for bar in payload {
                let validated =
                    Bar::new(bar.ts, bar.open, bar.high, bar.low, bar.close, bar.volume).map_err(
                        |e| ProviderError::invalid_response(format!("bad bar: {e}")),
                    )?;
                bars.push(validated);
            }
            Ok(PriceSeries::new(request.symbol, bars))
        })
    }
}
