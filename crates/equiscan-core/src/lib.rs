//! Core engine for equiscan.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Provider traits, HTTP transport, and feed adapters
//! - Technical indicators and rule-based scoring
//! - The concurrent scan orchestrator and ranking cache
//! - The screening service facade

pub mod adapters;
pub mod cache;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod indicators;
pub mod provider;
pub mod ranking_cache;
pub mod scan;
pub mod scoring;
pub mod sectors;
pub mod service;
pub mod signal;
pub mod throttling;
pub mod universe;

pub use adapters::{FixtureMarketData, MarketFeedAdapter, MarketFeedConfig};
pub use cache::FundamentalsCache;
pub use domain::{
    Bar, CandidateStock, FundamentalSnapshot, MaTrend, MacdSignal, Opportunity, OpportunityScore,
    PriceSeries, SignalReport, Symbol, TechnicalSnapshot, TradeSignal, UtcDateTime,
};
pub use error::{CoreError, ProviderError, ProviderErrorKind, ScreeningError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
pub use provider::{
    FundamentalsProvider, HistoryRequest, PriceHistoryProvider, ProviderFuture, UniverseSource,
};
pub use ranking_cache::{RankingCache, RankingSnapshot};
pub use scan::{ScanConfig, ScanOrchestrator};
pub use scoring::{ScoreWeights, ScoringEngine};
pub use service::{
    OpportunityFilter, ScanStatus, ScanTrigger, Screener, DEFAULT_FRESHNESS,
};
pub use throttling::{PacingGate, RequestBudget};
pub use universe::{UniverseBuilder, UniverseConfig};
