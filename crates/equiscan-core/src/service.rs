//! Screening service facade: scan lifecycle, queries, on-demand analysis.
//!
//! One [`Screener`] owns the universe builder, the orchestrator, and the
//! ranking cache. Scans run in the background; queries always answer
//! immediately from the latest completed ranking.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::ranking_cache::RankingCache;
use crate::scan::ScanOrchestrator;
use crate::universe::UniverseBuilder;
use crate::{
    sectors, CandidateStock, Opportunity, ScreeningError, Symbol, TradeSignal, ValidationError,
};

/// Default reuse window for a completed ranking.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(300);

/// Outcome of a scan trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanTrigger {
    /// A new background scan was started.
    Started { scan_id: Uuid },
    /// Another scan already holds the latch.
    InProgress,
    /// The cached ranking is still fresh and was reused.
    UsingCache { age_seconds: u64 },
}

/// Query filter applied over the cached ranking, preserving rank order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpportunityFilter {
    pub signal: Option<TradeSignal>,
    pub min_score: Option<f64>,
    pub sector: Option<String>,
    pub limit: Option<usize>,
}

/// Snapshot of the service state for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStatus {
    pub scan_in_progress: bool,
    pub last_scan_age_seconds: Option<u64>,
    pub cached_opportunities: usize,
    pub freshness_window_seconds: u64,
}

/// The equity-screening service.
#[derive(Clone)]
pub struct Screener {
    universe: Arc<UniverseBuilder>,
    orchestrator: ScanOrchestrator,
    cache: Arc<RankingCache>,
    freshness: Duration,
}

impl Screener {
    pub fn new(
        universe: UniverseBuilder,
        orchestrator: ScanOrchestrator,
        freshness: Duration,
    ) -> Self {
        Self {
            universe: Arc::new(universe),
            orchestrator,
            cache: Arc::new(RankingCache::new()),
            freshness,
        }
    }

    /// Trigger a scan over at most `max_stocks` candidates.
    ///
    /// Reuses a fresh cached ranking unless `force_refresh` is set, and
    /// refuses to start while another scan is in flight. The scan itself
    /// runs in a background task; this returns immediately.
    pub fn start_scan(
        &self,
        max_stocks: usize,
        force_refresh: bool,
    ) -> Result<ScanTrigger, ValidationError> {
        if max_stocks == 0 {
            return Err(ValidationError::EmptyUniverseBound);
        }

        let snapshot = self.cache.snapshot();
        if snapshot.scan_in_progress {
            return Ok(ScanTrigger::InProgress);
        }
        if !force_refresh && snapshot.is_fresh(self.freshness) {
            let age_seconds = snapshot.age.map(|age| age.as_secs()).unwrap_or_default();
            info!(age_seconds, "reusing cached ranking");
            return Ok(ScanTrigger::UsingCache { age_seconds });
        }

        if !self.cache.try_begin_scan() {
            return Ok(ScanTrigger::InProgress);
        }

        let scan_id = Uuid::new_v4();
        info!(%scan_id, max_stocks, force_refresh, "scan scheduled");

        let service = self.clone();
        let cache = Arc::clone(&self.cache);
        let worker = tokio::spawn(async move { service.run_scan(scan_id, max_stocks).await });
        // The latch must open again even if the worker panics.
        tokio::spawn(async move {
            if let Err(join_error) = worker.await {
                error!(%scan_id, %join_error, "scan task failed");
                cache.abort_scan();
            }
        });

        Ok(ScanTrigger::Started { scan_id })
    }

    async fn run_scan(&self, scan_id: Uuid, max_stocks: usize) {
        let candidates = match self.universe.build(max_stocks).await {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(%scan_id, %error, "universe build failed, scan aborted");
                self.cache.abort_scan();
                return;
            }
        };

        let ranked = self.orchestrator.scan(candidates).await;
        info!(%scan_id, ranked = ranked.len(), "scan complete");
        self.cache.complete_scan(ranked);
    }

    /// Cached ranking, filtered. Order is the scan's rank order.
    pub fn opportunities(&self, filter: &OpportunityFilter) -> Vec<Opportunity> {
        let snapshot = self.cache.snapshot();
        let filtered = snapshot
            .opportunities
            .into_iter()
            .filter(|opportunity| {
                filter
                    .signal
                    .map_or(true, |signal| opportunity.signal == signal)
            })
            .filter(|opportunity| {
                filter
                    .min_score
                    .map_or(true, |min| opportunity.score.overall >= min)
            })
            .filter(|opportunity| {
                filter.sector.as_deref().map_or(true, |sector| {
                    opportunity
                        .sector
                        .to_ascii_lowercase()
                        .contains(&sector.to_ascii_lowercase())
                })
            });
        match filter.limit {
            Some(limit) => filtered.take(limit).collect(),
            None => filtered.collect(),
        }
    }

    /// The `count` highest-ranked cached opportunities.
    pub fn top(&self, count: usize) -> Vec<Opportunity> {
        self.opportunities(&OpportunityFilter {
            limit: Some(count),
            ..OpportunityFilter::default()
        })
    }

    /// Screen one symbol on demand, bypassing the cached ranking. The
    /// cached entry, if any, supplies the company name.
    pub async fn analyze(&self, symbol: &Symbol) -> Result<Opportunity, ScreeningError> {
        let cached = self
            .cache
            .snapshot()
            .opportunities
            .into_iter()
            .find(|opportunity| opportunity.symbol == *symbol);

        let candidate = match cached {
            Some(opportunity) => CandidateStock::new(
                symbol.clone(),
                opportunity.company_name,
                opportunity.sector,
            ),
            None => CandidateStock::new(
                symbol.clone(),
                symbol.as_str(),
                sectors::classify(symbol.as_str()),
            ),
        };
        self.orchestrator.screen(&candidate).await
    }

    pub fn status(&self) -> ScanStatus {
        let snapshot = self.cache.snapshot();
        ScanStatus {
            scan_in_progress: snapshot.scan_in_progress,
            last_scan_age_seconds: snapshot.age.map(|age| age.as_secs()),
            cached_opportunities: snapshot.opportunities.len(),
            freshness_window_seconds: self.freshness.as_secs(),
        }
    }

    /// Count of cached opportunities per signal. Every signal appears,
    /// zero or not, so distributions compare across scans.
    pub fn signal_distribution(&self) -> BTreeMap<TradeSignal, usize> {
        let mut distribution: BTreeMap<TradeSignal, usize> =
            TradeSignal::ALL.iter().map(|signal| (*signal, 0)).collect();
        for opportunity in self.cache.snapshot().opportunities {
            if let Some(count) = distribution.get_mut(&opportunity.signal) {
                *count += 1;
            }
        }
        distribution
    }

    #[doc(hidden)]
    pub fn cache(&self) -> &RankingCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{
        FundamentalsProvider, HistoryRequest, PriceHistoryProvider, ProviderFuture, UniverseSource,
    };
    use crate::scan::ScanConfig;
    use crate::scoring::ScoringEngine;
    use crate::throttling::PacingGate;
    use crate::universe::UniverseConfig;
    use crate::{Bar, FundamentalSnapshot, PriceSeries, ProviderError, UtcDateTime};

    struct StubMarket;

    impl UniverseSource for StubMarket {
        fn instruments<'a>(&'a self) -> ProviderFuture<'a, Vec<CandidateStock>> {
            Box::pin(async {
                Ok(vec![
                    CandidateStock::new(
                        Symbol::parse("INFY").expect("symbol"),
                        "Infosys Ltd",
                        "Technology",
                    ),
                    CandidateStock::new(
                        Symbol::parse("CIPLA").expect("symbol"),
                        "Cipla Ltd",
                        "Healthcare",
                    ),
                ])
            })
        }
    }

    impl FundamentalsProvider for StubMarket {
        fn fundamentals<'a>(
            &'a self,
            symbol: &'a Symbol,
        ) -> ProviderFuture<'a, FundamentalSnapshot> {
            Box::pin(async move {
                if symbol.as_str() == "DOWN" {
                    return Err(ProviderError::unavailable("offline"));
                }
                let mut snapshot = FundamentalSnapshot::new(symbol.clone(), UtcDateTime::now());
                snapshot.price = Some(250.0);
                snapshot.market_cap = Some(10_000.0);
                snapshot.pe_ratio = Some(15.0);
                Ok(snapshot)
            })
        }
    }

    impl PriceHistoryProvider for StubMarket {
        fn price_history<'a>(&'a self, request: HistoryRequest) -> ProviderFuture<'a, PriceSeries> {
            Box::pin(async move {
                let ts = UtcDateTime::now();
                let bars = (0..60)
                    .map(|i| {
                        let close = 200.0 + i as f64;
                        Bar::new(ts, close, close + 1.0, close - 1.0, close, Some(1_000))
                            .expect("bar")
                    })
                    .collect();
                Ok(PriceSeries::new(request.symbol, bars))
            })
        }
    }

    fn screener() -> Screener {
        let market = Arc::new(StubMarket);
        let universe = UniverseBuilder::new(
            market.clone(),
            market.clone(),
            market.clone(),
            PacingGate::unpaced(),
            UniverseConfig::default(),
        );
        let orchestrator = ScanOrchestrator::new(
            market.clone(),
            market,
            PacingGate::unpaced(),
            ScoringEngine::default(),
            ScanConfig::default(),
        );
        Screener::new(universe, orchestrator, DEFAULT_FRESHNESS)
    }

    async fn wait_for_scan(screener: &Screener) {
        for _ in 0..200 {
            if !screener.status().scan_in_progress {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("scan did not finish");
    }

    #[tokio::test]
    async fn scan_populates_cache_and_reuses_it() {
        let screener = screener();
        let trigger = screener.start_scan(10, false).expect("valid request");
        assert!(matches!(trigger, ScanTrigger::Started { .. }));
        wait_for_scan(&screener).await;

        let status = screener.status();
        assert_eq!(status.cached_opportunities, 2);

        let trigger = screener.start_scan(10, false).expect("valid request");
        assert!(matches!(trigger, ScanTrigger::UsingCache { .. }));
    }

    #[tokio::test]
    async fn force_refresh_bypasses_freshness() {
        let screener = screener();
        screener.start_scan(10, false).expect("valid request");
        wait_for_scan(&screener).await;

        let trigger = screener.start_scan(10, true).expect("valid request");
        assert!(matches!(trigger, ScanTrigger::Started { .. }));
        wait_for_scan(&screener).await;
    }

    #[tokio::test]
    async fn concurrent_trigger_reports_in_progress() {
        let screener = screener();
        assert!(screener.cache().try_begin_scan());
        let trigger = screener.start_scan(10, true).expect("valid request");
        assert_eq!(trigger, ScanTrigger::InProgress);
        screener.cache().abort_scan();
    }

    #[tokio::test]
    async fn zero_max_stocks_is_rejected() {
        let screener = screener();
        let err = screener.start_scan(0, false).expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyUniverseBound));
    }

    #[tokio::test]
    async fn filters_apply_over_the_cached_ranking() {
        let screener = screener();
        screener.start_scan(10, false).expect("valid request");
        wait_for_scan(&screener).await;

        let tech = screener.opportunities(&OpportunityFilter {
            sector: Some(String::from("technology")),
            ..OpportunityFilter::default()
        });
        assert_eq!(tech.len(), 1);
        assert_eq!(tech[0].symbol.as_str(), "INFY");

        let none = screener.opportunities(&OpportunityFilter {
            min_score: Some(101.0),
            ..OpportunityFilter::default()
        });
        assert!(none.is_empty());

        let top = screener.top(1);
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn signal_distribution_lists_every_signal() {
        let screener = screener();
        screener.start_scan(10, false).expect("valid request");
        wait_for_scan(&screener).await;

        let distribution = screener.signal_distribution();
        assert_eq!(distribution.len(), TradeSignal::ALL.len());
        let total: usize = distribution.values().sum();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn analyze_screens_on_demand() {
        let screener = screener();
        let symbol = Symbol::parse("WIPRO").expect("symbol");
        let opportunity = screener.analyze(&symbol).await.expect("screens");
        assert_eq!(opportunity.symbol, symbol);
        assert_eq!(opportunity.sector, "Technology");
    }
}
