//! Concurrent screening of a candidate universe.
//!
//! Fan-out is bounded by a semaphore; every fundamentals call is routed
//! through one shared [`PacingGate`] so the scraper sees serialized
//! request timing no matter how many work units run. Failures are
//! per-candidate: a candidate that cannot be screened is logged and
//! dropped, never aborting the scan.

use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::indicators::compute_indicators;
use crate::provider::{FundamentalsProvider, HistoryRequest, PriceHistoryProvider};
use crate::scoring::ScoringEngine;
use crate::signal::generate_signal;
use crate::throttling::PacingGate;
use crate::{sectors, CandidateStock, Opportunity, ScreeningError, TechnicalSnapshot};

/// Concurrency and window tunables for one orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Work units in flight at once.
    pub max_concurrency: usize,
    /// Calendar days of price history fetched per candidate.
    pub history_days: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            history_days: 100,
        }
    }
}

/// Screens candidates into ranked opportunities.
#[derive(Clone)]
pub struct ScanOrchestrator {
    fundamentals: Arc<dyn FundamentalsProvider>,
    history: Arc<dyn PriceHistoryProvider>,
    pacing: PacingGate,
    engine: ScoringEngine,
    semaphore: Arc<Semaphore>,
    history_days: u64,
}

impl ScanOrchestrator {
    pub fn new(
        fundamentals: Arc<dyn FundamentalsProvider>,
        history: Arc<dyn PriceHistoryProvider>,
        pacing: PacingGate,
        engine: ScoringEngine,
        config: ScanConfig,
    ) -> Self {
        Self {
            fundamentals,
            history,
            pacing,
            engine,
            semaphore: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            history_days: config.history_days.max(1),
        }
    }

    /// Screen every candidate and return the survivors ranked by overall
    /// score, highest first. Ties keep candidate order (the sort is
    /// stable), so repeated scans over identical data rank identically.
    pub async fn scan(&self, candidates: Vec<CandidateStock>) -> Vec<Opportunity> {
        let total = candidates.len();
        info!(candidates = total, "scan started");

        let mut handles = Vec::with_capacity(total);
        for candidate in candidates {
            let orchestrator = self.clone();
            let semaphore = Arc::clone(&self.semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return Err(ScreeningError::Internal {
                            symbol: candidate.symbol.to_string(),
                            message: String::from("concurrency gate closed"),
                        })
                    }
                };
                orchestrator.screen(&candidate).await
            }));
        }

        let mut opportunities = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(Ok(opportunity)) => opportunities.push(opportunity),
                Ok(Err(error)) => {
                    debug!(symbol = error.symbol(), %error, "candidate excluded");
                }
                Err(join_error) => {
                    warn!(%join_error, "screening task failed");
                }
            }
        }

        opportunities.sort_by(|a, b| {
            b.score
                .overall
                .partial_cmp(&a.score.overall)
                .unwrap_or(Ordering::Equal)
        });

        info!(
            screened = total,
            ranked = opportunities.len(),
            "scan finished"
        );
        opportunities
    }

    /// Screen a single candidate. Fundamentals failures exclude the
    /// candidate; price-history failures degrade to neutral technicals.
    pub async fn screen(&self, candidate: &CandidateStock) -> Result<Opportunity, ScreeningError> {
        self.pacing.pace().await;
        let fundamental = self
            .fundamentals
            .fundamentals(&candidate.symbol)
            .await
            .map_err(|source| ScreeningError::ProviderUnavailable {
                symbol: candidate.symbol.to_string(),
                source,
            })?;

        if !fundamental.is_scorable() {
            return Err(ScreeningError::InvalidFundamentals {
                symbol: candidate.symbol.to_string(),
            });
        }
        let current_price = fundamental.price.unwrap_or_default();

        let request = HistoryRequest::trailing_days(candidate.symbol.clone(), self.history_days);
        let technical = match self.history.price_history(request).await {
            Ok(series) => compute_indicators(&series),
            Err(error) => {
                warn!(symbol = %candidate.symbol, %error, "history fetch failed, using neutral technicals");
                TechnicalSnapshot::neutral()
            }
        };

        let score = self.engine.score(&technical, &fundamental);
        let report = generate_signal(&technical, &fundamental, score.overall, current_price);

        let sector = fundamental
            .sector
            .clone()
            .filter(|sector| !sector.trim().is_empty())
            .or_else(|| {
                (!candidate.sector.trim().is_empty()).then(|| candidate.sector.clone())
            })
            .unwrap_or_else(|| sectors::classify(candidate.symbol.as_str()).to_owned());

        Ok(Opportunity {
            symbol: candidate.symbol.clone(),
            company_name: candidate.company_name.clone(),
            current_price,
            market_cap: fundamental.market_cap,
            sector,
            technical,
            fundamental,
            score,
            signal: report.signal,
            confidence: report.confidence,
            buy_reasons: report.buy_reasons,
            risk_factors: report.risk_factors,
            target_price: report.target_price,
            stop_loss: report.stop_loss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderFuture;
    use crate::{
        Bar, FundamentalSnapshot, PriceSeries, ProviderError, Symbol, TradeSignal, UtcDateTime,
    };

    struct StubProvider {
        pe_by_symbol: fn(&str) -> Option<f64>,
        history_fails: bool,
    }

    impl FundamentalsProvider for StubProvider {
        fn fundamentals<'a>(
            &'a self,
            symbol: &'a Symbol,
        ) -> ProviderFuture<'a, FundamentalSnapshot> {
            Box::pin(async move {
                if symbol.as_str() == "MISSING" {
                    return Err(ProviderError::not_found("no record"));
                }
                let mut snapshot =
                    FundamentalSnapshot::new(symbol.clone(), UtcDateTime::now());
                snapshot.price = Some(100.0);
                snapshot.pe_ratio = (self.pe_by_symbol)(symbol.as_str());
                snapshot.roe = Some(22.0);
                snapshot.debt_to_equity = Some(0.2);
                snapshot.revenue_growth = Some(25.0);
                Ok(snapshot)
            })
        }
    }

    impl PriceHistoryProvider for StubProvider {
        fn price_history<'a>(&'a self, request: HistoryRequest) -> ProviderFuture<'a, PriceSeries> {
            Box::pin(async move {
                if self.history_fails {
                    return Err(ProviderError::unavailable("feed down"));
                }
                let ts = UtcDateTime::now();
                let bars = (0..60)
                    .map(|i| {
                        let close = 100.0 + i as f64;
                        Bar::new(ts, close, close + 1.0, close - 1.0, close, Some(1_000))
                            .expect("bar")
                    })
                    .collect();
                Ok(PriceSeries::new(request.symbol, bars))
            })
        }
    }

    fn orchestrator(provider: Arc<StubProvider>) -> ScanOrchestrator {
        ScanOrchestrator::new(
            provider.clone(),
            provider,
            PacingGate::unpaced(),
            ScoringEngine::default(),
            ScanConfig::default(),
        )
    }

    fn candidate(ticker: &str) -> CandidateStock {
        CandidateStock::new(Symbol::parse(ticker).expect("symbol"), ticker, "Technology")
    }

    #[tokio::test]
    async fn scan_ranks_by_overall_descending() {
        let provider = Arc::new(StubProvider {
            // WEAK gets an overvalued P/E, the rest a healthy one.
            pe_by_symbol: |symbol| Some(if symbol == "WEAK" { 40.0 } else { 15.0 }),
            history_fails: false,
        });
        let orchestrator = orchestrator(provider);

        let ranked = orchestrator
            .scan(vec![candidate("WEAK"), candidate("STRONGONE")])
            .await;
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].symbol.as_str(), "STRONGONE");
        assert!(ranked[0].score.overall > ranked[1].score.overall);
    }

    #[tokio::test]
    async fn unreachable_fundamentals_exclude_the_candidate_only() {
        let provider = Arc::new(StubProvider {
            pe_by_symbol: |_| Some(15.0),
            history_fails: false,
        });
        let orchestrator = orchestrator(provider);

        let ranked = orchestrator
            .scan(vec![candidate("MISSING"), candidate("HEALTHY")])
            .await;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].symbol.as_str(), "HEALTHY");
    }

    #[tokio::test]
    async fn unscorable_fundamentals_are_invalid() {
        let provider = Arc::new(StubProvider {
            pe_by_symbol: |_| None,
            history_fails: false,
        });
        let orchestrator = orchestrator(provider);

        let err = orchestrator
            .screen(&candidate("NOPE"))
            .await
            .expect_err("missing pe must exclude");
        assert!(matches!(err, ScreeningError::InvalidFundamentals { .. }));
    }

    #[tokio::test]
    async fn history_failure_degrades_to_neutral_technicals() {
        let provider = Arc::new(StubProvider {
            pe_by_symbol: |_| Some(15.0),
            history_fails: true,
        });
        let orchestrator = orchestrator(provider);

        let opportunity = orchestrator
            .screen(&candidate("INFY"))
            .await
            .expect("screens despite history failure");
        assert_eq!(opportunity.technical, TechnicalSnapshot::neutral());
        // Strong fundamentals alone still produce a buy-side signal.
        assert!(matches!(
            opportunity.signal,
            TradeSignal::Buy | TradeSignal::StrongBuy | TradeSignal::Hold
        ));
    }

    #[tokio::test]
    async fn screen_assembles_reasoning_and_levels() {
        let provider = Arc::new(StubProvider {
            pe_by_symbol: |_| Some(12.0),
            history_fails: false,
        });
        let orchestrator = orchestrator(provider);

        let opportunity = orchestrator
            .screen(&candidate("INFY"))
            .await
            .expect("screens");
        assert_eq!(opportunity.current_price, 100.0);
        assert!(!opportunity.buy_reasons.is_empty());
        if opportunity.signal.is_buy() {
            assert!((opportunity.target_price - 115.0).abs() < 1e-9);
            assert!((opportunity.stop_loss - 92.0).abs() < 1e-9);
        }
        assert_eq!(opportunity.sector, "Technology");
    }
}
