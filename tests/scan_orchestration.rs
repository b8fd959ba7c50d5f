// Scan lifecycle: bounded fan-out, ranking, caching, mutual exclusion.

use std::time::Duration;

use equiscan_core::{OpportunityFilter, ScanTrigger};
use equiscan_tests::*;

#[tokio::test]
async fn fan_out_never_exceeds_the_concurrency_bound() {
    let tickers: Vec<String> = (0..20).map(|i| format!("SYM{}", suffix(i))).collect();
    let refs: Vec<&str> = tickers.iter().map(String::as_str).collect();

    let market = slow_healthy_market(&refs, Duration::from_millis(20));

    let candidates: Vec<_> = refs
        .iter()
        .map(|ticker| candidate(ticker, "Technology"))
        .collect();
    let ranked = orchestrator(market.clone()).scan(candidates).await;

    assert_eq!(ranked.len(), 20);
    assert!(
        market.high_water_mark() <= 5,
        "no more than five work units in flight, saw {}",
        market.high_water_mark()
    );
}

#[tokio::test]
async fn ranking_is_sorted_by_overall_score_descending() {
    let market = healthy_market(&["STRONG", "MIDDLING", "WEAK"]);

    let mut middling = healthy_fundamentals("MIDDLING");
    middling.roe = Some(12.0);
    middling.revenue_growth = Some(7.0);
    market.set_fundamentals(middling);

    let mut weak = healthy_fundamentals("WEAK");
    weak.pe_ratio = Some(40.0);
    weak.roe = Some(5.0);
    weak.debt_to_equity = Some(1.8);
    weak.revenue_growth = Some(1.0);
    market.set_fundamentals(weak);
    market.set_series(declining_series("WEAK"));

    let ranked = orchestrator(market)
        .scan(vec![
            candidate("WEAK", "Technology"),
            candidate("MIDDLING", "Technology"),
            candidate("STRONG", "Technology"),
        ])
        .await;

    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].symbol.as_str(), "STRONG");
    assert_eq!(ranked[2].symbol.as_str(), "WEAK");
    assert!(ranked[0].score.overall >= ranked[1].score.overall);
    assert!(ranked[1].score.overall >= ranked[2].score.overall);
}

#[tokio::test]
async fn fresh_ranking_is_reused_until_forced() {
    let market = healthy_market(&["INFY", "TCS"]);
    let screener = screener(market);

    let first = screener.start_scan(10, false).expect("valid");
    assert!(matches!(first, ScanTrigger::Started { .. }));
    wait_for_scan(&screener).await;

    let second = screener.start_scan(10, false).expect("valid");
    assert!(matches!(second, ScanTrigger::UsingCache { .. }));

    let forced = screener.start_scan(10, true).expect("valid");
    assert!(matches!(forced, ScanTrigger::Started { .. }));
    wait_for_scan(&screener).await;
}

#[tokio::test]
async fn concurrent_scans_are_mutually_exclusive() {
    let market = healthy_market(&["INFY"]);
    let screener = screener(market);

    assert!(screener.cache().try_begin_scan());
    let trigger = screener.start_scan(10, true).expect("valid");
    assert_eq!(trigger, ScanTrigger::InProgress);

    screener.cache().abort_scan();
    assert!(!screener.status().scan_in_progress);
}

#[tokio::test]
async fn latch_opens_after_every_scan() {
    let market = healthy_market(&["INFY"]);
    // Every candidate fails; the scan still completes and unlatches.
    market.fail_fundamentals(symbol("INFY"), ProviderError::unavailable("feed down"));
    let screener = screener(market);

    screener.start_scan(10, false).expect("valid");
    wait_for_scan(&screener).await;

    let status = screener.status();
    assert!(!status.scan_in_progress);
    assert_eq!(status.cached_opportunities, 0);
    assert!(status.last_scan_age_seconds.is_some(), "scan completed");
}

#[tokio::test]
async fn queries_filter_the_cached_ranking_in_rank_order() {
    let market = healthy_market(&["INFY", "CIPLA"]);
    let mut pharma = healthy_fundamentals("CIPLA");
    pharma.sector = Some(String::from("Healthcare"));
    market.set_fundamentals(pharma);

    let screener = screener(market);
    screener.start_scan(10, false).expect("valid");
    wait_for_scan(&screener).await;

    let healthcare = screener.opportunities(&OpportunityFilter {
        sector: Some(String::from("healthcare")),
        ..OpportunityFilter::default()
    });
    assert_eq!(healthcare.len(), 1);
    assert_eq!(healthcare[0].symbol.as_str(), "CIPLA");

    let high_bar = screener.opportunities(&OpportunityFilter {
        min_score: Some(100.0),
        ..OpportunityFilter::default()
    });
    assert!(high_bar.is_empty());

    let top = screener.top(1);
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn signal_distribution_covers_every_signal() {
    let market = healthy_market(&["INFY", "TCS"]);
    let screener = screener(market);
    screener.start_scan(10, false).expect("valid");
    wait_for_scan(&screener).await;

    let distribution = screener.signal_distribution();
    assert_eq!(distribution.len(), TradeSignal::ALL.len());
    let total: usize = distribution.values().sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn analyze_works_without_a_prior_scan() {
    let market = healthy_market(&["WIPRO"]);
    let screener = screener(market);

    let opportunity = screener
        .analyze(&symbol("WIPRO"))
        .await
        .expect("on-demand screening");
    assert_eq!(opportunity.symbol.as_str(), "WIPRO");
    assert!(opportunity.score.overall > 0.0);
}

fn suffix(i: usize) -> String {
    let a = (b'A' + (i / 26) as u8) as char;
    let b = (b'A' + (i % 26) as u8) as char;
    format!("{a}{b}")
}
