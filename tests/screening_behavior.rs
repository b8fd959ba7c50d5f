// End-to-end screening behavior over scripted market data.

use equiscan_tests::*;

#[tokio::test]
async fn ideal_candidate_earns_strong_buy_at_full_confidence() {
    let market = healthy_market(&["WINNER"]);
    let orchestrator = orchestrator(market);

    let opportunity = orchestrator
        .screen(&candidate("WINNER", "Technology"))
        .await
        .expect("healthy candidate must screen");

    // Rally: healthy RSI band impossible (monotonic gains push RSI to
    // 100), but MACD, trend, and the volume spike all reward; strong
    // fundamentals max their component.
    assert_eq!(opportunity.score.fundamental, 100.0);
    assert!(opportunity.score.overall >= 80.0);
    assert_eq!(opportunity.signal, TradeSignal::StrongBuy);
    assert_eq!(opportunity.confidence, 0.9);

    // Buy-side trade levels: +15% target, -8% stop.
    assert!((opportunity.target_price - 230.0).abs() < 1e-9);
    assert!((opportunity.stop_loss - 184.0).abs() < 1e-9);
}

#[tokio::test]
async fn reasoning_trail_names_each_contributing_factor() {
    let market = healthy_market(&["WINNER"]);
    let orchestrator = orchestrator(market);

    let opportunity = orchestrator
        .screen(&candidate("WINNER", "Technology"))
        .await
        .expect("screens");

    assert!(opportunity
        .buy_reasons
        .iter()
        .any(|reason| reason.contains("MACD")));
    assert!(opportunity
        .buy_reasons
        .iter()
        .any(|reason| reason.contains("volume surge")));
    assert!(opportunity
        .buy_reasons
        .iter()
        .any(|reason| reason.contains("low P/E")));
    // Overbought RSI from the monotonic rally is flagged as a risk.
    assert!(opportunity
        .risk_factors
        .iter()
        .any(|reason| reason.contains("overbought")));
}

#[tokio::test]
async fn declining_stock_is_ranked_with_sell_side_signal() {
    let market = healthy_market(&["LOSER"]);
    let mut weak = healthy_fundamentals("LOSER");
    weak.pe_ratio = Some(40.0);
    weak.roe = Some(5.0);
    weak.debt_to_equity = Some(1.8);
    weak.revenue_growth = Some(1.0);
    market.set_fundamentals(weak);
    market.set_series(declining_series("LOSER"));

    let orchestrator = orchestrator(market);
    let opportunity = orchestrator
        .screen(&candidate("LOSER", "Technology"))
        .await
        .expect("screens");

    assert!(opportunity.score.overall < 35.0);
    assert!(matches!(
        opportunity.signal,
        TradeSignal::Sell | TradeSignal::StrongSell
    ));
    // Sell-side trade levels invert: -5% target, +5% stop.
    assert!(opportunity.target_price < opportunity.current_price);
    assert!(opportunity.stop_loss > opportunity.current_price);
}

#[tokio::test]
async fn missing_fundamentals_exclude_only_that_candidate() {
    let market = healthy_market(&["ALPHA", "BETA"]);
    market.fail_fundamentals(
        symbol("BETA"),
        ProviderError::not_found("no fundamentals record"),
    );

    let ranked = orchestrator(market)
        .scan(vec![
            candidate("ALPHA", "Technology"),
            candidate("BETA", "Technology"),
        ])
        .await;

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].symbol.as_str(), "ALPHA");
}

#[tokio::test]
async fn unscorable_fundamentals_are_never_defaulted() {
    let market = healthy_market(&["GAPPY"]);
    let mut gappy = healthy_fundamentals("GAPPY");
    gappy.pe_ratio = None;
    market.set_fundamentals(gappy);

    let ranked = orchestrator(market)
        .scan(vec![candidate("GAPPY", "Technology")])
        .await;
    assert!(ranked.is_empty(), "missing pe_ratio must exclude");
}

#[tokio::test]
async fn empty_price_history_degrades_to_neutral_technicals() {
    let market = healthy_market(&["QUIET"]);
    market.set_series(PriceSeries::empty(symbol("QUIET")));

    let opportunity = orchestrator(market)
        .screen(&candidate("QUIET", "Technology"))
        .await
        .expect("fundamentals alone keep the candidate");

    assert_eq!(opportunity.technical.rsi, 50.0);
    assert!(!opportunity.technical.volume_surge);
    // Neutral technicals score 70 (RSI band), strong fundamentals 100.
    assert_eq!(opportunity.score.technical, 70.0);
    assert_eq!(opportunity.score.fundamental, 100.0);
}

#[tokio::test]
async fn screening_identical_inputs_is_deterministic() {
    let market = healthy_market(&["REPEAT"]);
    let orchestrator = orchestrator(market);
    let target = candidate("REPEAT", "Technology");

    let first = orchestrator.screen(&target).await.expect("screens");
    let second = orchestrator.screen(&target).await.expect("screens");

    assert_eq!(first.score, second.score);
    assert_eq!(first.signal, second.signal);
    assert_eq!(first.buy_reasons, second.buy_reasons);
    assert_eq!(first.risk_factors, second.risk_factors);
}

#[tokio::test]
async fn opportunity_serializes_with_screaming_snake_case_signals() {
    let market = healthy_market(&["WINNER"]);
    let opportunity = orchestrator(market)
        .screen(&candidate("WINNER", "Technology"))
        .await
        .expect("screens");

    let json = serde_json::to_value(&opportunity).expect("serializes");
    assert_eq!(json["signal"], "STRONG_BUY");
    assert!(json["score"]["overall"].is_f64());
}
