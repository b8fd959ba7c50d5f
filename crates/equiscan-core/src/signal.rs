//! Signal generation: score thresholds, reasoning trail, trade levels.
//!
//! A pure function of its inputs; repeated invocation with identical
//! feature sets yields identical output.

use crate::{FundamentalSnapshot, SignalReport, TechnicalSnapshot, TradeSignal};

const TARGET_UPSIDE: f64 = 1.15;
const STOP_LOSS_BUY: f64 = 0.92;
const TARGET_DOWNSIDE: f64 = 0.95;
const STOP_LOSS_SELL: f64 = 1.05;

/// Map an overall score to its discrete signal, checked high to low.
pub fn signal_for_score(overall: f64) -> (TradeSignal, f64) {
    if overall >= 80.0 {
        (TradeSignal::StrongBuy, 0.9)
    } else if overall >= 65.0 {
        (TradeSignal::Buy, 0.7)
    } else if overall >= 35.0 {
        (TradeSignal::Hold, 0.5)
    } else if overall >= 20.0 {
        (TradeSignal::Sell, 0.7)
    } else {
        (TradeSignal::StrongSell, 0.9)
    }
}

/// Build the signal report for one candidate.
///
/// Reason ordering is fixed (RSI, MACD, trend, volume, P/E, ROE,
/// growth) so the trail reads the same way across candidates.
pub fn generate_signal(
    technical: &TechnicalSnapshot,
    fundamental: &FundamentalSnapshot,
    overall: f64,
    current_price: f64,
) -> SignalReport {
    let (signal, confidence) = signal_for_score(overall);

    let mut buy_reasons = Vec::new();
    if technical.rsi < 35.0 {
        buy_reasons.push(String::from(
            "RSI indicates oversold condition - potential reversal",
        ));
    }
    if technical.macd_signal.is_bullish() {
        buy_reasons.push(String::from("MACD showing bullish momentum"));
    }
    if technical.ma_trend.is_up() {
        buy_reasons.push(String::from("Strong upward price trend"));
    }
    if technical.volume_surge {
        buy_reasons.push(String::from(
            "Unusual volume surge indicates institutional interest",
        ));
    }
    if matches!(fundamental.pe_ratio, Some(pe) if pe < 15.0) {
        buy_reasons.push(String::from("Attractive valuation with low P/E ratio"));
    }
    if matches!(fundamental.roe, Some(roe) if roe > 18.0) {
        buy_reasons.push(String::from(
            "Strong return on equity indicates efficient management",
        ));
    }
    if matches!(fundamental.revenue_growth, Some(growth) if growth > 15.0) {
        buy_reasons.push(String::from("Strong revenue growth trajectory"));
    }

    let mut risk_factors = Vec::new();
    if technical.rsi > 75.0 {
        risk_factors.push(String::from(
            "RSI indicates overbought condition - potential correction",
        ));
    }
    if matches!(fundamental.debt_to_equity, Some(de) if de > 1.0) {
        risk_factors.push(String::from(
            "High debt levels may impact financial stability",
        ));
    }
    if matches!(fundamental.pe_ratio, Some(pe) if pe > 25.0) {
        risk_factors.push(String::from("High valuation may limit upside potential"));
    }
    if matches!(fundamental.revenue_growth, Some(growth) if growth < 5.0) {
        risk_factors.push(String::from(
            "Slow revenue growth may indicate business challenges",
        ));
    }

    let (target_price, stop_loss) = if signal.is_buy() {
        (current_price * TARGET_UPSIDE, current_price * STOP_LOSS_BUY)
    } else {
        (
            current_price * TARGET_DOWNSIDE,
            current_price * STOP_LOSS_SELL,
        )
    };

    SignalReport {
        signal,
        confidence,
        buy_reasons,
        risk_factors,
        target_price,
        stop_loss,
    }
}
