//! Technical indicator computation over a daily price window.
//!
//! [`compute_indicators`] never fails: empty, short, or degenerate input
//! degrades to [`TechnicalSnapshot::neutral`], and each indicator guards
//! its own preconditions so one degenerate column cannot poison the rest.

use crate::{MaTrend, MacdSignal, PriceSeries, TechnicalSnapshot};

const RSI_PERIOD: usize = 14;
const MACD_FAST: f64 = 12.0;
const MACD_SLOW: f64 = 26.0;
const MACD_SIGNAL: f64 = 9.0;
const MA_SHORT: usize = 20;
const MA_LONG: usize = 50;
const VOLUME_WINDOW: usize = 20;
const VOLUME_SURGE_RATIO: f64 = 1.5;
const MIN_BARS: usize = 20;

/// Derive the momentum/trend/volume feature set from a price series.
pub fn compute_indicators(series: &PriceSeries) -> TechnicalSnapshot {
    if series.len() < MIN_BARS {
        return TechnicalSnapshot::neutral();
    }

    let closes = series.closes();

    TechnicalSnapshot {
        rsi: relative_strength_index(&closes, RSI_PERIOD),
        macd_signal: macd_classification(&closes),
        ma_trend: moving_average_trend(&closes),
        volume_surge: volume_surge(series),
    }
}

/// RSI over a rolling window of gains and losses; 50 when history is
/// too short, 100 when the window has no losses at all.
pub fn relative_strength_index(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period + 1 || period == 0 {
        return 50.0;
    }

    let window = &closes[closes.len() - period - 1..];
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gain_sum += delta;
        } else {
            loss_sum -= delta;
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

fn exponential_moving_average(values: &[f64], span: f64) -> Vec<f64> {
    let alpha = 2.0 / (span + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = match values.first() {
        Some(first) => *first,
        None => return out,
    };
    out.push(ema);
    for value in &values[1..] {
        ema = alpha * value + (1.0 - alpha) * ema;
        out.push(ema);
    }
    out
}

/// Classify MACD(12,26,9) on the latest bar. Crossovers compare the
/// latest bar against the previous one; without two bars the state is
/// indeterminate and reported as neutral.
pub fn macd_classification(closes: &[f64]) -> MacdSignal {
    if closes.len() < 2 {
        return MacdSignal::Neutral;
    }

    let ema_fast = exponential_moving_average(closes, MACD_FAST);
    let ema_slow = exponential_moving_average(closes, MACD_SLOW);
    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal = exponential_moving_average(&macd, MACD_SIGNAL);

    let last = macd.len() - 1;
    let prev = last - 1;

    if macd[last] > signal[last] && macd[prev] <= signal[prev] {
        MacdSignal::BullishCrossover
    } else if macd[last] < signal[last] && macd[prev] >= signal[prev] {
        MacdSignal::BearishCrossover
    } else if macd[last] > signal[last] {
        MacdSignal::Bullish
    } else {
        MacdSignal::Bearish
    }
}

/// Trend from simple 20/50-day moving averages. Under 50 bars the long
/// average is undefined and the trend is neutral.
pub fn moving_average_trend(closes: &[f64]) -> MaTrend {
    if closes.len() < MA_LONG {
        return MaTrend::Neutral;
    }

    let price = closes[closes.len() - 1];
    let ma_short = mean(&closes[closes.len() - MA_SHORT..]);
    let ma_long = mean(&closes[closes.len() - MA_LONG..]);

    if price > ma_short && ma_short > ma_long {
        MaTrend::StrongUptrend
    } else if price > ma_short {
        MaTrend::Uptrend
    } else if price < ma_short && ma_short < ma_long {
        MaTrend::StrongDowntrend
    } else if price < ma_short {
        MaTrend::Downtrend
    } else {
        MaTrend::Sideways
    }
}

/// Latest volume vs 1.5x the trailing 20-bar average, where the average
/// excludes the latest bar. Missing volume data reads as no surge.
pub fn volume_surge(series: &PriceSeries) -> bool {
    if series.len() < VOLUME_WINDOW + 1 {
        return false;
    }

    let latest = match series.bars.last().and_then(|bar| bar.volume) {
        Some(volume) => volume as f64,
        None => return false,
    };

    let window = &series.bars[series.len() - VOLUME_WINDOW - 1..series.len() - 1];
    let avg = window
        .iter()
        .map(|bar| bar.volume.unwrap_or(0) as f64)
        .sum::<f64>()
        / VOLUME_WINDOW as f64;

    avg > 0.0 && latest > avg * VOLUME_SURGE_RATIO
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
