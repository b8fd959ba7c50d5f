mod analyze;
mod list;
mod scan;
mod signals;
mod status;
mod top;

use std::sync::Arc;
use std::time::Duration;

use equiscan_core::{
    sectors, Bar, CandidateStock, FixtureMarketData, FundamentalSnapshot, MarketFeedAdapter,
    MarketFeedConfig, PacingGate, PriceSeries, ReqwestHttpClient, ScanConfig, ScanOrchestrator,
    ScanTrigger, ScoringEngine, Screener, Symbol, UniverseBuilder, UniverseConfig, UtcDateTime,
    DEFAULT_FRESHNESS,
};

use crate::cli::{Cli, Command, ScanArgs};
use crate::error::CliError;

const SCAN_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

pub async fn run(cli: &Cli) -> Result<serde_json::Value, CliError> {
    let screener = build_screener(cli);

    match &cli.command {
        Command::Scan(args) => scan::run(&screener, args).await,
        Command::List(args) => list::run(&screener, args).await,
        Command::Top(args) => top::run(&screener, args).await,
        Command::Analyze(args) => analyze::run(&screener, args).await,
        Command::Status => status::run(&screener),
        Command::Signals(args) => signals::run(&screener, args).await,
    }
}

fn build_screener(cli: &Cli) -> Screener {
    if cli.fixture {
        let market = fixture_market();
        let pacing = PacingGate::unpaced();
        let universe = UniverseBuilder::new(
            market.clone(),
            market.clone(),
            market.clone(),
            pacing.clone(),
            UniverseConfig::default(),
        );
        let orchestrator = ScanOrchestrator::new(
            market.clone(),
            market,
            pacing,
            ScoringEngine::default(),
            ScanConfig::default(),
        );
        Screener::new(universe, orchestrator, DEFAULT_FRESHNESS)
    } else {
        let client = Arc::new(ReqwestHttpClient::new());
        let adapter = Arc::new(MarketFeedAdapter::new(
            client,
            MarketFeedConfig {
                base_url: cli.base_url.clone(),
                ..MarketFeedConfig::default()
            },
        ));
        // One gate across universe building and scanning; the spacing
        // rule is per provider, not per caller.
        let pacing = PacingGate::fundamentals_default();
        let universe = UniverseBuilder::new(
            adapter.clone(),
            adapter.clone(),
            adapter.clone(),
            pacing.clone(),
            UniverseConfig::default(),
        );
        let orchestrator = ScanOrchestrator::new(
            adapter.clone(),
            adapter,
            pacing,
            ScoringEngine::default(),
            ScanConfig::default(),
        );
        Screener::new(universe, orchestrator, DEFAULT_FRESHNESS)
    }
}

/// Trigger a scan and block until the ranking is available.
pub async fn scan_and_wait(screener: &Screener, args: &ScanArgs) -> Result<ScanTrigger, CliError> {
    let trigger = screener.start_scan(args.max_stocks, args.force)?;
    if matches!(trigger, ScanTrigger::UsingCache { .. }) {
        return Ok(trigger);
    }

    let started = std::time::Instant::now();
    while screener.status().scan_in_progress {
        if started.elapsed() > SCAN_WAIT_TIMEOUT {
            return Err(CliError::ScanTimeout {
                timeout_secs: SCAN_WAIT_TIMEOUT.as_secs(),
            });
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Ok(trigger)
}

/// Deterministic offline market data spanning the static universe.
/// Metrics are seeded from the ticker so runs are repeatable.
fn fixture_market() -> Arc<FixtureMarketData> {
    let market = Arc::new(FixtureMarketData::new());
    let now = UtcDateTime::now();

    let mut listing = Vec::new();
    for (ticker, name) in sectors::FALLBACK_UNIVERSE {
        let symbol = match Symbol::parse(ticker) {
            Ok(symbol) => symbol,
            Err(_) => continue,
        };
        let sector = sectors::classify(ticker);
        listing.push(CandidateStock::new(symbol.clone(), *name, sector));

        let seed: u64 = ticker.bytes().map(u64::from).sum::<u64>() * 31;
        let mut rng = fastrand::Rng::with_seed(seed);

        let price = 100.0 + rng.f64() * 1_900.0;
        let mut snapshot = FundamentalSnapshot::new(symbol.clone(), now);
        snapshot.price = Some(price);
        snapshot.market_cap = Some(600.0 + rng.f64() * 39_000.0);
        snapshot.pe_ratio = Some(6.0 + rng.f64() * 34.0);
        snapshot.debt_to_equity = Some(rng.f64() * 1.5);
        snapshot.roe = Some(5.0 + rng.f64() * 25.0);
        snapshot.revenue_growth = Some(-5.0 + rng.f64() * 35.0);
        snapshot.roce = Some(5.0 + rng.f64() * 30.0);
        snapshot.dividend_yield = Some(rng.f64() * 4.0);
        snapshot.sector = Some(sector.to_owned());
        market.set_fundamentals(snapshot);

        market.set_series(fixture_series(symbol, price, &mut rng, now));
    }
    market.set_listing(listing);
    market
}

fn fixture_series(
    symbol: Symbol,
    last_price: f64,
    rng: &mut fastrand::Rng,
    now: UtcDateTime,
) -> PriceSeries {
    let days = 120usize;
    let drift = (rng.f64() - 0.45) * 0.004;
    let mut close = last_price / (1.0 + drift).powi(days as i32);

    let mut bars = Vec::with_capacity(days);
    for day in 0..days {
        let ts = now.minus(Duration::from_secs((days - day) as u64 * 86_400));
        let open = close;
        close = (close * (1.0 + drift + (rng.f64() - 0.5) * 0.02)).max(1.0);
        let high = open.max(close) * 1.01;
        let low = open.min(close) * 0.99;
        let volume = 50_000 + rng.u64(..150_000);
        if let Ok(bar) = Bar::new(ts, open, high, low, close, Some(volume)) {
            bars.push(bar);
        }
    }
    PriceSeries::new(symbol, bars)
}
