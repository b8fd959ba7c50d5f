//! Universe selection: multi-stage filtering and sector-balanced sampling.
//!
//! Five stages, each consuming the previous stage's output:
//!
//! 1. Tradeability filter (pure syntactic, no I/O)
//! 2. Sector-diversity sampling toward a working set of ~200
//! 3. Market-cap band filter via the fundamentals provider
//! 4. Cheap technical pre-filter over a sampled subset
//! 5. Proportional final sampling across surviving sectors
//!
//! Provider failures during filtering are *permissive*: the candidate is
//! retained and the failure logged. The pipeline favors false positives
//! over losing real opportunities; the exclusionary gate lives in the
//! scan orchestrator, not here.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::provider::{FundamentalsProvider, HistoryRequest, PriceHistoryProvider, UniverseSource};
use crate::throttling::PacingGate;
use crate::{sectors, CandidateStock, PriceSeries, Symbol, ValidationError};

/// Share-class and relisting suffixes that mark non-standard listings.
const NON_STANDARD_SUFFIXES: &[&str] = &["-RE", "-BE", "-BZ", "-SM", "-ST", "-GB", "-IL", "-PP"];

/// Tunables for the filtering stages. Defaults match the screening
/// criteria the pipeline was calibrated against.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseConfig {
    /// Mid/small-cap band in crores, inclusive.
    pub market_cap_min: f64,
    pub market_cap_max: f64,
    /// Working-set size after sector-diversity sampling.
    pub sector_sample_target: usize,
    /// How many candidates the technical pre-filter actually tests.
    pub prefilter_sample: usize,
    /// Composite strength threshold for passing the pre-filter.
    pub prefilter_min_strength: f64,
    /// Below this many survivors, backfill from untested candidates.
    pub prefilter_min_survivors: usize,
    /// Calendar days of history fetched for the pre-filter.
    pub prefilter_window_days: u64,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            market_cap_min: 500.0,
            market_cap_max: 50_000.0,
            sector_sample_target: 200,
            prefilter_sample: 100,
            prefilter_min_strength: 0.4,
            prefilter_min_survivors: 30,
            prefilter_window_days: 30,
        }
    }
}

/// Builds the candidate set for one scan.
pub struct UniverseBuilder {
    source: Arc<dyn UniverseSource>,
    fundamentals: Arc<dyn FundamentalsProvider>,
    history: Arc<dyn PriceHistoryProvider>,
    pacing: PacingGate,
    config: UniverseConfig,
}

impl UniverseBuilder {
    /// `pacing` must be the same gate the scan orchestrator uses; the
    /// spacing rule covers every fundamentals call in the process, not
    /// just the scan path.
    pub fn new(
        source: Arc<dyn UniverseSource>,
        fundamentals: Arc<dyn FundamentalsProvider>,
        history: Arc<dyn PriceHistoryProvider>,
        pacing: PacingGate,
        config: UniverseConfig,
    ) -> Self {
        Self {
            source,
            fundamentals,
            history,
            pacing,
            config,
        }
    }

    /// Produce at most `max_size` candidates. May legitimately return
    /// fewer when filtering starves a sector.
    pub async fn build(&self, max_size: usize) -> Result<Vec<CandidateStock>, ValidationError> {
        if max_size == 0 {
            return Err(ValidationError::EmptyUniverseBound);
        }

        let listing = match self.source.instruments().await {
            Ok(listing) => listing,
            Err(error) => {
                warn!(%error, "universe source unavailable, using fallback list");
                fallback_universe()
            }
        };
        info!(listed = listing.len(), "building universe");

        let tradeable: Vec<CandidateStock> = listing
            .into_iter()
            .filter(|candidate| is_tradeable(candidate.symbol.as_str()))
            .collect();
        debug!(count = tradeable.len(), "tradeability filter applied");

        let diverse = sample_by_sector(tradeable, self.config.sector_sample_target);
        debug!(count = diverse.len(), "sector-diversity sample taken");

        let capped = self.filter_by_market_cap(diverse).await;
        debug!(count = capped.len(), "market-cap filter applied");

        let strong = self.technical_prefilter(capped).await;
        debug!(count = strong.len(), "technical pre-filter applied");

        let selected = proportional_sample(strong, max_size);
        info!(count = selected.len(), max_size, "universe built");
        Ok(selected)
    }

    /// Stage 3: keep candidates inside the configured cap band. A
    /// provider error or missing market cap retains the candidate; a
    /// transient failure must not look like a disqualification.
    async fn filter_by_market_cap(&self, candidates: Vec<CandidateStock>) -> Vec<CandidateStock> {
        let mut kept = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            self.pacing.pace().await;
            match self.fundamentals.fundamentals(&candidate.symbol).await {
                Ok(snapshot) => match snapshot.market_cap {
                    Some(cap)
                        if cap < self.config.market_cap_min
                            || cap > self.config.market_cap_max =>
                    {
                        debug!(symbol = %candidate.symbol, cap, "outside market-cap band");
                    }
                    _ => kept.push(candidate),
                },
                Err(error) => {
                    warn!(symbol = %candidate.symbol, %error, "market-cap check failed, retaining");
                    kept.push(candidate);
                }
            }
        }
        kept
    }

    /// Stage 4: test a sampled subset on a cheap composite strength
    /// score; backfill from the untested remainder when too few pass.
    async fn technical_prefilter(&self, candidates: Vec<CandidateStock>) -> Vec<CandidateStock> {
        let mut pool = candidates;
        let tested = sample_uniform(&mut pool, self.config.prefilter_sample);
        // `pool` now holds the untested remainder.

        let mut survivors = Vec::new();
        for candidate in tested {
            let request = HistoryRequest::trailing_days(
                candidate.symbol.clone(),
                self.config.prefilter_window_days,
            );
            match self.history.price_history(request).await {
                Ok(series) => match composite_strength(&series) {
                    Some(strength) if strength < self.config.prefilter_min_strength => {
                        debug!(symbol = %candidate.symbol, strength, "below pre-filter threshold");
                    }
                    _ => survivors.push(candidate),
                },
                Err(error) => {
                    warn!(symbol = %candidate.symbol, %error, "pre-filter fetch failed, retaining");
                    survivors.push(candidate);
                }
            }
        }

        if survivors.len() < self.config.prefilter_min_survivors {
            let needed = self.config.prefilter_min_survivors - survivors.len();
            let backfill = sample_uniform(&mut pool, needed);
            debug!(count = backfill.len(), "backfilling pre-filter survivors");
            survivors.extend(backfill);
        }
        survivors
    }
}

/// Stage 1 predicate: reject non-standard listings. Suffixed share
/// classes, digit-bearing symbols, and very short symbols are skipped.
pub fn is_tradeable(symbol: &str) -> bool {
    let symbol = symbol.trim();
    if symbol.chars().count() < 3 {
        return false;
    }
    if symbol.chars().any(|ch| ch.is_ascii_digit()) {
        return false;
    }
    if NON_STANDARD_SUFFIXES
        .iter()
        .any(|suffix| symbol.ends_with(suffix))
    {
        return false;
    }
    true
}

/// Composite pre-filter strength in [0, 1]:
/// `0.6 * price_range_position + 0.4 * min(volume_ratio, 2) / 2`.
///
/// Returns `None` on short or degenerate data, which the caller treats
/// permissively.
pub fn composite_strength(series: &PriceSeries) -> Option<f64> {
    if series.len() < 10 {
        return None;
    }

    let last_close = series.last_close()?;
    let window = &series.bars[series.len() - 10..];
    let low = window.iter().map(|bar| bar.low).fold(f64::INFINITY, f64::min);
    let high = window
        .iter()
        .map(|bar| bar.high)
        .fold(f64::NEG_INFINITY, f64::max);
    if !(high - low).is_normal() || high <= low {
        return None;
    }
    let range_position = ((last_close - low) / (high - low)).clamp(0.0, 1.0);

    let latest_volume = series.bars.last()?.volume? as f64;
    let avg_volume = series
        .bars
        .iter()
        .map(|bar| bar.volume.unwrap_or(0) as f64)
        .sum::<f64>()
        / series.len() as f64;
    if avg_volume <= 0.0 {
        return None;
    }
    let volume_ratio = (latest_volume / avg_volume).min(2.0);

    Some(0.6 * range_position + 0.4 * volume_ratio / 2.0)
}

/// Stage 2: group by sector and draw a bounded uniform sample from each
/// group. Uniform selection within a group avoids the alphabetic bias a
/// plain listing-order truncation would have.
fn sample_by_sector(candidates: Vec<CandidateStock>, target: usize) -> Vec<CandidateStock> {
    if candidates.len() <= target {
        return candidates;
    }

    let mut groups: BTreeMap<String, Vec<CandidateStock>> = BTreeMap::new();
    for candidate in candidates {
        let sector = effective_sector(&candidate);
        groups.entry(sector).or_default().push(candidate);
    }

    let per_sector = (target / groups.len()).max(1);
    let mut sampled = Vec::with_capacity(target);
    for group in groups.values_mut() {
        sampled.extend(sample_uniform(group, per_sector));
    }
    sampled
}

/// Stage 5: allocate `max_size` slots proportionally across sectors
/// (integer division plus round-robin remainder), selecting uniformly
/// within each sector, topping up from the leftovers if under capacity.
fn proportional_sample(candidates: Vec<CandidateStock>, max_size: usize) -> Vec<CandidateStock> {
    if candidates.len() <= max_size {
        return candidates;
    }

    let mut groups: BTreeMap<String, Vec<CandidateStock>> = BTreeMap::new();
    for candidate in candidates {
        let sector = effective_sector(&candidate);
        groups.entry(sector).or_default().push(candidate);
    }

    let sector_count = groups.len();
    let base = max_size / sector_count;
    let mut remainder = max_size % sector_count;

    let mut selected = Vec::with_capacity(max_size);
    let mut leftovers = Vec::new();
    for group in groups.values_mut() {
        let mut quota = base;
        if remainder > 0 {
            quota += 1;
            remainder -= 1;
        }
        selected.extend(sample_uniform(group, quota));
        leftovers.append(group);
    }

    if selected.len() < max_size {
        let top_up = max_size - selected.len();
        selected.extend(sample_uniform(&mut leftovers, top_up));
    }
    selected.truncate(max_size);
    selected
}

fn effective_sector(candidate: &CandidateStock) -> String {
    if candidate.sector.trim().is_empty() {
        sectors::classify(candidate.symbol.as_str()).to_owned()
    } else {
        candidate.sector.clone()
    }
}

/// Draw up to `count` items uniformly at random, removing them from the
/// pool.
fn sample_uniform<T>(pool: &mut Vec<T>, count: usize) -> Vec<T> {
    let take = count.min(pool.len());
    let mut drawn = Vec::with_capacity(take);
    for _ in 0..take {
        let index = fastrand::usize(..pool.len());
        drawn.push(pool.swap_remove(index));
    }
    drawn
}

/// Static sector-balanced candidate list used when the listing source
/// is down.
pub fn fallback_universe() -> Vec<CandidateStock> {
    sectors::FALLBACK_UNIVERSE
        .iter()
        .filter_map(|(ticker, name)| {
            let symbol = Symbol::parse(ticker).ok()?;
            let sector = sectors::classify(ticker);
            Some(CandidateStock::new(symbol, *name, sector))
        })
        .collect()
}
