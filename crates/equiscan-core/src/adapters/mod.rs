//! Data source adapters.
//!
//! [`fixture`] is the programmable in-memory source used by tests and
//! offline runs; [`marketfeed`] speaks JSON over HTTP to a live feed.

pub mod fixture;
pub mod marketfeed;

pub use fixture::FixtureMarketData;
pub use marketfeed::{MarketFeedAdapter, MarketFeedConfig};
