//! Remote data access (e-Stat).

pub mod config;
pub mod estat;

pub use config::EstatConfig;
pub use estat::{FetchError, FetchOutcome, HttpStatsSource, StatFetcher, StatsQuery, StatsSource};
