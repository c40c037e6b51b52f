//! Shared "analysis pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch demand + fetch supply -> short-circuit on failure -> analyze
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::sync::Arc;

use tracing::info;

use crate::analysis::analyze;
use crate::data::{FetchOutcome, StatFetcher, StatsSource};
use crate::domain::{AnalysisRequest, AnalysisResult, Series};

/// Message shown when either series could not be retrieved.
pub const FETCH_FAILED_NOTICE: &str =
    "Failed to retrieve the data. Check the statistic IDs and the e-Stat application ID.";

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub request: AnalysisRequest,
    pub demand: Arc<Series>,
    pub supply: Arc<Series>,
    pub result: AnalysisResult,
}

/// Either a finished run or a fetch failure. No partial results exist.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Ready(AnalysisRun),
    Unavailable { demand: bool, supply: bool },
}

impl AnalysisOutcome {
    pub fn into_run(self) -> Option<AnalysisRun> {
        match self {
            AnalysisOutcome::Ready(run) => Some(run),
            AnalysisOutcome::Unavailable { .. } => None,
        }
    }
}

/// Fetch both series (concurrently) and analyze them.
pub fn run_analysis<S: StatsSource>(fetcher: &StatFetcher<S>, request: &AnalysisRequest) -> AnalysisOutcome {
    let area_code = request.prefecture.area_code();

    let (demand, supply) = rayon::join(
        || fetcher.fetch(&request.demand_id, area_code),
        || fetcher.fetch(&request.supply_id, area_code),
    );

    let (demand, supply) = match (demand, supply) {
        (FetchOutcome::Available(demand), FetchOutcome::Available(supply)) => (demand, supply),
        (demand, supply) => {
            return AnalysisOutcome::Unavailable {
                demand: !demand.is_available(),
                supply: !supply.is_available(),
            };
        }
    };

    let result = analyze(&demand, &supply);
    info!(
        prefecture = request.prefecture.romaji(),
        demand_id = %request.demand_id,
        supply_id = %request.supply_id,
        merged_rows = result.merged.len(),
        correlation = ?result.correlation,
        "analysis finished"
    );

    AnalysisOutcome::Ready(AnalysisRun {
        request: request.clone(),
        demand,
        supply,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FetchError;
    use crate::data::estat::tests::{CannedSource, stats_body};
    use crate::domain::{Band, Prefecture};

    fn request(demand: &str, supply: &str) -> AnalysisRequest {
        AnalysisRequest {
            prefecture: Prefecture::Tokyo,
            demand_id: demand.to_string(),
            supply_id: supply.to_string(),
        }
    }

    #[test]
    fn both_available_produces_a_run() {
        let fetcher = StatFetcher::new(CannedSource::new(vec![
            ("D", Ok(stats_body(&[("20230101", "100"), ("20230201", "200"), ("20230301", "300")]))),
            ("S", Ok(stats_body(&[("20230101", "50"), ("20230201", "60"), ("20230301", "75")]))),
        ]));

        let run = run_analysis(&fetcher, &request("D", "S")).into_run().unwrap();
        assert_eq!(run.demand.stat_id, "D");
        assert_eq!(run.supply.area_code, "13000");
        assert_eq!(run.result.merged.len(), 3);
        assert_eq!(run.result.band, Band::StrongPositive);
    }

    #[test]
    fn either_side_unavailable_short_circuits() {
        let fetcher = StatFetcher::new(CannedSource::new(vec![
            ("D", Ok(stats_body(&[("20230101", "100")]))),
            ("BAD", Err(FetchError::Status(500))),
        ]));

        match run_analysis(&fetcher, &request("D", "BAD")) {
            AnalysisOutcome::Unavailable { demand, supply } => {
                assert!(!demand);
                assert!(supply);
            }
            AnalysisOutcome::Ready(_) => panic!("expected no analysis"),
        }

        match run_analysis(&fetcher, &request("BAD", "D")) {
            AnalysisOutcome::Unavailable { demand, supply } => {
                assert!(demand);
                assert!(!supply);
            }
            AnalysisOutcome::Ready(_) => panic!("expected no analysis"),
        }
    }

    #[test]
    fn repeated_runs_hit_the_cache() {
        let fetcher = StatFetcher::new(CannedSource::new(vec![
            ("D", Ok(stats_body(&[("20230101", "1"), ("20230201", "2")]))),
            ("S", Ok(stats_body(&[("20230101", "3"), ("20230201", "5")]))),
        ]));

        let req = request("D", "S");
        assert!(run_analysis(&fetcher, &req).into_run().is_some());
        assert!(run_analysis(&fetcher, &req).into_run().is_some());
        assert_eq!(fetcher.source().calls(), 2);
    }

    #[test]
    fn same_id_for_both_sides_correlates_to_one() {
        let fetcher = StatFetcher::new(CannedSource::new(vec![(
            "D",
            Ok(stats_body(&[("20230101", "1"), ("20230201", "4"), ("20230301", "2")])),
        )]));

        let run = run_analysis(&fetcher, &request("D", "D")).into_run().unwrap();
        assert!((run.result.correlation.unwrap() - 1.0).abs() < 1e-12);
        // The two parallel fetches may both miss the cache; at most two calls.
        assert!(fetcher.source().calls() <= 2);
    }
}
