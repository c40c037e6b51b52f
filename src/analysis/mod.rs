//! Demand/supply correlation pipeline.
//!
//! normalize -> inner join on time code -> display period -> Pearson -> band
//!
//! Rows whose demand or supply value could not be coerced stay in the merged
//! table (the chart shows a gap) but are left out of the correlation.

use tracing::debug;

use crate::domain::{AnalysisResult, Series};
use crate::math::pearson;

pub mod band;
pub mod merge;
pub mod normalize;

pub use band::classify;
pub use merge::{display_period, inner_join};
pub use normalize::{coerce_value, normalize};

/// Run the full pipeline on two fetched series. Pure; no I/O.
pub fn analyze(demand: &Series, supply: &Series) -> AnalysisResult {
    let demand_points = normalize(demand);
    let supply_points = normalize(supply);

    let merged = inner_join(&demand_points, &supply_points);

    let pairs: Vec<(f64, f64)> = merged.iter().filter_map(|r| r.complete_pair()).collect();
    let correlation = pearson(&pairs);
    let band = classify(correlation);

    debug!(
        demand_rows = demand.len(),
        supply_rows = supply.len(),
        merged_rows = merged.len(),
        complete_rows = pairs.len(),
        ?correlation,
        ?band,
        "analysis complete"
    );

    AnalysisResult {
        merged,
        correlation,
        band,
    }
}
