//! Inner join of two normalized series on time code.
//!
//! Join semantics are relational: a time code repeated in either input
//! produces one output row per matching pair (cross product). Output order is
//! demand order, then supply order within one demand row.

use std::collections::HashMap;

use crate::analysis::normalize::NormalizedPoint;
use crate::domain::MergedRecord;

/// Length of the `YYYYMM` display period.
pub const DISPLAY_PERIOD_LEN: usize = 6;

/// First 6 characters of a time code (`"20230315"` -> `"202303"`).
///
/// Shorter codes are returned whole.
pub fn display_period(time_code: &str) -> String {
    time_code.chars().take(DISPLAY_PERIOD_LEN).collect()
}

pub fn inner_join(demand: &[NormalizedPoint], supply: &[NormalizedPoint]) -> Vec<MergedRecord> {
    let mut supply_by_time: HashMap<&str, Vec<Option<f64>>> = HashMap::new();
    for p in supply {
        supply_by_time.entry(p.time_code.as_str()).or_default().push(p.value);
    }

    let mut merged = Vec::new();
    for d in demand {
        let Some(matches) = supply_by_time.get(d.time_code.as_str()) else {
            continue;
        };
        for &supply_value in matches {
            merged.push(MergedRecord {
                time_code: d.time_code.clone(),
                demand_value: d.value,
                supply_value,
                display_period: display_period(&d.time_code),
            });
        }
    }
    merged
}
