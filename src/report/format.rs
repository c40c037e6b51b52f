//! Formatted terminal output for analysis runs.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::AnalysisRun;
use crate::domain::{Band, MergedRecord, Prefecture};

/// Text shown in place of an undefined coefficient.
pub const NOT_COMPUTABLE: &str = "n/a (not computable)";

/// Correlation metric as shown to the user (`0.873` or [`NOT_COMPUTABLE`]).
pub fn format_correlation(correlation: Option<f64>) -> String {
    match correlation {
        Some(r) => format!("{r:.3}"),
        None => NOT_COMPUTABLE.to_string(),
    }
}

/// Format the run summary (request, row counts, correlation, advisory).
pub fn format_run_summary(run: &AnalysisRun) -> String {
    let mut out = String::new();
    let req = &run.request;
    let result = &run.result;

    out.push_str("=== estat - demand/supply correlation (e-Stat) ===\n");
    out.push_str(&format!(
        "Prefecture: {} ({}, area {})\n",
        req.prefecture.display_name(),
        req.prefecture.romaji(),
        req.prefecture.area_code()
    ));
    out.push_str(&format!(
        "Demand: {} ({} rows) | Supply: {} ({} rows)\n",
        req.demand_id,
        run.demand.len(),
        req.supply_id,
        run.supply.len()
    ));
    out.push_str(&format!(
        "Merged: {} rows ({} complete)\n",
        result.merged.len(),
        result.complete_rows()
    ));
    out.push_str(&format!(
        "Correlation (guest nights vs occupancy): {}\n",
        format_correlation(result.correlation)
    ));
    out.push_str(&format!("Band: {}\n", result.band.display_name()));
    if let Some(advice) = advisory_line(result.band) {
        out.push_str(&advice);
        out.push('\n');
    }

    out
}

fn advisory_line(band: Band) -> Option<String> {
    let prefix = match band {
        Band::StrongPositive => "[info]",
        Band::Weak => "[warn]",
        Band::Neutral => return None,
    };
    band.advisory().map(|msg| format!("{prefix} {msg}"))
}

/// Format the merged table. Missing values print as `-`.
pub fn format_merged_table(rows: &[MergedRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<8} {:<10} {:>16} {:>12}\n",
        "period", "time", "demand", "supply"
    ));
    for r in rows {
        out.push_str(&format!(
            "{:<8} {:<10} {:>16} {:>12}\n",
            r.display_period,
            r.time_code,
            fmt_opt(r.demand_value),
            fmt_opt(r.supply_value)
        ));
    }
    if rows.is_empty() {
        out.push_str("(no shared time codes)\n");
    }
    out
}

/// List of selectable prefectures.
pub fn format_prefectures() -> String {
    let mut out = String::new();
    for p in Prefecture::ALL {
        out.push_str(&format!(
            "{:<10} {}  {}\n",
            p.romaji().to_lowercase(),
            p.area_code(),
            p.display_name()
        ));
    }
    out
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{AnalysisRequest, AnalysisResult, Series};

    fn record(time: &str, d: Option<f64>, s: Option<f64>) -> MergedRecord {
        MergedRecord {
            time_code: time.to_string(),
            demand_value: d,
            supply_value: s,
            display_period: time[..6].to_string(),
        }
    }

    #[test]
    fn correlation_formatting() {
        assert_eq!(format_correlation(Some(0.87349)), "0.873");
        assert_eq!(format_correlation(Some(-1.0)), "-1.000");
        assert_eq!(format_correlation(None), NOT_COMPUTABLE);
    }

    #[test]
    fn merged_table_golden() {
        let rows = vec![
            record("20230101", Some(1200.0), Some(55.5)),
            record("20230201", Some(900.0), None),
        ];
        let expected = concat!(
            "period   time                 demand       supply\n",
            "202301   20230101               1200        55.50\n",
            "202302   20230201                900            -\n",
        );
        assert_eq!(format_merged_table(&rows), expected);
    }

    #[test]
    fn empty_table_says_so() {
        assert!(format_merged_table(&[]).ends_with("(no shared time codes)\n"));
    }

    #[test]
    fn summary_includes_advisory_only_outside_neutral_band() {
        let mut run = AnalysisRun {
            request: AnalysisRequest::default(),
            demand: Arc::new(Series::new("0003322112", "01000", vec![])),
            supply: Arc::new(Series::new("0003322113", "01000", vec![])),
            result: AnalysisResult {
                merged: vec![record("20230101", Some(1.0), Some(2.0))],
                correlation: Some(0.9),
                band: Band::StrongPositive,
            },
        };
        let text = format_run_summary(&run);
        assert!(text.contains("北海道 (Hokkaido, area 01000)"));
        assert!(text.contains("Correlation (guest nights vs occupancy): 0.900"));
        assert!(text.contains("[info] Strong positive correlation"));

        run.result.correlation = Some(0.5);
        run.result.band = Band::Neutral;
        let text = format_run_summary(&run);
        assert!(!text.contains("[info]"));
        assert!(!text.contains("[warn]"));

        run.result.correlation = None;
        let text = format_run_summary(&run);
        assert!(text.contains(NOT_COMPUTABLE));
    }

    #[test]
    fn prefecture_listing_has_every_entry() {
        let text = format_prefectures();
        assert_eq!(text.lines().count(), Prefecture::ALL.len());
        assert!(text.contains("okinawa    47000  沖縄県"));
    }
}
