//! Export analysis results to CSV/JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::app::pipeline::AnalysisRun;
use crate::domain::{Band, MergedRecord, Prefecture};
use crate::error::AppError;

/// JSON export schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub prefecture: Prefecture,
    pub area_code: String,
    pub demand_id: String,
    pub supply_id: String,
    pub correlation: Option<f64>,
    pub band: Band,
    pub merged: Vec<MergedRecord>,
}

impl ResultFile {
    pub fn from_run(run: &AnalysisRun) -> Self {
        Self {
            tool: "estat".to_string(),
            generated_at: Local::now(),
            prefecture: run.request.prefecture,
            area_code: run.request.prefecture.area_code().to_string(),
            demand_id: run.request.demand_id.clone(),
            supply_id: run.request.supply_id.clone(),
            correlation: run.result.correlation,
            band: run.result.band,
            merged: run.result.merged.clone(),
        }
    }
}

const CSV_HEADER: [&str; 7] = [
    "display_period",
    "time_code",
    "area_code",
    "demand_id",
    "demand_value",
    "supply_id",
    "supply_value",
];

/// One merged row as written to the CSV export.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    display_period: &'a str,
    time_code: &'a str,
    area_code: &'a str,
    demand_id: &'a str,
    demand_value: Option<f64>,
    supply_id: &'a str,
    supply_value: Option<f64>,
}

/// Write the merged table to a CSV file. Missing values are empty cells.
pub fn write_merged_csv(path: &Path, run: &AnalysisRun) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    // The header is written by hand so an empty merge still yields one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    let area = run.request.prefecture.area_code();
    for r in &run.result.merged {
        writer
            .serialize(CsvRow {
                display_period: &r.display_period,
                time_code: &r.time_code,
                area_code: area,
                demand_id: &run.request.demand_id,
                demand_value: r.demand_value,
                supply_id: &run.request.supply_id,
                supply_value: r.supply_value,
            })
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the full analysis result to a JSON file.
pub fn write_result_json(path: &Path, run: &AnalysisRun) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), &ResultFile::from_run(run))
        .map_err(|e| AppError::io(format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::domain::{AnalysisRequest, AnalysisResult, Series};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("estat_export_{}_{name}", std::process::id()))
    }

    fn sample_run() -> AnalysisRun {
        AnalysisRun {
            request: AnalysisRequest {
                prefecture: Prefecture::Kyoto,
                demand_id: "D1".to_string(),
                supply_id: "S1".to_string(),
            },
            demand: Arc::new(Series::new("D1", "26000", vec![])),
            supply: Arc::new(Series::new("S1", "26000", vec![])),
            result: AnalysisResult {
                merged: vec![
                    MergedRecord {
                        time_code: "20230101".to_string(),
                        demand_value: Some(1500.0),
                        supply_value: Some(61.5),
                        display_period: "202301".to_string(),
                    },
                    MergedRecord {
                        time_code: "20230201".to_string(),
                        demand_value: Some(1700.0),
                        supply_value: None,
                        display_period: "202302".to_string(),
                    },
                ],
                correlation: None,
                band: Band::Neutral,
            },
        }
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let path = temp_path("merged.csv");
        write_merged_csv(&path, &sample_run()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "display_period,time_code,area_code,demand_id,demand_value,supply_id,supply_value",
                "202301,20230101,26000,D1,1500.0,S1,61.5",
                "202302,20230201,26000,D1,1700.0,S1,",
            ]
        );
    }

    #[test]
    fn csv_export_quotes_ids_containing_commas() {
        let mut run = sample_run();
        run.request.demand_id = "00033,22112".to_string();
        let path = temp_path("quoted.csv");
        write_merged_csv(&path, &run).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(text.contains("\"00033,22112\""), "{text}");

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.len(), 7);
            assert_eq!(&record[3], "00033,22112");
        }
    }

    #[test]
    fn csv_export_of_empty_merge_has_header_only() {
        let mut run = sample_run();
        run.result.merged.clear();
        let path = temp_path("empty.csv");
        write_merged_csv(&path, &run).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(
            text,
            "display_period,time_code,area_code,demand_id,demand_value,supply_id,supply_value\n"
        );
    }

    #[test]
    fn json_export_carries_request_and_result() {
        let path = temp_path("result.json");
        write_result_json(&path, &sample_run()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(value["tool"], "estat");
        assert_eq!(value["prefecture"], "kyoto");
        assert_eq!(value["area_code"], "26000");
        assert_eq!(value["band"], "NEUTRAL");
        assert!(value["correlation"].is_null());
        assert_eq!(value["merged"][1]["supply_value"], serde_json::Value::Null);
        assert_eq!(value["merged"][0]["display_period"], "202301");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let path = std::env::temp_dir().join("estat_missing_dir_for_test").join("x").join("out.csv");
        let err = write_merged_csv(&path, &sample_run()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        let err = write_result_json(&path.with_extension("json"), &sample_run()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
