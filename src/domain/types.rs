//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the fetch layer and the analysis pipeline
//! - exported to JSON/CSV
//! - rendered by both the CLI and the TUI

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default statistic table id for the demand side (guest nights).
pub const DEFAULT_DEMAND_ID: &str = "0003322112";

/// Default statistic table id for the supply side (room occupancy rate).
pub const DEFAULT_SUPPLY_ID: &str = "0003322113";

/// Prefectures offered by the selector.
///
/// The set is closed: area codes outside this list are never sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Prefecture {
    Hokkaido,
    Miyagi,
    Tokyo,
    Ishikawa,
    Shizuoka,
    Aichi,
    Kyoto,
    Osaka,
    Hiroshima,
    Fukuoka,
    Okinawa,
}

impl Prefecture {
    pub const ALL: [Prefecture; 11] = [
        Prefecture::Hokkaido,
        Prefecture::Miyagi,
        Prefecture::Tokyo,
        Prefecture::Ishikawa,
        Prefecture::Shizuoka,
        Prefecture::Aichi,
        Prefecture::Kyoto,
        Prefecture::Osaka,
        Prefecture::Hiroshima,
        Prefecture::Fukuoka,
        Prefecture::Okinawa,
    ];

    /// 5-digit e-Stat area code (`cdArea`).
    pub fn area_code(self) -> &'static str {
        match self {
            Prefecture::Hokkaido => "01000",
            Prefecture::Miyagi => "04000",
            Prefecture::Tokyo => "13000",
            Prefecture::Ishikawa => "17000",
            Prefecture::Shizuoka => "22000",
            Prefecture::Aichi => "23000",
            Prefecture::Kyoto => "26000",
            Prefecture::Osaka => "27000",
            Prefecture::Hiroshima => "34000",
            Prefecture::Fukuoka => "40000",
            Prefecture::Okinawa => "47000",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Prefecture::Hokkaido => "北海道",
            Prefecture::Miyagi => "宮城県",
            Prefecture::Tokyo => "東京都",
            Prefecture::Ishikawa => "石川県",
            Prefecture::Shizuoka => "静岡県",
            Prefecture::Aichi => "愛知県",
            Prefecture::Kyoto => "京都府",
            Prefecture::Osaka => "大阪府",
            Prefecture::Hiroshima => "広島県",
            Prefecture::Fukuoka => "福岡県",
            Prefecture::Okinawa => "沖縄県",
        }
    }

    pub fn romaji(self) -> &'static str {
        match self {
            Prefecture::Hokkaido => "Hokkaido",
            Prefecture::Miyagi => "Miyagi",
            Prefecture::Tokyo => "Tokyo",
            Prefecture::Ishikawa => "Ishikawa",
            Prefecture::Shizuoka => "Shizuoka",
            Prefecture::Aichi => "Aichi",
            Prefecture::Kyoto => "Kyoto",
            Prefecture::Osaka => "Osaka",
            Prefecture::Hiroshima => "Hiroshima",
            Prefecture::Fukuoka => "Fukuoka",
            Prefecture::Okinawa => "Okinawa",
        }
    }

    pub fn from_area_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.area_code() == code)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    /// Next prefecture in selector order (wraps around).
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous prefecture in selector order (wraps around).
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// One raw record from `GET_STATS_DATA.STATISTICAL_DATA.DATA_INF.VALUE`.
///
/// Values are kept exactly as delivered; numeric coercion happens in the
/// analysis pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    /// 8-digit reporting period, usually `YYYYMMDD` even for monthly tables.
    #[serde(rename = "@time", default, skip_serializing_if = "Option::is_none")]
    pub time_code: Option<String>,
    /// The `$` field: a string in practice, occasionally a number or a
    /// "not applicable" sentinel such as `-` or `***`.
    #[serde(rename = "$", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Every other key the API supplied (`@tab`, `@cat01`, `@area`, `@unit`, ...).
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Observation {
    /// Convenience constructor for a record with a string value.
    pub fn new(time_code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            time_code: Some(time_code.into()),
            value: Some(serde_json::Value::String(value.into())),
            attributes: BTreeMap::new(),
        }
    }
}

/// Observations of one statistic table for one area, in API order.
///
/// Neither sorted by time nor free of duplicate time codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub stat_id: String,
    pub area_code: String,
    pub observations: Vec<Observation>,
}

impl Series {
    pub fn new(stat_id: impl Into<String>, area_code: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            stat_id: stat_id.into(),
            area_code: area_code.into(),
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// One row of the inner join of demand and supply.
///
/// A value is `None` when the source field could not be coerced to a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub time_code: String,
    pub demand_value: Option<f64>,
    pub supply_value: Option<f64>,
    /// First 6 characters of `time_code` (`YYYYMM`).
    pub display_period: String,
}

impl MergedRecord {
    /// Both values, when the row can take part in the correlation.
    pub fn complete_pair(&self) -> Option<(f64, f64)> {
        Some((self.demand_value?, self.supply_value?))
    }
}

/// Qualitative strength of the correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Band {
    StrongPositive,
    Weak,
    Neutral,
}

impl Band {
    pub fn display_name(self) -> &'static str {
        match self {
            Band::StrongPositive => "strong positive",
            Band::Weak => "weak",
            Band::Neutral => "neutral",
        }
    }

    /// Canned advisory shown for the band. The neutral band has none.
    pub fn advisory(self) -> Option<&'static str> {
        match self {
            Band::StrongPositive => Some(
                "Strong positive correlation: occupancy rises and falls together with guest numbers.",
            ),
            Band::Weak => Some(
                "Low correlation: room capacity may have changed, or the two tables define their figures differently.",
            ),
            Band::Neutral => None,
        }
    }
}

/// Output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub merged: Vec<MergedRecord>,
    /// Pearson coefficient in `[-1, 1]`; `None` when not computable.
    pub correlation: Option<f64>,
    pub band: Band,
}

impl AnalysisResult {
    /// Number of merged rows with both values present.
    pub fn complete_rows(&self) -> usize {
        self.merged.iter().filter(|r| r.complete_pair().is_some()).count()
    }
}

/// What the user asked to analyze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub prefecture: Prefecture,
    pub demand_id: String,
    pub supply_id: String,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            prefecture: Prefecture::Hokkaido,
            demand_id: DEFAULT_DEMAND_ID.to_string(),
            supply_id: DEFAULT_SUPPLY_ID.to_string(),
        }
    }
}
