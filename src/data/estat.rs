//! e-Stat `getStatsData` integration.
//!
//! `StatFetcher` is the only entry point the rest of the crate uses. It turns
//! every failure into [`FetchOutcome::Unavailable`]; the typed [`FetchError`]
//! only lives long enough to be logged.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::config::EstatConfig;
use crate::domain::{Observation, Series};
use crate::error::AppError;

/// Lower time bound sent as `cdTimeFrom`. Older rows are filtered server-side.
pub const TIME_FROM: &str = "20190101";

const VALUE_POINTER: &str = "/GET_STATS_DATA/STATISTICAL_DATA/DATA_INF/VALUE";
const ERROR_MSG_POINTER: &str = "/GET_STATS_DATA/RESULT/ERROR_MSG";

/// Why a fetch did not produce a series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("response body is not JSON: {0}")]
    Decode(String),

    #[error("response has no VALUE list{}", .api_message.as_ref().map(|m| format!(" (API says: {m})")).unwrap_or_default())]
    MissingValues { api_message: Option<String> },

    #[error("VALUE list is malformed: {0}")]
    MalformedValues(String),
}

/// Query parameters for one `getStatsData` call (minus the credential).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsQuery<'a> {
    pub stat_id: &'a str,
    pub area_code: &'a str,
}

impl<'a> StatsQuery<'a> {
    pub fn new(stat_id: &'a str, area_code: &'a str) -> Self {
        Self { stat_id, area_code }
    }

    /// Full parameter list in the order it is sent.
    pub fn params<'b>(&'b self, app_id: &'b str) -> [(&'static str, &'b str); 4] {
        [
            ("appId", app_id),
            ("statsDataId", self.stat_id),
            ("cdArea", self.area_code),
            ("cdTimeFrom", TIME_FROM),
        ]
    }
}

/// Network seam: returns the decoded JSON body of a successful (HTTP 200) call.
pub trait StatsSource: Send + Sync {
    fn get_stats_data(&self, query: &StatsQuery<'_>) -> Result<Value, FetchError>;
}

/// Blocking reqwest implementation of [`StatsSource`].
pub struct HttpStatsSource {
    client: Client,
    config: EstatConfig,
}

impl HttpStatsSource {
    pub fn new(config: EstatConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env(app_id: Option<String>) -> Result<Self, AppError> {
        Self::new(EstatConfig::from_env(app_id)?)
    }
}

impl StatsSource for HttpStatsSource {
    fn get_stats_data(&self, query: &StatsQuery<'_>) -> Result<Value, FetchError> {
        debug!(
            stat_id = query.stat_id,
            area_code = query.area_code,
            url = %self.config.base_url,
            "requesting getStatsData"
        );

        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&query.params(&self.config.app_id))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        resp.json::<Value>().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Decode(e.to_string())
            }
        })
    }
}

/// Pull the observation list out of a `getStatsData` body.
///
/// e-Stat returns a bare object instead of a one-element array when a query
/// matches a single cell; both shapes are accepted.
pub fn extract_observations(mut body: Value) -> Result<Vec<Observation>, FetchError> {
    let Some(values) = body.pointer_mut(VALUE_POINTER).map(Value::take) else {
        let api_message = body
            .pointer(ERROR_MSG_POINTER)
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(FetchError::MissingValues { api_message });
    };

    let items = match values {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => {
            return Err(FetchError::MalformedValues(format!(
                "expected an array of records, found {}",
                json_kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<Observation>(item)
                .map_err(|e| FetchError::MalformedValues(format!("record {idx}: {e}")))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Result of [`StatFetcher::fetch`]. `Unavailable` is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Available(Arc<Series>),
    Unavailable,
}

impl FetchOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, FetchOutcome::Available(_))
    }

    pub fn into_series(self) -> Option<Arc<Series>> {
        match self {
            FetchOutcome::Available(series) => Some(series),
            FetchOutcome::Unavailable => None,
        }
    }
}

type CacheKey = (String, String);

/// Memoizing fetcher over a [`StatsSource`].
///
/// Successful series are cached per `(stat_id, area_code)` for the lifetime of
/// the fetcher; failures are not cached so a later call can succeed.
pub struct StatFetcher<S = HttpStatsSource> {
    source: S,
    cache: RwLock<HashMap<CacheKey, Arc<Series>>>,
}

impl<S: StatsSource> StatFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of memoized series.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn fetch(&self, stat_id: &str, area_code: &str) -> FetchOutcome {
        let key = (stat_id.to_string(), area_code.to_string());
        if let Some(hit) = self.cache.read().get(&key).cloned() {
            debug!(stat_id, area_code, rows = hit.len(), "stats cache hit");
            return FetchOutcome::Available(hit);
        }

        match self.fetch_uncached(stat_id, area_code) {
            Ok(series) => {
                let series = Arc::new(series);
                debug!(stat_id, area_code, rows = series.len(), "stats fetched");
                // Concurrent misses on the same key both land here; the last insert wins.
                self.cache.write().insert(key, Arc::clone(&series));
                FetchOutcome::Available(series)
            }
            Err(err) => {
                warn!(stat_id, area_code, error = %err, "stats unavailable");
                FetchOutcome::Unavailable
            }
        }
    }

    fn fetch_uncached(&self, stat_id: &str, area_code: &str) -> Result<Series, FetchError> {
        let body = self.source.get_stats_data(&StatsQuery::new(stat_id, area_code))?;
        let observations = extract_observations(body)?;
        Ok(Series::new(stat_id, area_code, observations))
    }
}
