//! e-Stat connection settings.
//!
//! Settings come from the process environment (after loading `.env`) and are
//! handed to `HttpStatsSource` as a plain value.

use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api.e-stat.go.jp/rest/3.0/app/json/getStatsData";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_APP_ID: &str = "ESTAT_APP_ID";
pub const ENV_BASE_URL: &str = "ESTAT_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "ESTAT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstatConfig {
    /// Application id issued by e-Stat (`appId`).
    pub app_id: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl EstatConfig {
    /// Load settings from `.env` + environment. `app_id` wins over `ESTAT_APP_ID` when given.
    pub fn from_env(app_id: Option<String>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(app_id, |key| std::env::var(key).ok())
    }

    /// Same as [`EstatConfig::from_env`] but with an injectable variable lookup.
    pub fn from_lookup<F>(app_id: Option<String>, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_id = app_id
            .or_else(|| lookup(ENV_APP_ID))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::config(format!(
                    "Missing {ENV_APP_ID} in environment (.env) and no --app-id given."
                ))
            })?;

        let base_url = lookup(ENV_BASE_URL)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(AppError::config(format!(
                        "Invalid {ENV_TIMEOUT_SECS} '{raw}': expected a positive number of seconds."
                    )));
                }
            },
        };

        Ok(Self {
            app_id,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_app_id_is_set() {
        let cfg = EstatConfig::from_lookup(None, lookup_from(&[(ENV_APP_ID, " abc123 ")])).unwrap();
        assert_eq!(cfg.app_id, "abc123");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn explicit_app_id_overrides_environment() {
        let cfg = EstatConfig::from_lookup(
            Some("from-flag".to_string()),
            lookup_from(&[(ENV_APP_ID, "from-env")]),
        )
        .unwrap();
        assert_eq!(cfg.app_id, "from-flag");
    }

    #[test]
    fn missing_app_id_is_a_config_error() {
        let err = EstatConfig::from_lookup(None, lookup_from(&[])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = EstatConfig::from_lookup(None, lookup_from(&[(ENV_APP_ID, "   ")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn base_url_and_timeout_are_overridable() {
        let cfg = EstatConfig::from_lookup(
            None,
            lookup_from(&[
                (ENV_APP_ID, "id"),
                (ENV_BASE_URL, "http://127.0.0.1:9/getStatsData"),
                (ENV_TIMEOUT_SECS, "5"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.base_url, "http://127.0.0.1:9/getStatsData");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        for raw in ["0", "-1", "soon"] {
            let err = EstatConfig::from_lookup(None, lookup_from(&[(ENV_APP_ID, "id"), (ENV_TIMEOUT_SECS, raw)]))
                .unwrap_err();
            assert_eq!(err.exit_code(), 2, "timeout {raw}");
        }
    }
}
