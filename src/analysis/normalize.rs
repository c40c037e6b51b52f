//! Numeric coercion of raw `$` values.

use serde_json::Value;

use crate::domain::Series;

/// One observation reduced to what the join needs.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPoint {
    pub time_code: String,
    pub value: Option<f64>,
}

/// Coerce a raw API value to a finite number.
///
/// Strings are trimmed and parsed. Sentinels (`-`, `***`, `x`, `…`), empty
/// strings, non-finite numbers and non-scalar JSON all become `None`.
pub fn coerce_value(raw: Option<&Value>) -> Option<f64> {
    let v = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Normalize every observation of a series.
///
/// Observations without a time code are dropped: they cannot take part in the join.
pub fn normalize(series: &Series) -> Vec<NormalizedPoint> {
    series
        .observations
        .iter()
        .filter_map(|obs| {
            let time_code = obs.time_code.as_ref()?;
            Some(NormalizedPoint {
                time_code: time_code.clone(),
                value: coerce_value(obs.value.as_ref()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::Observation;

    #[test]
    fn coerces_strings_and_numbers() {
        assert_eq!(coerce_value(Some(&json!("100"))), Some(100.0));
        assert_eq!(coerce_value(Some(&json!(" 82.5 "))), Some(82.5));
        assert_eq!(coerce_value(Some(&json!("-3"))), Some(-3.0));
        assert_eq!(coerce_value(Some(&json!(12))), Some(12.0));
        assert_eq!(coerce_value(Some(&json!(0.25))), Some(0.25));
    }

    #[test]
    fn sentinels_and_garbage_become_missing() {
        for raw in ["-", "***", "x", "…", "", "bad", "1,234", "NaN", "inf"] {
            assert_eq!(coerce_value(Some(&json!(raw))), None, "value {raw:?}");
        }
        assert_eq!(coerce_value(Some(&json!(null))), None);
        assert_eq!(coerce_value(Some(&json!({ "nested": 1 }))), None);
        assert_eq!(coerce_value(None), None);
    }

    #[test]
    fn rows_without_time_code_are_dropped() {
        let mut no_time = Observation::new("20230101", "5");
        no_time.time_code = None;
        let series = Series::new("A", "13000", vec![Observation::new("20230201", "7"), no_time]);

        let points = normalize(&series);
        assert_eq!(
            points,
            vec![NormalizedPoint {
                time_code: "20230201".to_string(),
                value: Some(7.0)
            }]
        );
    }
}
