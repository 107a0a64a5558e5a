use eventclass::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::num::NonZeroUsize;

/// Body of `POST /analyze_events`. The count may arrive as a number or a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub num_events: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountError {
    Missing,
    NotNumeric,
    NotPositive,
    TooLarge { max: usize },
}

impl fmt::Display for CountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountError::Missing => f.write_str("num_events is required"),
            CountError::NotNumeric => f.write_str("num_events must be an integer"),
            CountError::NotPositive => f.write_str("num_events must be a positive integer"),
            CountError::TooLarge { max } => {
                write!(f, "num_events must not exceed {}", max)
            }
        }
    }
}

impl std::error::Error for CountError {}

fn positive(value: u64) -> Result<NonZeroUsize, CountError> {
    let value = usize::try_from(value).map_err(|_| CountError::NotNumeric)?;
    NonZeroUsize::new(value).ok_or(CountError::NotPositive)
}

/// Validates the requested batch size before any work is done.
pub fn parse_event_count(
    value: Option<&Value>,
    max_events: usize,
) -> Result<NonZeroUsize, CountError> {
    let count = parse_positive(value)?;
    if count.get() > max_events {
        return Err(CountError::TooLarge { max: max_events });
    }
    Ok(count)
}

fn parse_positive(value: Option<&Value>) -> Result<NonZeroUsize, CountError> {
    match value {
        None | Some(Value::Null) => Err(CountError::Missing),
        Some(Value::Number(number)) => {
            if let Some(value) = number.as_u64() {
                positive(value)
            } else if number.as_i64().is_some() {
                Err(CountError::NotPositive)
            } else {
                match number.as_f64() {
                    Some(value) if value.fract() != 0.0 || !value.is_finite() => {
                        Err(CountError::NotNumeric)
                    }
                    Some(value) if value <= 0.0 => Err(CountError::NotPositive),
                    Some(value) if value <= u64::MAX as f64 => positive(value as u64),
                    _ => Err(CountError::NotNumeric),
                }
            }
        }
        Some(Value::String(text)) => match text.trim().parse::<i64>() {
            Ok(value) if value <= 0 => Err(CountError::NotPositive),
            Ok(value) => positive(value as u64),
            Err(_) => Err(CountError::NotNumeric),
        },
        Some(_) => Err(CountError::NotNumeric),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub model: String,
    pub layout: String,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<usize, CountError> {
        parse_event_count(Some(&value), 1000).map(NonZeroUsize::get)
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(parse(json!(5)), Ok(5));
        assert_eq!(parse(json!("12")), Ok(12));
        assert_eq!(parse(json!(" 3 ")), Ok(3));
        assert_eq!(parse(json!(4.0)), Ok(4));
    }

    #[test]
    fn rejects_non_positive_counts() {
        assert_eq!(parse(json!(0)), Err(CountError::NotPositive));
        assert_eq!(parse(json!(-2)), Err(CountError::NotPositive));
        assert_eq!(parse(json!("0")), Err(CountError::NotPositive));
        assert_eq!(parse(json!("-7")), Err(CountError::NotPositive));
    }

    #[test]
    fn rejects_counts_above_limit() {
        assert_eq!(parse(json!(1000)), Ok(1000));
        assert_eq!(parse(json!(1001)), Err(CountError::TooLarge { max: 1000 }));
        assert_eq!(
            parse(json!("1000000000000")),
            Err(CountError::TooLarge { max: 1000 })
        );
        assert_eq!(
            CountError::TooLarge { max: 1000 }.to_string(),
            "num_events must not exceed 1000"
        );
    }

    #[test]
    fn rejects_non_numeric_counts() {
        assert_eq!(parse(json!("ten")), Err(CountError::NotNumeric));
        assert_eq!(parse(json!("2.5")), Err(CountError::NotNumeric));
        assert_eq!(parse(json!(2.5)), Err(CountError::NotNumeric));
        assert_eq!(parse(json!(true)), Err(CountError::NotNumeric));
        assert_eq!(parse(json!([3])), Err(CountError::NotNumeric));
        assert_eq!(parse_event_count(None, 1000), Err(CountError::Missing));
        assert_eq!(parse(Value::Null), Err(CountError::Missing));
    }
}
