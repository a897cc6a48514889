use crate::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A single measured (or extracted) value of a metric.
///
/// [MetricValue::Missing] is the explicit sentinel for data that could not be obtained, for
/// example, because the run timed out. It flows through aggregation so that the final report can
/// show the value as not available instead of silently dropping it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// A textual value (e.g., a file path or an algorithm name).
    Text(String),
    /// A real number.
    Float(f64),
    /// An integer.
    Int(i64),
    /// The value is not available.
    Missing,
}

impl MetricValue {
    /// Returns true if this is the [MetricValue::Missing] sentinel.
    pub fn is_missing(&self) -> bool {
        matches!(self, MetricValue::Missing)
    }

    /// Returns the numeric value, if there is one.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Float(value) => Some(*value),
            MetricValue::Int(value) => Some(*value as f64),
            MetricValue::Text(_) | MetricValue::Missing => None,
        }
    }

    /// Returns the textual value, if there is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetricValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl Display for MetricValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Text(value) => f.write_str(value),
            MetricValue::Float(value) => write!(f, "{value}"),
            MetricValue::Int(value) => write!(f, "{value}"),
            MetricValue::Missing => f.write_str("n/a"),
        }
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_owned())
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Int(value)
    }
}

/// The declared type of an extracted metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coercion {
    /// Keep the matched text as is.
    Text,
    /// Parse the matched text as a real number.
    Float,
    /// Parse the matched text as an integer.
    Int,
}

impl Coercion {
    /// Coerces the raw matched text into a [MetricValue] of this type.
    pub fn coerce(self, raw: &str) -> Result<MetricValue, ExtractError> {
        let trimmed = raw.trim();
        let coercion_error = || ExtractError::Coercion {
            raw: raw.to_owned(),
            coercion: self,
        };
        match self {
            Coercion::Text => Ok(MetricValue::Text(trimmed.to_owned())),
            Coercion::Float => trimmed
                .parse::<f64>()
                .map(MetricValue::Float)
                .map_err(|_| coercion_error()),
            Coercion::Int => trimmed
                .parse::<i64>()
                .map(MetricValue::Int)
                .map_err(|_| coercion_error()),
        }
    }
}

impl Display for Coercion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Coercion::Text => "text",
            Coercion::Float => "float",
            Coercion::Int => "integer",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_values() -> Result<(), ExtractError> {
        assert_eq!(Coercion::Int.coerce("42")?, MetricValue::Int(42));
        assert_eq!(Coercion::Float.coerce(" 1.25")?, MetricValue::Float(1.25));
        assert_eq!(
            Coercion::Text.coerce("nlogn")?,
            MetricValue::Text("nlogn".to_owned())
        );
        Ok(())
    }

    #[test]
    fn coerce_invalid_int() {
        let error = Coercion::Int.coerce("1.5").unwrap_err();
        assert!(matches!(
            error,
            ExtractError::Coercion {
                coercion: Coercion::Int,
                ..
            }
        ));
    }

    #[test]
    fn serialized_form_is_type_tagged() {
        let json = serde_json::to_string(&MetricValue::Float(0.5)).unwrap();
        assert_eq!(json, r#"{"type":"float","value":0.5}"#);
        let json = serde_json::to_string(&MetricValue::Missing).unwrap();
        assert_eq!(json, r#"{"type":"missing"}"#);
    }

    #[test]
    fn numeric_view() {
        assert_eq!(MetricValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(MetricValue::Missing.as_f64(), None);
        assert_eq!(MetricValue::from("x").as_f64(), None);
    }
}
