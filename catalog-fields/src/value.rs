//! Field values and coercion from raw input.
//!
//! Raw records arrive as JSON values keyed by field name. Each value is
//! coerced through the [`FieldType`] of its definition into a [`FieldValue`],
//! so downstream code never branches on type strings.

use chrono::{DateTime, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::FieldType;
use crate::validation::ViolationReason;

/// A raw, unvalidated record: field name to submitted value, in submission order.
pub type RawRecord = IndexMap<String, Value>;

/// Date format used for date fields on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A normalized field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Select(String),
    /// An optional field submitted blank.
    Empty,
}

impl FieldValue {
    /// Coerce a non-blank raw value into the shape `field_type` demands.
    pub fn coerce(field_type: &FieldType, raw: &Value) -> Result<Self, ViolationReason> {
        match field_type {
            FieldType::Text | FieldType::Textarea => match raw {
                Value::String(s) => Ok(FieldValue::Text(s.clone())),
                Value::Number(n) => Ok(FieldValue::Text(n.to_string())),
                Value::Bool(b) => Ok(FieldValue::Text(b.to_string())),
                _ => Err(ViolationReason::TypeMismatch),
            },
            FieldType::Number => {
                let n = match raw {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                n.filter(|n| n.is_finite())
                    .map(FieldValue::Number)
                    .ok_or(ViolationReason::TypeMismatch)
            }
            FieldType::Date => raw
                .as_str()
                .and_then(|s| parse_date(s.trim()))
                .map(FieldValue::Date)
                .ok_or(ViolationReason::TypeMismatch),
            FieldType::Select { options } => match raw {
                Value::String(s) if options.iter().any(|o| o == s) => {
                    Ok(FieldValue::Select(s.clone()))
                }
                _ => Err(ViolationReason::TypeMismatch),
            },
        }
    }

    /// Convert back to the raw JSON shape the validator accepts.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) | FieldValue::Select(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
            FieldValue::Empty => Value::Null,
        }
    }

    /// String content of text and select values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Select(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Select(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FieldValue::Empty => Ok(()),
        }
    }
}

/// Null, or a string that is empty after trimming.
pub fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parse `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn select(options: &[&str]) -> FieldType {
        FieldType::Select {
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn text_accepts_scalars() {
        assert_eq!(
            FieldValue::coerce(&FieldType::Text, &json!("Cereal")),
            Ok(FieldValue::Text("Cereal".into()))
        );
        assert_eq!(
            FieldValue::coerce(&FieldType::Textarea, &json!(12)),
            Ok(FieldValue::Text("12".into()))
        );
        assert_eq!(
            FieldValue::coerce(&FieldType::Text, &json!(["a"])),
            Err(ViolationReason::TypeMismatch)
        );
    }

    #[test]
    fn number_parses_strings_and_rejects_non_finite() {
        assert_eq!(
            FieldValue::coerce(&FieldType::Number, &json!(" 2.5 ")),
            Ok(FieldValue::Number(2.5))
        );
        assert_eq!(
            FieldValue::coerce(&FieldType::Number, &json!(7)),
            Ok(FieldValue::Number(7.0))
        );
        for bad in [json!("not-a-number"), json!("inf"), json!("NaN"), json!(true)] {
            assert_eq!(
                FieldValue::coerce(&FieldType::Number, &bad),
                Err(ViolationReason::TypeMismatch),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn date_requires_real_calendar_day() {
        assert_eq!(
            FieldValue::coerce(&FieldType::Date, &json!("2023-05-15")),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2023, 5, 15).unwrap()))
        );
        assert_eq!(
            FieldValue::coerce(&FieldType::Date, &json!("2023-06-22T10:00:00Z")),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2023, 6, 22).unwrap()))
        );
        assert_eq!(
            FieldValue::coerce(&FieldType::Date, &json!("2023-02-30")),
            Err(ViolationReason::TypeMismatch)
        );
        assert_eq!(
            FieldValue::coerce(&FieldType::Date, &json!(20230515)),
            Err(ViolationReason::TypeMismatch)
        );
    }

    #[test]
    fn select_requires_exact_option() {
        let ft = select(&["A", "B"]);
        assert_eq!(
            FieldValue::coerce(&ft, &json!("A")),
            Ok(FieldValue::Select("A".into()))
        );
        assert_eq!(
            FieldValue::coerce(&ft, &json!("B")),
            Ok(FieldValue::Select("B".into()))
        );
        assert_eq!(
            FieldValue::coerce(&ft, &json!("C")),
            Err(ViolationReason::TypeMismatch)
        );
        assert_eq!(
            FieldValue::coerce(&ft, &json!("a")),
            Err(ViolationReason::TypeMismatch)
        );
    }

    #[test]
    fn to_json_round_trips_through_coerce() {
        let cases = [
            (FieldType::Text, FieldValue::Text("x".into())),
            (FieldType::Number, FieldValue::Number(-3.25)),
            (
                FieldType::Date,
                FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            ),
            (select(&["A"]), FieldValue::Select("A".into())),
        ];
        for (ft, value) in cases {
            assert_eq!(FieldValue::coerce(&ft, &value.to_json()), Ok(value));
        }
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("   ")));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!("x")));
    }
}
