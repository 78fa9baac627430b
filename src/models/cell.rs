//! Cell values for tabular snapshots
//!
//! Spreadsheet cells arrive as JSON strings, numbers or nothing at all. They
//! are modelled explicitly so that "blank" and "zero" never compare equal.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Largest integer an f64 represents exactly (2^53)
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single table cell
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// Absent or empty-string cell
    #[default]
    Empty,
    /// Numeric cell
    Number(f64),
    /// Any other text
    Text(String),
}

impl CellValue {
    /// Build a cell from text, mapping `""` to `Empty`
    pub fn from_text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    /// True for `Empty` and for text that is empty after trimming
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// Numeric view of an existing cell
    ///
    /// Text is trimmed and parsed as a plain decimal; currency symbols and
    /// thousands separators are not stripped here.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_decimal(s.trim()),
        }
    }

    /// Trimmed display form, used for key matching and header folding
    pub fn trimmed(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::from_text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::from_text(s)
    }
}

/// Coerce a raw request value into a number
///
/// Strings have `$` and `,` removed before parsing. Anything that is not a
/// finite number afterwards, including the empty string, yields `None`.
pub fn coerce_request_value(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
            parse_decimal(cleaned.trim())
        }
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    // Rust accepts "inf" and "nan" spellings; a cell value never should.
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_str(""),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = CellValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number, boolean or null")
            }

            fn visit_unit<E: de::Error>(self) -> Result<CellValue, E> {
                Ok(CellValue::Empty)
            }

            fn visit_none<E: de::Error>(self) -> Result<CellValue, E> {
                Ok(CellValue::Empty)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<CellValue, D::Error> {
                d.deserialize_any(CellVisitor)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<CellValue, E> {
                Ok(CellValue::Text(if v { "TRUE" } else { "FALSE" }.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CellValue, E> {
                Ok(CellValue::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CellValue, E> {
                Ok(CellValue::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<CellValue, E> {
                Ok(CellValue::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CellValue, E> {
                Ok(CellValue::from_text(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<CellValue, E> {
                Ok(CellValue::from_text(v))
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_is_not_zero() {
        assert!(CellValue::Empty.is_blank());
        assert_eq!(CellValue::Empty.as_number(), None);
        assert!(!CellValue::Number(0.0).is_blank());
        assert_eq!(CellValue::Number(0.0).as_number(), Some(0.0));
    }

    #[test]
    fn test_text_as_number() {
        assert_eq!(CellValue::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(CellValue::from("abc").as_number(), None);
        assert_eq!(CellValue::from("1,000").as_number(), None);
        assert_eq!(CellValue::from("NaN").as_number(), None);
        assert_eq!(CellValue::from("inf").as_number(), None);
    }

    #[test]
    fn test_coerce_request_value() {
        assert_eq!(coerce_request_value(&json!("1,200.50")), Some(1200.5));
        assert_eq!(coerce_request_value(&json!(" $3 ")), Some(3.0));
        assert_eq!(coerce_request_value(&json!(7)), Some(7.0));
        assert_eq!(coerce_request_value(&json!("abc")), None);
        assert_eq!(coerce_request_value(&json!("")), None);
        assert_eq!(coerce_request_value(&json!("$,")), None);
        assert_eq!(coerce_request_value(&json!(true)), None);
        assert_eq!(coerce_request_value(&json!(null)), None);
    }

    #[test]
    fn test_deserialize_from_sheet_json() {
        let row: Vec<CellValue> = serde_json::from_value(json!(["A", "", 10, 2.5, null])).unwrap();
        assert_eq!(
            row,
            vec![
                CellValue::Text("A".into()),
                CellValue::Empty,
                CellValue::Number(10.0),
                CellValue::Number(2.5),
                CellValue::Empty,
            ]
        );
    }

    #[test]
    fn test_integral_numbers_serialize_as_integers() {
        let json = serde_json::to_string(&vec![
            CellValue::Number(1000.0),
            CellValue::Number(1200.5),
            CellValue::Empty,
        ])
        .unwrap();
        assert_eq!(json, r#"[1000,1200.5,""]"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::from("  MCH ").trimmed(), "MCH");
    }
}
