use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mapper::MapError;

/// A single driver-level value.
///
/// Cursors hand one of these over per column, and positional arguments
/// produced by the binder convert into them through `Reflect::to_value`.
/// The `to_*` helpers are the best-effort conversions the underlying scan
/// primitive applies: they accept the obvious neighbouring representations
/// (text digits into integers, integers into text, ...) and fail otherwise.
/// `Ok(None)` always means the value was NULL.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int64",
            SqlValue::Uint(_) => "uint64",
            SqlValue::Float(_) => "float64",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }

    pub fn to_i64(&self) -> Result<Option<i64>, MapError> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Int(v) => Ok(Some(*v)),
            SqlValue::Uint(v) => i64::try_from(*v)
                .map(Some)
                .map_err(|_| MapError::overflow(v, "i64")),
            SqlValue::Float(v) => {
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 {
                    Ok(Some(*v as i64))
                } else {
                    Err(MapError::unsupported(self, "i64"))
                }
            }
            SqlValue::Text(s) => parse_text(s.trim(), self, "i64"),
            SqlValue::Bytes(b) => parse_bytes(b, self, "i64"),
            _ => Err(MapError::unsupported(self, "i64")),
        }
    }

    pub fn to_u64(&self) -> Result<Option<u64>, MapError> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Uint(v) => Ok(Some(*v)),
            SqlValue::Int(v) => u64::try_from(*v)
                .map(Some)
                .map_err(|_| MapError::overflow(v, "u64")),
            SqlValue::Float(v) => {
                if v.fract() == 0.0 && *v >= 0.0 && *v < u64::MAX as f64 {
                    Ok(Some(*v as u64))
                } else {
                    Err(MapError::unsupported(self, "u64"))
                }
            }
            SqlValue::Text(s) => parse_text(s.trim(), self, "u64"),
            SqlValue::Bytes(b) => parse_bytes(b, self, "u64"),
            _ => Err(MapError::unsupported(self, "u64")),
        }
    }

    pub fn to_f64(&self) -> Result<Option<f64>, MapError> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Float(v) => Ok(Some(*v)),
            SqlValue::Int(v) => Ok(Some(*v as f64)),
            SqlValue::Uint(v) => Ok(Some(*v as f64)),
            SqlValue::Text(s) => parse_text(s.trim(), self, "f64"),
            SqlValue::Bytes(b) => parse_bytes(b, self, "f64"),
            _ => Err(MapError::unsupported(self, "f64")),
        }
    }

    /// Accepts the spellings `1, t, T, TRUE, true, True` and their false
    /// counterparts, plus integer 0/1.
    pub fn to_bool(&self) -> Result<Option<bool>, MapError> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Bool(v) => Ok(Some(*v)),
            SqlValue::Int(0) | SqlValue::Uint(0) => Ok(Some(false)),
            SqlValue::Int(1) | SqlValue::Uint(1) => Ok(Some(true)),
            SqlValue::Text(s) => parse_bool(s).map(Some).ok_or_else(|| MapError::unsupported(self, "bool")),
            SqlValue::Bytes(b) => std::str::from_utf8(b)
                .ok()
                .and_then(parse_bool)
                .map(Some)
                .ok_or_else(|| MapError::unsupported(self, "bool")),
            _ => Err(MapError::unsupported(self, "bool")),
        }
    }

    /// Every non-null value has a textual form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bool(v) => Some(v.to_string()),
            SqlValue::Int(v) => Some(v.to_string()),
            SqlValue::Uint(v) => Some(v.to_string()),
            SqlValue::Float(v) => Some(v.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            SqlValue::Timestamp(t) => Some(t.to_rfc3339()),
        }
    }

    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match self {
            SqlValue::Bytes(b) => Some(b.clone()),
            other => other.to_text().map(String::into_bytes),
        }
    }

    pub fn to_timestamp(&self) -> Result<Option<DateTime<Utc>>, MapError> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Timestamp(t) => Ok(Some(*t)),
            SqlValue::Text(_) | SqlValue::Bytes(_) => {
                let text = self.to_text().unwrap_or_default();
                DateTime::parse_from_rfc3339(text.trim())
                    .map(|t| Some(t.with_timezone(&Utc)))
                    .map_err(|_| MapError::unsupported(self, "timestamp"))
            }
            _ => Err(MapError::unsupported(self, "timestamp")),
        }
    }
}

fn parse_text<T: std::str::FromStr>(text: &str, value: &SqlValue, target: &str) -> Result<Option<T>, MapError> {
    text.parse::<T>()
        .map(Some)
        .map_err(|_| MapError::unsupported(value, target))
}

fn parse_bytes<T: std::str::FromStr>(bytes: &[u8], value: &SqlValue, target: &str) -> Result<Option<T>, MapError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_text(text.trim(), value, target),
        Err(_) => Err(MapError::unsupported(value, target)),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self { SqlValue::Bool(value) }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self { SqlValue::Int(i64::from(value)) }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self { SqlValue::Int(value) }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self { SqlValue::Uint(value) }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self { SqlValue::Float(value) }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self { SqlValue::Text(value.to_string()) }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self { SqlValue::Text(value) }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self { SqlValue::Bytes(value) }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self { SqlValue::Timestamp(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_i64_accepts_neighbouring_representations() {
        assert_eq!(SqlValue::Int(7).to_i64().unwrap(), Some(7));
        assert_eq!(SqlValue::Uint(7).to_i64().unwrap(), Some(7));
        assert_eq!(SqlValue::Text(" 42 ".into()).to_i64().unwrap(), Some(42));
        assert_eq!(SqlValue::Bytes(b"-3".to_vec()).to_i64().unwrap(), Some(-3));
        assert_eq!(SqlValue::Float(5.0).to_i64().unwrap(), Some(5));
        assert_eq!(SqlValue::Null.to_i64().unwrap(), None);
    }

    #[test]
    fn test_to_i64_rejects_lossy_values() {
        assert!(SqlValue::Float(5.5).to_i64().is_err());
        assert!(SqlValue::Uint(u64::MAX).to_i64().is_err());
        assert!(SqlValue::Bool(true).to_i64().is_err());
        assert!(SqlValue::Text("abc".into()).to_i64().is_err());
    }

    #[test]
    fn test_to_u64_rejects_negative() {
        assert!(SqlValue::Int(-1).to_u64().is_err());
        assert_eq!(SqlValue::Int(9).to_u64().unwrap(), Some(9));
    }

    #[test]
    fn test_to_bool_spellings() {
        assert_eq!(SqlValue::Text("t".into()).to_bool().unwrap(), Some(true));
        assert_eq!(SqlValue::Text("False".into()).to_bool().unwrap(), Some(false));
        assert_eq!(SqlValue::Int(1).to_bool().unwrap(), Some(true));
        assert!(SqlValue::Int(2).to_bool().is_err());
        assert!(SqlValue::Text("yes".into()).to_bool().is_err());
    }

    #[test]
    fn test_to_text_and_bytes() {
        assert_eq!(SqlValue::Int(12).to_text(), Some("12".to_string()));
        assert_eq!(SqlValue::Bool(true).to_bytes(), Some(b"true".to_vec()));
        assert_eq!(SqlValue::Bytes(vec![0xff, 0x00]).to_bytes(), Some(vec![0xff, 0x00]));
        assert_eq!(SqlValue::Null.to_text(), None);
    }

    #[test]
    fn test_to_timestamp_parses_rfc3339_text() {
        let ts = SqlValue::Text("2025-02-01T10:00:00Z".into()).to_timestamp().unwrap().unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-02-01T10:00:00+00:00");
        assert!(SqlValue::Int(1).to_timestamp().is_err());
    }
}
