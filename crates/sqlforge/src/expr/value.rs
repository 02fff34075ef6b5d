//! Literal values and their SQL text.

use crate::error::{SqlError, SqlResult};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;
use uuid::Uuid;

/// A literal SQL value.
///
/// Text is emitted single-quoted without escaping; untrusted input should be
/// passed as a named parameter instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Rendered as an ISO-8601 instant with millisecond precision.
    Timestamp(DateTime<Utc>),
    /// Rendered as a `\x` hex escape.
    Bytes(Vec<u8>),
    Uuid(Uuid),
    /// Rendered as compact JSON text.
    Json(serde_json::Value),
}

impl SqlValue {
    /// SQL text for this literal. Non-finite floats have no literal form.
    pub fn to_sql(&self) -> SqlResult<String> {
        let sql = match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) if !f.is_finite() => {
                return Err(SqlError::invalid_expression(format!(
                    "float literal {f} has no SQL representation"
                )));
            }
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => format!("'{s}'"),
            SqlValue::Timestamp(ts) => {
                format!("'{}'", ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            SqlValue::Bytes(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2 + 4);
                out.push_str("'\\x");
                for b in bytes {
                    let _ = write!(out, "{b:02x}");
                }
                out.push('\'');
                out
            }
            SqlValue::Uuid(id) => format!("'{}'", id.hyphenated()),
            SqlValue::Json(v) => format!("'{v}'"),
        };
        Ok(sql)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    SqlValue::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Float(f64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(v: &[u8]) -> Self {
        SqlValue::Bytes(v.to_vec())
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        SqlValue::Json(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn scalars() {
        assert_eq!(SqlValue::from(42i32).to_sql().unwrap(), "42");
        assert_eq!(SqlValue::from(-7i64).to_sql().unwrap(), "-7");
        assert_eq!(SqlValue::from(1.5f64).to_sql().unwrap(), "1.5");
        assert_eq!(SqlValue::from(true).to_sql().unwrap(), "true");
        assert_eq!(SqlValue::from(false).to_sql().unwrap(), "false");
        assert_eq!(SqlValue::Null.to_sql().unwrap(), "NULL");
        assert_eq!(SqlValue::from(None::<i32>).to_sql().unwrap(), "NULL");
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                SqlValue::from(f).to_sql(),
                Err(SqlError::InvalidExpression(_))
            ));
        }
    }

    #[test]
    fn text_is_quoted_verbatim() {
        assert_eq!(SqlValue::from("abc").to_sql().unwrap(), "'abc'");
    }

    #[test]
    fn timestamp_is_iso_instant() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(SqlValue::from(ts).to_sql().unwrap(), "'2024-01-02T03:04:05.000Z'");
    }

    #[test]
    fn bytes_are_hex_escaped() {
        assert_eq!(SqlValue::from(vec![0x0au8, 0xff]).to_sql().unwrap(), "'\\x0aff'");
    }

    #[test]
    fn json_is_compact_text() {
        let v = serde_json::json!({"a": 1});
        assert_eq!(SqlValue::from(v).to_sql().unwrap(), "'{\"a\":1}'");
    }

    #[test]
    fn uuid_is_hyphenated() {
        let id = Uuid::nil();
        assert_eq!(
            SqlValue::from(id).to_sql().unwrap(),
            "'00000000-0000-0000-0000-000000000000'"
        );
    }
}
