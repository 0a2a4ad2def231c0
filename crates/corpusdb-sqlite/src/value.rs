//! Conversions between corpusdb values and engine values

use corpusdb_core::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};

/// Convert a corpusdb value into an owned engine value for binding
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(n) => SqlValue::Integer(*n),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}

/// Convert a borrowed engine value into a corpusdb value
pub fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_text() {
        let v = Value::Text("hello".into());
        let sql = to_sql_value(&v);
        assert_eq!(sql, SqlValue::Text("hello".into()));
    }

    #[test]
    fn test_from_value_ref_integer() {
        assert_eq!(from_value_ref(ValueRef::Integer(7)), Value::Integer(7));
        assert_eq!(from_value_ref(ValueRef::Null), Value::Null);
    }
}
