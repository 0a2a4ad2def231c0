//! In-memory tabular batches
//!
//! A [`Frame`] is the unit of bulk ingestion: an ordered list of named
//! columns and an ordered list of rows, independent of any store. Every row
//! must match the frame's column arity; a mismatch is rejected up front so a
//! malformed batch never reaches the insert path.

use crate::error::{CorpusError, Result};

/// A single scalar cell value
///
/// Mirrors the storage classes of the underlying engine. Everything the
/// ingestion pipeline produces is `Text`; the other variants exist for
/// callers that assert stronger typing on their own columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Borrow the text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the value for error reports and logs
    pub fn display_text(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Blob(b) => format!("blob({} bytes)", b.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

/// An in-memory table-shaped batch of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Create an empty frame with the given column names
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, enforcing column arity
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(CorpusError::ColumnArityMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Consume the frame, yielding its rows
    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_enforces_arity() {
        let mut frame = Frame::new(vec!["id", "body"]);
        frame
            .push_row(vec![Value::from("a"), Value::from("hello")])
            .unwrap();

        let err = frame.push_row(vec![Value::from("b")]).unwrap_err();
        assert!(matches!(
            err,
            CorpusError::ColumnArityMismatch {
                expected: 2,
                actual: 1
            }
        ));

        // The bad row must not have been appended
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_column_index() {
        let frame = Frame::new(vec!["id", "body"]);
        assert_eq!(frame.column_index("body"), Some(1));
        assert_eq!(frame.column_index("missing"), None);
    }

    #[test]
    fn test_value_display_text() {
        assert_eq!(Value::Null.display_text(), "NULL");
        assert_eq!(Value::Integer(7).display_text(), "7");
        assert_eq!(Value::from("x").display_text(), "x");
    }
}
