use crate::error::CorpusError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Declared storage type of a column
///
/// Source corpora (free text, arbitrary CSV) carry no reliable implicit
/// typing, so everything defaults to `Text` unless the caller asserts
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnType {
    #[default]
    Text,
    Integer,
    Real,
    Blob,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Blob => "BLOB",
        }
    }
}

/// A column declaration for table creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
    /// Constraint fragment, e.g. "PRIMARY KEY" or "NOT NULL"
    pub constraint: String,
}

impl ColumnDef {
    /// A plain text column with no constraint
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ty: ColumnType::default(),
            constraint: String::new(),
        }
    }

    pub fn with_type(mut self, ty: ColumnType) -> Self {
        self.ty = ty;
        self
    }

    pub fn with_constraint<S: Into<String>>(mut self, constraint: S) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Shorthand for the common `TEXT PRIMARY KEY` column
    pub fn primary_key<S: Into<String>>(name: S) -> Self {
        Self::new(name).with_constraint("PRIMARY KEY")
    }
}

/// One row of table introspection output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    pub ty: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

/// How many rows a staged query fetch should materialize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Everything the staged query produces
    All,
    /// The next batch; `None` uses the implementation default
    Many(Option<usize>),
    /// At most one row
    One,
}

impl FromStr for FetchMode {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(FetchMode::All),
            "many" => Ok(FetchMode::Many(None)),
            "one" => Ok(FetchMode::One),
            other => Err(CorpusError::InvalidFetchMode(other.to_string())),
        }
    }
}

/// Summary of a bulk ingestion batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Rows actually inserted
    pub inserted: usize,
    /// Rows skipped because their primary key already existed
    pub duplicates: usize,
}

impl IngestReport {
    /// Total rows the batch attempted
    pub fn attempted(&self) -> usize {
        self.inserted + self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_mode_parsing() {
        assert_eq!("all".parse::<FetchMode>().unwrap(), FetchMode::All);
        assert_eq!("MANY".parse::<FetchMode>().unwrap(), FetchMode::Many(None));
        assert_eq!("one".parse::<FetchMode>().unwrap(), FetchMode::One);

        let err = "bogus".parse::<FetchMode>().unwrap_err();
        assert!(matches!(err, CorpusError::InvalidFetchMode(m) if m == "bogus"));
    }

    #[test]
    fn test_column_def_builders() {
        let col = ColumnDef::primary_key("File");
        assert_eq!(col.ty, ColumnType::Text);
        assert_eq!(col.constraint, "PRIMARY KEY");

        let col = ColumnDef::new("n").with_type(ColumnType::Integer);
        assert_eq!(col.ty.as_sql(), "INTEGER");
        assert!(col.constraint.is_empty());
    }
}
