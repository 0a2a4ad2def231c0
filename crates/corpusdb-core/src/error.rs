use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("store unavailable at '{path}': {reason}")]
    StoreUnavailable { path: String, reason: String },

    #[error("handle is closed")]
    HandleClosed,

    #[error("table '{0}' already exists")]
    SchemaConflict(String),

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("row arity mismatch: expected {expected} values, got {actual}")]
    ColumnArityMismatch { expected: usize, actual: usize },

    #[error("duplicate value '{value}' for primary key '{column}' of table '{table}'")]
    DuplicateKey {
        table: String,
        column: String,
        value: String,
    },

    #[error("invalid fetch mode '{0}'")]
    InvalidFetchMode(String),

    #[error("archive integrity error: {0}")]
    ArchiveIntegrity(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("delimited input error: {0}")]
    Delimited(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("engine error: {0}")]
    Engine(String),

    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CorpusError>;
