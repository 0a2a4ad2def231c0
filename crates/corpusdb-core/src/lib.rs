//! Corpusdb core: types, errors and configuration for the corpus store
//!
//! This crate defines the engine-independent pieces of corpusdb:
//! - Error taxonomy and `Result` alias
//! - Store configuration
//! - The `Frame` ingestion unit and `Value` scalar
//! - Column declarations and introspection rows
//!
//! The SQLite binding lives in `corpusdb-sqlite`; the ingestion, query and
//! archive managers live in `corpusdb`.

pub mod config;
pub mod error;
pub mod frame;
pub mod types;

pub use config::{StoreConfig, SynchronousMode};
pub use error::{CorpusError, Result};
pub use frame::{Frame, Value};
pub use types::{ColumnDef, ColumnInfo, ColumnType, FetchMode, IngestReport};

/// Progress callback invoked with (current index, total count)
///
/// Absence of a callback is a no-op, not an error.
pub type ProgressFn<'a> = &'a dyn Fn(usize, usize);
