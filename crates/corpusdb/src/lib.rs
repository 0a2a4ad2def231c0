//! Corpusdb: a schema-flexible tabular store for bulk text corpora
//!
//! Corpusdb ingests large numbers of plain-text files (or delimited
//! exports) into named tables inside a single SQLite file, supports ad-hoc
//! querying and statistics over those tables, and manages the store's
//! at-rest footprint by packing it into a verified zip archive when idle.
//!
//! # Quick Start
//!
//! ```no_run
//! use corpusdb::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<()> {
//! // Open (restoring from an archive if one exists)
//! let db = CorpusDb::connect("./articles.db", true)?;
//!
//! // Ingest a directory of .txt files into a fresh table
//! let report = db.ingest().ingest_dir(Path::new("./corpus"), "Docs", true, None)?;
//! println!("ingested {} files", report.inserted);
//!
//! // Query it back
//! let total = db.query().count("*", "Docs")?;
//! let paragraphs = db.query().paragraph_count("Docs", "content")?;
//! println!("{total} docs, {} paragraph counts", paragraphs.len());
//!
//! // Pack the store when idle
//! db.pack(None)?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod db;
pub mod ingest;
pub mod prelude;
pub mod query;

// Re-export core types
pub use corpusdb_core::{
    ColumnDef, ColumnInfo, ColumnType, CorpusError, FetchMode, Frame, IngestReport, ProgressFn,
    Result, StoreConfig, SynchronousMode, Value,
};

// Re-export the engine binding
pub use corpusdb_sqlite::{SchemaManager, StoreHandle, DEFAULT_FETCH_BATCH};

// Re-export main types from this crate
pub use archive::{ArchiveManager, ARCHIVE_EXT};
pub use db::CorpusDb;
#[allow(deprecated)]
pub use db::open_article_store;
pub use ingest::{IngestionPipeline, CONTENT_COLUMN, IDENTIFIER_COLUMN};
pub use query::{FrameChunks, QueryFacade};
