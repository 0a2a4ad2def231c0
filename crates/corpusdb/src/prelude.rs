//! Convenience re-exports for typical use

pub use corpusdb_core::{
    ColumnDef, ColumnInfo, ColumnType, CorpusError, FetchMode, Frame, IngestReport, Result,
    StoreConfig, SynchronousMode, Value,
};
pub use corpusdb_sqlite::{SchemaManager, StoreHandle};

pub use crate::archive::{ArchiveManager, ARCHIVE_EXT};
pub use crate::db::CorpusDb;
pub use crate::ingest::{IngestionPipeline, CONTENT_COLUMN, IDENTIFIER_COLUMN};
pub use crate::query::{FrameChunks, QueryFacade};
