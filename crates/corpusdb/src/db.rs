//! Unified corpus database interface
//!
//! Bundles the store handle with manager views so a caller can open a
//! store, define tables, ingest a corpus, query it back and archive it
//! through one entry point.

use std::path::{Path, PathBuf};

use corpusdb_core::{ProgressFn, Result, StoreConfig};
use corpusdb_sqlite::{SchemaManager, StoreHandle};

use crate::archive::ArchiveManager;
use crate::ingest::IngestionPipeline;
use crate::query::QueryFacade;

/// A corpus store: one SQLite file, opened for exclusive use
pub struct CorpusDb {
    handle: StoreHandle,
    config: StoreConfig,
}

impl CorpusDb {
    /// Open (creating if absent) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(StoreConfig::new(path.as_ref().to_path_buf()))
    }

    /// Open with a custom configuration
    pub fn open_with_config(config: StoreConfig) -> Result<Self> {
        let handle = StoreHandle::open(&config)?;
        Ok(Self { handle, config })
    }

    /// Open the store, restoring it from its archive first if needed
    ///
    /// When `auto_restore` is set and the raw file is absent but an
    /// archive exists, the archive is unpacked before opening.
    pub fn connect<P: AsRef<Path>>(path: P, auto_restore: bool) -> Result<Self> {
        let path = path.as_ref();
        if auto_restore && ArchiveManager::is_archived(path) {
            tracing::info!(store = %path.display(), "restoring store from archive");
            ArchiveManager::unpack(path)?;
        }
        Self::open(path)
    }

    /// The underlying connection handle
    pub fn handle(&self) -> &StoreHandle {
        &self.handle
    }

    /// Schema definition and introspection
    pub fn schema(&self) -> SchemaManager<'_> {
        SchemaManager::new(&self.handle)
    }

    /// Bulk ingestion
    pub fn ingest(&self) -> IngestionPipeline<'_> {
        IngestionPipeline::new(&self.handle)
    }

    /// Queries and statistics
    pub fn query(&self) -> QueryFacade<'_> {
        QueryFacade::new(&self.handle)
    }

    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Close the store handle
    pub fn close(self) -> Result<()> {
        self.handle.close()
    }

    /// Close the handle and pack the store into its archive
    ///
    /// Packing is serialized with the open handle: the connection is
    /// released before the file is touched. Returns the archive path.
    pub fn pack(self, progress: Option<ProgressFn>) -> Result<PathBuf> {
        let path = self.handle.path().to_path_buf();
        self.handle.close()?;
        ArchiveManager::pack(&path, progress)
    }
}

/// Open a corpus store at `path`
#[deprecated(note = "use `CorpusDb::open` instead")]
pub fn open_article_store<P: AsRef<Path>>(path: P) -> Result<CorpusDb> {
    CorpusDb::open(path)
}
