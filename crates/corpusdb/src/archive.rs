//! Archive lifecycle for the store file
//!
//! A store is either raw (the SQLite file on disk) or archived (a single
//! deflate-compressed zip entry next to where the raw file was). The
//! manager never leaves both a valid archive and a stale raw file in an
//! ambiguous state: `pack` deletes the raw file only after the archive's
//! CRC verifies, and `unpack` refuses to clobber an existing raw file.
//! Archives are retained after `unpack` as durable backups until the
//! caller cleans them up.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use corpusdb_core::{CorpusError, ProgressFn, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Extension appended to the store path for its archive
pub const ARCHIVE_EXT: &str = "zip";

const COPY_CHUNK: usize = 64 * 1024;

/// Pack/unpack operations on a store file path
///
/// Operates on the path only, never on an open handle; callers must close
/// any handle before packing and reopen after unpacking.
pub struct ArchiveManager;

impl ArchiveManager {
    /// Archive path for a store path: `<store>.zip`
    pub fn archive_path(store_path: &Path) -> PathBuf {
        let mut os = store_path.as_os_str().to_os_string();
        os.push(".");
        os.push(ARCHIVE_EXT);
        PathBuf::from(os)
    }

    /// True when only the archive representation exists on disk
    pub fn is_archived(store_path: &Path) -> bool {
        !store_path.exists() && Self::archive_path(store_path).is_file()
    }

    /// Compress the raw store file into its archive
    ///
    /// The archive is verified (entry CRC) before the raw file is deleted.
    /// On verification failure the bad archive is removed, the raw file is
    /// preserved, and `ArchiveIntegrity` is returned, so exactly one
    /// authoritative representation always remains. The progress callback
    /// receives (bytes copied, total bytes).
    pub fn pack(store_path: &Path, progress: Option<ProgressFn>) -> Result<PathBuf> {
        if !store_path.is_file() {
            return Err(CorpusError::StoreUnavailable {
                path: store_path.display().to_string(),
                reason: "no raw store file to pack".to_string(),
            });
        }

        let archive_path = Self::archive_path(store_path);
        let entry_name = store_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CorpusError::StoreUnavailable {
                path: store_path.display().to_string(),
                reason: "store path has no file name".to_string(),
            })?;
        let total = std::fs::metadata(store_path)?.len() as usize;

        tracing::info!(
            store = %store_path.display(),
            archive = %archive_path.display(),
            bytes = total,
            "packing store"
        );

        let mut src = File::open(store_path)?;
        let mut writer = ZipWriter::new(File::create(&archive_path)?);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer
            .start_file(entry_name.as_str(), options)
            .map_err(|e| CorpusError::Archive(e.to_string()))?;

        let mut buf = vec![0u8; COPY_CHUNK];
        let mut copied = 0usize;
        loop {
            let n = src.read(&mut buf)?;
            if n == 0 {
                break;
            }
            writer.write_all(&buf[..n])?;
            copied += n;
            if let Some(cb) = progress {
                cb(copied.min(total), total);
            }
        }
        writer
            .finish()
            .map_err(|e| CorpusError::Archive(e.to_string()))?;

        match Self::verify(&archive_path) {
            Ok(()) => {
                std::fs::remove_file(store_path)?;
                tracing::info!(archive = %archive_path.display(), "store packed and raw file removed");
                Ok(archive_path)
            }
            Err(e) => {
                // Keep the raw file authoritative; discard the bad archive
                let _ = std::fs::remove_file(&archive_path);
                tracing::warn!(
                    store = %store_path.display(),
                    "archive verification failed, raw store preserved"
                );
                Err(e)
            }
        }
    }

    /// Check the archive holds exactly one entry with a valid CRC
    pub fn verify(archive_path: &Path) -> Result<()> {
        let file = File::open(archive_path)?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| CorpusError::ArchiveIntegrity(e.to_string()))?;

        if archive.len() != 1 {
            return Err(CorpusError::ArchiveIntegrity(format!(
                "expected exactly one entry, found {}",
                archive.len()
            )));
        }

        let mut entry = archive
            .by_index(0)
            .map_err(|e| CorpusError::ArchiveIntegrity(e.to_string()))?;
        // Reading the entry to the end forces the CRC check
        io::copy(&mut entry, &mut io::sink())
            .map_err(|e| CorpusError::ArchiveIntegrity(e.to_string()))?;
        Ok(())
    }

    /// Decompress the archive back to the raw store path
    ///
    /// The archive is kept afterward. Fails when a raw file already exists
    /// (which representation is authoritative would be ambiguous) or when
    /// no archive is present.
    pub fn unpack(store_path: &Path) -> Result<PathBuf> {
        let archive_path = Self::archive_path(store_path);

        if store_path.exists() {
            return Err(CorpusError::ArchiveIntegrity(format!(
                "raw store '{}' already exists; refusing to unpack over it",
                store_path.display()
            )));
        }
        if !archive_path.is_file() {
            return Err(CorpusError::StoreUnavailable {
                path: archive_path.display().to_string(),
                reason: "no archive to unpack".to_string(),
            });
        }

        let mut archive = ZipArchive::new(File::open(&archive_path)?)
            .map_err(|e| CorpusError::ArchiveIntegrity(e.to_string()))?;
        if archive.len() != 1 {
            return Err(CorpusError::ArchiveIntegrity(format!(
                "expected exactly one entry, found {}",
                archive.len()
            )));
        }
        let mut entry = archive
            .by_index(0)
            .map_err(|e| CorpusError::ArchiveIntegrity(e.to_string()))?;

        let mut out = File::create(store_path)?;
        if let Err(e) = io::copy(&mut entry, &mut out) {
            // Never leave a truncated store behind
            drop(out);
            let _ = std::fs::remove_file(store_path);
            return Err(CorpusError::ArchiveIntegrity(e.to_string()));
        }

        tracing::info!(
            store = %store_path.display(),
            archive = %archive_path.display(),
            "store unpacked, archive retained"
        );
        Ok(store_path.to_path_buf())
    }
}
