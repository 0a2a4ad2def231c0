//! Bulk ingestion pipeline
//!
//! Three ingestion modes (text-file corpus, delimited file, pre-built
//! frame) all funnel into [`IngestionPipeline::append_frame`]. Commit
//! granularity is per bulk append, not per row: the whole batch is wrapped
//! in one transaction for throughput, and a duplicate primary key is a
//! reported, counted condition rather than a batch abort.

use std::path::{Path, PathBuf};

use corpusdb_core::{
    ColumnDef, CorpusError, Frame, IngestReport, ProgressFn, Result, Value,
};
use corpusdb_sqlite::{ident, to_sql_value, SchemaManager, StoreHandle};
use rusqlite::params_from_iter;

/// Column holding the source file name in a corpus table
pub const IDENTIFIER_COLUMN: &str = "identifier";
/// Column holding the file body in a corpus table
pub const CONTENT_COLUMN: &str = "content";

/// Loads external sources into tables over a borrowed store handle
pub struct IngestionPipeline<'a> {
    handle: &'a StoreHandle,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(handle: &'a StoreHandle) -> Self {
        Self { handle }
    }

    /// Ingest a directory of plain-text files into `table`
    ///
    /// Files are selected by a case-insensitive `.txt` suffix filter and
    /// ingested in file-name order; the file name (without path) becomes
    /// the primary-key value and the file body the content. Every file is
    /// read fully before anything is appended, so a read failure aborts
    /// with no partial corpus committed. With `overwrite` any existing
    /// table of that name is dropped and recreated with the standard
    /// `identifier`/`content` schema.
    pub fn ingest_dir(
        &self,
        dir: &Path,
        table: &str,
        overwrite: bool,
        progress: Option<ProgressFn>,
    ) -> Result<IngestReport> {
        let schema = SchemaManager::new(self.handle);

        let mut files: Vec<(String, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let is_txt = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("txt"))
                .unwrap_or(false);
            if is_txt {
                if let Some(name) = path.file_name() {
                    files.push((name.to_string_lossy().into_owned(), path.clone()));
                }
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        // Read everything up front: a failure here leaves the store untouched
        let mut frame = Frame::new(vec![IDENTIFIER_COLUMN, CONTENT_COLUMN]);
        for (name, path) in &files {
            let body = std::fs::read_to_string(path)?;
            frame.push_row(vec![Value::from(name.as_str()), Value::from(body)])?;
        }

        if overwrite || !schema.table_exists(table)? {
            schema.create_table(
                table,
                &[
                    ColumnDef::primary_key(IDENTIFIER_COLUMN),
                    ColumnDef::new(CONTENT_COLUMN),
                ],
                &[],
                overwrite,
            )?;
        }

        tracing::info!(table, files = frame.len(), dir = %dir.display(), "ingesting text corpus");
        self.append_frame(&frame, table, false, progress)
    }

    /// Ingest a comma-delimited file into `table`
    ///
    /// The first record is the header. When `create_schema` is set and the
    /// table does not exist yet, the first header field becomes a TEXT
    /// primary key and the remaining fields become TEXT columns.
    pub fn ingest_csv(
        &self,
        path: &Path,
        table: &str,
        create_schema: bool,
        progress: Option<ProgressFn>,
    ) -> Result<IngestReport> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| CorpusError::Delimited(e.to_string()))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| CorpusError::Delimited(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.is_empty() {
            return Err(CorpusError::Delimited(format!(
                "no header record in '{}'",
                path.display()
            )));
        }

        let mut frame = Frame::new(headers.clone());
        for record in reader.records() {
            let record = record.map_err(|e| CorpusError::Delimited(e.to_string()))?;
            if record.len() != headers.len() {
                return Err(CorpusError::ColumnArityMismatch {
                    expected: headers.len(),
                    actual: record.len(),
                });
            }
            frame.push_row(record.iter().map(Value::from).collect())?;
        }

        tracing::info!(table, rows = frame.len(), path = %path.display(), "ingesting delimited file");
        self.append_frame(&frame, table, create_schema, progress)
    }

    /// Append a pre-built frame to `table`
    ///
    /// When `create_schema` is set and the table does not exist, the frame's
    /// own column names define it (first column as TEXT primary key). The
    /// batch commits once at the end; each `DuplicateKey` is counted and
    /// logged without aborting, while any other failure aborts the batch.
    pub fn append_frame(
        &self,
        frame: &Frame,
        table: &str,
        create_schema: bool,
        progress: Option<ProgressFn>,
    ) -> Result<IngestReport> {
        let schema = SchemaManager::new(self.handle);

        if create_schema && !schema.table_exists(table)? {
            let mut columns = Vec::with_capacity(frame.columns().len());
            for (i, name) in frame.columns().iter().enumerate() {
                columns.push(if i == 0 {
                    ColumnDef::primary_key(name.clone())
                } else {
                    ColumnDef::new(name.clone())
                });
            }
            schema.create_table(table, &columns, &[], false)?;
        }

        let columns = schema.list_columns(table)?;
        if frame.columns().len() != columns.len() {
            return Err(CorpusError::ColumnArityMismatch {
                expected: columns.len(),
                actual: frame.columns().len(),
            });
        }

        let key_column = schema.primary_key_of(table)?;
        let key_index = key_column
            .as_deref()
            .and_then(|key| columns.iter().position(|c| c == key));
        let sql = insert_sql(table, &columns)?;

        let total = frame.len();
        let mut report = IngestReport::default();

        self.handle.begin()?;
        for (i, row) in frame.rows().iter().enumerate() {
            match self.insert_prepared(&sql, table, key_column.as_deref(), key_index, row) {
                Ok(()) => report.inserted += 1,
                Err(CorpusError::DuplicateKey {
                    table,
                    column,
                    value,
                }) => {
                    tracing::warn!(table = %table, column = %column, value = %value, "duplicate key skipped");
                    report.duplicates += 1;
                }
                Err(e) => {
                    // Anything other than a duplicate key is fatal to the batch
                    let _ = self.handle.rollback();
                    return Err(e);
                }
            }
            if let Some(cb) = progress {
                cb(i + 1, total);
            }
        }
        self.handle.commit()?;

        tracing::info!(
            table,
            inserted = report.inserted,
            duplicates = report.duplicates,
            "frame appended"
        );
        Ok(report)
    }

    /// Insert a single row of values into `table`
    ///
    /// The value count must equal the table's current column count; a
    /// duplicate primary key is reported as `DuplicateKey` naming the key
    /// column and offending value.
    pub fn insert_row(&self, table: &str, values: &[Value]) -> Result<()> {
        let schema = SchemaManager::new(self.handle);
        let columns = schema.list_columns(table)?;
        if values.len() != columns.len() {
            return Err(CorpusError::ColumnArityMismatch {
                expected: columns.len(),
                actual: values.len(),
            });
        }

        let key_column = schema.primary_key_of(table)?;
        let key_index = key_column
            .as_deref()
            .and_then(|key| columns.iter().position(|c| c == key));
        let sql = insert_sql(table, &columns)?;

        self.insert_prepared(&sql, table, key_column.as_deref(), key_index, values)
    }

    fn insert_prepared(
        &self,
        sql: &str,
        table: &str,
        key_column: Option<&str>,
        key_index: Option<usize>,
        values: &[Value],
    ) -> Result<()> {
        let outcome = self.handle.with_conn(|conn| {
            Ok(conn.execute(sql, params_from_iter(values.iter().map(to_sql_value))))
        })?;

        match outcome {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(CorpusError::DuplicateKey {
                table: table.to_string(),
                column: key_column.unwrap_or("?").to_string(),
                value: key_index
                    .and_then(|i| values.get(i))
                    .map(Value::display_text)
                    .unwrap_or_else(|| "?".to_string()),
            }),
            Err(e) => Err(CorpusError::Engine(e.to_string())),
        }
    }
}

fn insert_sql(table: &str, columns: &[String]) -> Result<String> {
    let quoted: Vec<String> = columns
        .iter()
        .map(|c| ident::quote(c))
        .collect::<Result<_>>()?;
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        ident::quote(table)?,
        quoted.join(", "),
        placeholders.join(", ")
    ))
}

fn is_duplicate_key(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
