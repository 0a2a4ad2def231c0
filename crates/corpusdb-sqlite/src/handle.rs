//! Store connection handle
//!
//! [`StoreHandle`] exclusively owns the live connection to one store file
//! for the lifetime between open and close. The managers in `corpusdb`
//! borrow the handle; they never own or close it. One handle per store file
//! at a time; no concurrent handle to the same file is supported.

use corpusdb_core::{CorpusError, FetchMode, Result, StoreConfig, SynchronousMode, Value};
use rusqlite::{Connection, OpenFlags, Params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::value::from_value_ref;

/// Batch size for `FetchMode::Many(None)`
pub const DEFAULT_FETCH_BATCH: usize = 256;

/// A SELECT staged for windowed fetching
struct Staged {
    sql: String,
    offset: usize,
}

struct HandleState {
    conn: Option<Connection>,
    staged: Option<Staged>,
}

/// Owns the live connection to one store file
pub struct StoreHandle {
    path: PathBuf,
    state: Mutex<HandleState>,
}

impl StoreHandle {
    /// Open (creating if absent) the store file described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            &config.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| CorpusError::StoreUnavailable {
            path: config.path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::configure_connection(&conn, config)?;

        tracing::debug!(path = %config.path.display(), "store opened");

        Ok(Self {
            path: config.path.clone(),
            state: Mutex::new(HandleState {
                conn: Some(conn),
                staged: None,
            }),
        })
    }

    /// Configure SQLite connection
    fn configure_connection(conn: &Connection, cfg: &StoreConfig) -> Result<()> {
        // WAL leaves -wal/-shm sidecar files next to the store, so it is
        // off by default: a packable store must stay a single file.
        if cfg.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| CorpusError::Engine(e.to_string()))?;
        }

        let sync_mode = match cfg.synchronous {
            SynchronousMode::Full => "FULL",
            SynchronousMode::Normal => "NORMAL",
            SynchronousMode::Off => "OFF",
        };
        conn.pragma_update(None, "synchronous", sync_mode)
            .map_err(|e| CorpusError::Engine(e.to_string()))?;

        conn.pragma_update(None, "cache_size", cfg.cache_size)
            .map_err(|e| CorpusError::Engine(e.to_string()))?;

        Ok(())
    }

    /// Path of the underlying store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().unwrap().conn.is_some()
    }

    /// Release the underlying connection
    ///
    /// Every subsequent operation on this handle fails with `HandleClosed`.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.staged = None;
        let conn = state.conn.take().ok_or(CorpusError::HandleClosed)?;
        conn.close()
            .map_err(|(_, e)| CorpusError::Engine(e.to_string()))?;
        tracing::debug!(path = %self.path.display(), "store closed");
        Ok(())
    }

    /// Run a closure against the open connection
    ///
    /// For callers that need raw engine access (custom queries, error-code
    /// inspection). Fails with `HandleClosed` after `close`.
    pub fn with_conn<R>(&self, f: impl FnOnce(&Connection) -> Result<R>) -> Result<R> {
        let state = self.state.lock().unwrap();
        let conn = state.conn.as_ref().ok_or(CorpusError::HandleClosed)?;
        f(conn)
    }

    /// Execute a statement, returning the number of affected rows
    ///
    /// No commit is issued beyond the engine's own autocommit; callers
    /// wrapping a batch use `begin`/`commit` explicitly.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.with_conn(|conn| {
            conn.execute(sql, params)
                .map_err(|e| CorpusError::Engine(e.to_string()))
        })
    }

    /// Begin an explicit transaction
    pub fn begin(&self) -> Result<()> {
        self.execute("BEGIN IMMEDIATE TRANSACTION", [])?;
        Ok(())
    }

    /// Commit the current transaction
    pub fn commit(&self) -> Result<()> {
        self.execute("COMMIT", [])?;
        Ok(())
    }

    /// Roll back the current transaction
    pub fn rollback(&self) -> Result<()> {
        self.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Run a query and materialize every row as a vector of values
    pub fn query_rows<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Vec<Value>>> {
        self.with_conn(|conn| query_rows_on(conn, sql, params))
    }

    /// Run a query expected to produce a single integer
    pub fn query_scalar<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.with_conn(|conn| {
            conn.query_row(sql, params, |row| row.get(0))
                .map_err(|e| CorpusError::Engine(e.to_string()))
        })
    }

    /// Stage a SELECT for later windowed fetching
    ///
    /// The staged statement is only executed when `fetch` is called;
    /// staging a new statement discards any previous one.
    pub fn stage(&self, sql: String) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.conn.is_none() {
            return Err(CorpusError::HandleClosed);
        }
        state.staged = Some(Staged { sql, offset: 0 });
        Ok(())
    }

    /// Fetch rows from the staged statement
    ///
    /// `All` materializes everything and clears the staged statement.
    /// `One` and `Many` page through the statement with an advancing
    /// window; the statement is cleared once exhausted. `Many(None)` uses
    /// [`DEFAULT_FETCH_BATCH`].
    pub fn fetch(&self, mode: FetchMode) -> Result<Vec<Vec<Value>>> {
        let mut state = self.state.lock().unwrap();
        let HandleState { conn, staged } = &mut *state;
        let conn = conn.as_ref().ok_or(CorpusError::HandleClosed)?;
        let pending = staged
            .as_mut()
            .ok_or_else(|| CorpusError::InvalidState("no staged query to fetch from".to_string()))?;

        let limit: i64 = match mode {
            FetchMode::All => -1,
            FetchMode::One => 1,
            FetchMode::Many(size) => size.unwrap_or(DEFAULT_FETCH_BATCH) as i64,
        };

        // LIMIT -1 is SQLite's "no limit"
        let windowed = format!(
            "SELECT * FROM ({}) LIMIT {} OFFSET {}",
            pending.sql, limit, pending.offset
        );

        let rows = query_rows_on(conn, &windowed, [])?;

        match mode {
            FetchMode::All => *staged = None,
            _ => {
                pending.offset += rows.len();
                if (rows.len() as i64) < limit {
                    *staged = None;
                }
            }
        }

        Ok(rows)
    }
}

fn query_rows_on<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Vec<Value>>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| CorpusError::Engine(e.to_string()))?;
    let column_count = stmt.column_count();
    let mut rows = stmt
        .query(params)
        .map_err(|e| CorpusError::Engine(e.to_string()))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(|e| CorpusError::Engine(e.to_string()))? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let cell = row
                .get_ref(i)
                .map_err(|e| CorpusError::Engine(e.to_string()))?;
            values.push(from_value_ref(cell));
        }
        out.push(values);
    }
    Ok(out)
}
