//! Query and statistics facade
//!
//! Thin, composable wrappers over parameterizable SQL fragments. Table and
//! column identifiers are validated against the schema catalog before
//! interpolation; value-level data (patterns, parameters) is always bound,
//! never interpolated. All row-by-position access orders by the table's
//! primary key rather than relying on undefined physical order.

use corpusdb_core::{CorpusError, Frame, Result, Value};
use corpusdb_sqlite::{ident, SchemaManager, StoreHandle};

/// Rows per window for `paragraph_count`
const WINDOW_ROWS: usize = 64;

/// Read-side operations over a borrowed store handle
pub struct QueryFacade<'a> {
    handle: &'a StoreHandle,
}

impl<'a> QueryFacade<'a> {
    pub fn new(handle: &'a StoreHandle) -> Self {
        Self { handle }
    }

    fn schema(&self) -> SchemaManager<'a> {
        SchemaManager::new(self.handle)
    }

    /// Validate a projection list against the catalog and render it
    ///
    /// `["*"]` selects everything; any named column must exist in the table.
    fn projection(&self, table: &str, columns: &[&str]) -> Result<String> {
        let known = self.schema().list_columns(table)?;
        if columns == ["*"] {
            return Ok("*".to_string());
        }
        let mut quoted = Vec::with_capacity(columns.len());
        for col in columns {
            if !known.iter().any(|k| k == col) {
                return Err(CorpusError::UnknownColumn {
                    table: table.to_string(),
                    column: col.to_string(),
                });
            }
            quoted.push(ident::quote(col)?);
        }
        Ok(quoted.join(", "))
    }

    /// Require the column to exist, returning its quoted form
    fn checked_column(&self, table: &str, column: &str) -> Result<String> {
        let known = self.schema().list_columns(table)?;
        if !known.iter().any(|k| k == column) {
            return Err(CorpusError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        ident::quote(column)
    }

    /// The primary key of `table`, required for any ordered window access
    fn order_key(&self, table: &str) -> Result<String> {
        self.schema()
            .primary_key_of(table)?
            .ok_or_else(|| {
                CorpusError::InvalidState(format!(
                    "table '{table}' has no primary key for ordered row access"
                ))
            })
            .and_then(|key| ident::quote(&key))
    }

    fn select_sql(&self, columns: &[&str], table: &str, clauses: Option<&str>) -> Result<String> {
        let projection = self.projection(table, columns)?;
        let mut sql = format!("SELECT {} FROM {}", projection, ident::quote(table)?);
        if let Some(extra) = clauses {
            sql.push(' ');
            sql.push_str(extra);
        }
        Ok(sql)
    }

    /// Generic projection, materialized immediately
    pub fn select(
        &self,
        columns: &[&str],
        table: &str,
        clauses: Option<&str>,
    ) -> Result<Vec<Vec<Value>>> {
        let sql = self.select_sql(columns, table, clauses)?;
        self.handle.query_rows(&sql, [])
    }

    /// Stage a projection on the handle without fetching
    ///
    /// Pair with [`StoreHandle::fetch`] to page through the result.
    pub fn stage_select(
        &self,
        columns: &[&str],
        table: &str,
        clauses: Option<&str>,
    ) -> Result<()> {
        let sql = self.select_sql(columns, table, clauses)?;
        self.handle.stage(sql)
    }

    /// Substring match, wildcarding both ends of `pattern`
    pub fn select_like(
        &self,
        column: &str,
        table: &str,
        pattern: &str,
    ) -> Result<Vec<Vec<Value>>> {
        let quoted = self.checked_column(table, column)?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} LIKE ?1",
            ident::quote(table)?,
            quoted
        );
        self.handle.query_rows(&sql, [format!("%{pattern}%")])
    }

    /// Row count; `column` may be `"*"`
    pub fn count(&self, column: &str, table: &str) -> Result<i64> {
        let target = if column == "*" {
            "*".to_string()
        } else {
            self.checked_column(table, column)?
        };
        let sql = format!("SELECT COUNT({}) FROM {}", target, ident::quote(table)?);
        self.handle.query_scalar(&sql, [])
    }

    pub fn count_distinct(&self, column: &str, table: &str) -> Result<i64> {
        let quoted = self.checked_column(table, column)?;
        let sql = format!(
            "SELECT COUNT(DISTINCT {}) FROM {}",
            quoted,
            ident::quote(table)?
        );
        self.handle.query_scalar(&sql, [])
    }

    /// Number of non-NULL entries in `column`
    pub fn count_not_null(&self, column: &str, table: &str) -> Result<i64> {
        let quoted = self.checked_column(table, column)?;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} IS NOT NULL",
            ident::quote(table)?,
            quoted
        );
        self.handle.query_scalar(&sql, [])
    }

    pub fn count_like(&self, column: &str, table: &str, pattern: &str) -> Result<i64> {
        let quoted = self.checked_column(table, column)?;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} LIKE ?1",
            ident::quote(table)?,
            quoted
        );
        self.handle.query_scalar(&sql, [format!("%{pattern}%")])
    }

    /// Not-null tallies for every column, in declaration order
    pub fn column_fill_counts(&self, table: &str) -> Result<Vec<(String, i64)>> {
        let columns = self.schema().list_columns(table)?;
        let mut out = Vec::with_capacity(columns.len());
        for column in columns {
            let count = self.count_not_null(&column, table)?;
            out.push((column, count));
        }
        Ok(out)
    }

    /// Materialize a whole table (or a clause-restricted view) as a frame
    pub fn to_frame(&self, table: &str, clauses: Option<&str>) -> Result<Frame> {
        let columns = self.schema().list_columns(table)?;
        let rows = self.select(&["*"], table, clauses)?;
        let mut frame = Frame::new(columns);
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    /// Lazily page a table as a sequence of frame chunks
    ///
    /// Bounds peak memory for large tables: each chunk holds at most
    /// `chunk_size` rows, windowed by the table's primary key. The
    /// sequence is finite and non-restartable.
    pub fn to_frame_chunks(
        &self,
        table: &str,
        clauses: Option<&str>,
        chunk_size: usize,
    ) -> Result<FrameChunks<'a>> {
        if chunk_size == 0 {
            return Err(CorpusError::InvalidState(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        let columns = self.schema().list_columns(table)?;
        let order_key = self.order_key(table)?;

        let mut sql = format!("SELECT * FROM {}", ident::quote(table)?);
        if let Some(extra) = clauses {
            sql.push(' ');
            sql.push_str(extra);
        }
        sql.push_str(&format!(" ORDER BY {order_key}"));

        Ok(FrameChunks {
            handle: self.handle,
            columns,
            sql,
            chunk_size,
            offset: 0,
            done: false,
        })
    }

    /// Paragraph counts for every row of a text column
    ///
    /// A paragraph break is a double newline; a row with text holds at
    /// least one paragraph, a NULL row holds zero. Rows are visited in
    /// primary-key order, in windows, so peak memory stays bounded on
    /// large corpora.
    pub fn paragraph_count(&self, table: &str, text_column: &str) -> Result<Vec<i64>> {
        let quoted_column = self.checked_column(table, text_column)?;
        let order_key = self.order_key(table)?;
        let quoted_table = ident::quote(table)?;

        let mut counts = Vec::new();
        let mut offset = 0usize;
        loop {
            let sql = format!(
                "SELECT {quoted_column} FROM {quoted_table} ORDER BY {order_key} \
                 LIMIT {WINDOW_ROWS} OFFSET {offset}"
            );
            let rows = self.handle.query_rows(&sql, [])?;
            let fetched = rows.len();
            for mut row in rows {
                let count = match row.pop() {
                    Some(Value::Null) | None => 0,
                    Some(Value::Text(text)) => text.matches("\n\n").count() as i64 + 1,
                    Some(_) => 1,
                };
                counts.push(count);
            }
            if fetched < WINDOW_ROWS {
                break;
            }
            offset += fetched;
        }
        Ok(counts)
    }
}

/// Lazy, finite, non-restartable sequence of frame chunks
pub struct FrameChunks<'a> {
    handle: &'a StoreHandle,
    columns: Vec<String>,
    sql: String,
    chunk_size: usize,
    offset: usize,
    done: bool,
}

impl Iterator for FrameChunks<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let sql = format!(
            "{} LIMIT {} OFFSET {}",
            self.sql, self.chunk_size, self.offset
        );
        let rows = match self.handle.query_rows(&sql, []) {
            Ok(rows) => rows,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if rows.len() < self.chunk_size {
            self.done = true;
        }
        if rows.is_empty() {
            return None;
        }
        self.offset += rows.len();

        let mut frame = Frame::new(self.columns.clone());
        for row in rows {
            if let Err(e) = frame.push_row(row) {
                self.done = true;
                return Some(Err(e));
            }
        }
        Some(Ok(frame))
    }
}
