//! Schema manager
//!
//! Builds and validates table definitions on top of a [`StoreHandle`].
//! Schema evolution is append-only: columns can be added after creation but
//! never removed or retyped.

use corpusdb_core::{ColumnDef, ColumnInfo, ColumnType, CorpusError, Result, Value};

use crate::handle::StoreHandle;
use crate::ident;

/// Table definition and introspection over a borrowed store handle
pub struct SchemaManager<'a> {
    handle: &'a StoreHandle,
}

impl<'a> SchemaManager<'a> {
    pub fn new(handle: &'a StoreHandle) -> Self {
        Self { handle }
    }

    /// Create a table from explicit column declarations
    ///
    /// Existence-checked: if the table already exists it is dropped first
    /// when `overwrite` is set (destructive, no backup), otherwise the call
    /// fails with `SchemaConflict`.
    pub fn create_table(
        &self,
        name: &str,
        columns: &[ColumnDef],
        table_constraints: &[String],
        overwrite: bool,
    ) -> Result<()> {
        let quoted_name = ident::quote(name)?;

        if self.table_exists(name)? {
            if overwrite {
                tracing::warn!(table = name, "overwriting existing table");
                self.drop_table(name)?;
            } else {
                return Err(CorpusError::SchemaConflict(name.to_string()));
            }
        }

        let mut parts = Vec::with_capacity(columns.len() + table_constraints.len());
        for col in columns {
            let quoted_col = ident::quote(&col.name)?;
            let mut part = format!("{} {}", quoted_col, col.ty.as_sql());
            if !col.constraint.is_empty() {
                part.push(' ');
                part.push_str(&col.constraint);
            }
            parts.push(part);
        }
        for constraint in table_constraints {
            parts.push(constraint.clone());
        }

        let sql = format!("CREATE TABLE {} ({})", quoted_name, parts.join(", "));
        self.handle.execute(&sql, [])?;

        tracing::info!(table = name, columns = columns.len(), "table created");
        Ok(())
    }

    /// Append a column to an existing table
    ///
    /// Existing rows hold NULL for the new column.
    pub fn add_column(&self, table: &str, column: &str, ty: ColumnType) -> Result<()> {
        if !self.table_exists(table)? {
            return Err(CorpusError::UnknownTable(table.to_string()));
        }
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            ident::quote(table)?,
            ident::quote(column)?,
            ty.as_sql()
        );
        self.handle.execute(&sql, [])?;
        tracing::debug!(table, column, "column added");
        Ok(())
    }

    /// Drop a table (irreversible)
    pub fn drop_table(&self, name: &str) -> Result<()> {
        if !self.table_exists(name)? {
            return Err(CorpusError::UnknownTable(name.to_string()));
        }
        let sql = format!("DROP TABLE {}", ident::quote(name)?);
        self.handle.execute(&sql, [])?;
        tracing::info!(table = name, "table dropped");
        Ok(())
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let count = self.handle.query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
        )?;
        Ok(count > 0)
    }

    /// Names of all user tables, ordered by name
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let rows = self.handle.query_rows(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
            [],
        )?;
        Ok(rows
            .into_iter()
            .filter_map(|mut row| match row.pop() {
                Some(Value::Text(name)) => Some(name),
                _ => None,
            })
            .collect())
    }

    /// Column names of a table in declaration order
    pub fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        Ok(self
            .describe(table)?
            .into_iter()
            .map(|info| info.name)
            .collect())
    }

    /// Full column metadata in declaration order
    pub fn describe(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        // pragma_table_info is a table-valued function, so the table name
        // can be bound as a parameter instead of interpolated.
        let rows = self.handle.query_rows(
            "SELECT cid, name, type, \"notnull\", dflt_value, pk
             FROM pragma_table_info(?1) ORDER BY cid",
            [table],
        )?;

        if rows.is_empty() {
            return Err(CorpusError::UnknownTable(table.to_string()));
        }

        rows.into_iter().map(column_info_from_row).collect()
    }

    /// Name of the table's primary key column, if it declares one
    pub fn primary_key_of(&self, table: &str) -> Result<Option<String>> {
        Ok(self
            .describe(table)?
            .into_iter()
            .find(|info| info.primary_key)
            .map(|info| info.name))
    }
}

fn column_info_from_row(row: Vec<Value>) -> Result<ColumnInfo> {
    let mut it = row.into_iter();
    let cid = it.next().and_then(|v| v.as_integer()).unwrap_or(0);
    let name = match it.next() {
        Some(Value::Text(name)) => name,
        other => {
            return Err(CorpusError::Engine(format!(
                "malformed table_info row: {other:?}"
            )))
        }
    };
    let ty = match it.next() {
        Some(Value::Text(ty)) => ty,
        _ => String::new(),
    };
    let not_null = it.next().and_then(|v| v.as_integer()).unwrap_or(0) != 0;
    let default_value = match it.next() {
        Some(Value::Text(d)) => Some(d),
        _ => None,
    };
    let primary_key = it.next().and_then(|v| v.as_integer()).unwrap_or(0) != 0;

    Ok(ColumnInfo {
        cid,
        name,
        ty,
        not_null,
        default_value,
        primary_key,
    })
}
