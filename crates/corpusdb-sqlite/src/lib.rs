//! SQLite binding for corpusdb
//!
//! Provides the [`StoreHandle`] connection owner and the [`SchemaManager`]
//! for dynamic table definition and introspection. Higher-level ingestion,
//! query and archive managers live in the `corpusdb` crate.

pub mod handle;
pub mod ident;
pub mod schema;
pub mod value;

pub use handle::{StoreHandle, DEFAULT_FETCH_BATCH};
pub use schema::SchemaManager;
pub use value::{from_value_ref, to_sql_value};
