//! Schema metadata: decoding of raw introspection rows and the accessor interface
//! completers query.
//!
//! # Architecture
//!
//! - [`LayoutRow`] / [`ColumnRow`] are the raw rows, read through a fixed set of named
//!   fields. [`TableDef::build`] turns them into a normalized [`TableDef`] plus a list
//!   of [`Diagnostic`]s; it never fails.
//! - [`SchemaAccessor`] is what completers see. Implementations may be backed by a
//!   live connection; [`SchemaCatalog`] is the in-memory one, fed by a
//!   [`SchemaSnapshot`].

mod catalog;
pub mod describe;
mod diagnostics;
pub mod marshal;
mod model;

pub use catalog::{KeyspaceSnapshot, SchemaCatalog, SchemaSnapshot, TableSnapshot};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use model::{ColumnDef, ColumnRow, LayoutRow, TableDef, TableOptions};

use crate::error::SchemaError;

/// Read access to schema metadata.
///
/// Methods taking `keyspace: Option<&str>` fall back to the accessor's current
/// keyspace when `None` is given.
pub trait SchemaAccessor {
    fn keyspace_names(&self) -> Result<Vec<String>, SchemaError>;

    /// Table names in `keyspace`. Fails with [`SchemaError::NotFound`] if an
    /// explicit keyspace does not exist.
    fn columnfamily_names(&self, keyspace: Option<&str>) -> Result<Vec<String>, SchemaError>;

    fn columnfamily(&self, name: &str, keyspace: Option<&str>) -> Result<TableDef, SchemaError>;

    /// Columns usable in a `WHERE` clause: the key components and indexed columns.
    fn filterable_column_names(
        &self,
        table: &str,
        keyspace: Option<&str>,
    ) -> Result<Vec<String>, SchemaError> {
        let table = self.columnfamily(table, keyspace)?;
        let mut names = table.key_components.clone();
        for column in table.indexed_columns() {
            if !names.contains(&column.name) {
                names.push(column.name.clone());
            }
        }
        Ok(names)
    }

    fn index_names(&self, keyspace: Option<&str>) -> Result<Vec<String>, SchemaError>;
}
