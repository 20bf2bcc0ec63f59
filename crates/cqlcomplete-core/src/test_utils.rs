//! In-memory schema doubles for unit tests.

use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::schema::{ColumnRow, LayoutRow, SchemaAccessor, TableDef};

/// A [`SchemaAccessor`] built up fluently, with optional failing lookups.
#[derive(Debug, Default)]
pub struct StubSchema {
    keyspaces: BTreeMap<String, BTreeMap<String, TableDef>>,
    current: Option<String>,
    failing: bool,
}

impl StubSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyspace whose tables have a single `id` key column.
    pub fn keyspace(mut self, name: &str, tables: &[&str]) -> Self {
        let entry = self.keyspaces.entry(name.to_string()).or_default();
        for table in tables {
            let layout = LayoutRow {
                key_alias: Some("id".to_string()),
                ..LayoutRow::new(name, *table)
            };
            entry.insert(table.to_string(), TableDef::build(&layout, &[]).0);
        }
        self
    }

    /// Add a table decoded from raw rows, creating its keyspace if needed.
    pub fn table(mut self, layout: LayoutRow, columns: &[ColumnRow]) -> Self {
        let (table, _) = TableDef::build(&layout, columns);
        self.keyspaces
            .entry(layout.keyspace_name.clone())
            .or_default()
            .insert(table.name.clone(), table);
        self
    }

    pub fn current(mut self, keyspace: &str) -> Self {
        self.current = Some(keyspace.to_string());
        self
    }

    /// Make every lookup fail with a server error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    fn check(&self) -> Result<(), SchemaError> {
        if self.failing {
            return Err(SchemaError::Server {
                code: crate::error::ErrorCode::ServerError,
                message: "stub failure".to_string(),
            });
        }
        Ok(())
    }

    fn resolve(
        &self,
        keyspace: Option<&str>,
    ) -> Result<Option<&BTreeMap<String, TableDef>>, SchemaError> {
        self.check()?;
        match keyspace.or(self.current.as_deref()) {
            None => Ok(None),
            Some(name) => self
                .keyspaces
                .get(name)
                .map(Some)
                .ok_or_else(|| SchemaError::keyspace_not_found(name)),
        }
    }
}

impl SchemaAccessor for StubSchema {
    fn keyspace_names(&self) -> Result<Vec<String>, SchemaError> {
        self.check()?;
        Ok(self.keyspaces.keys().cloned().collect())
    }

    fn columnfamily_names(&self, keyspace: Option<&str>) -> Result<Vec<String>, SchemaError> {
        Ok(self
            .resolve(keyspace)?
            .map(|tables| tables.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn columnfamily(&self, name: &str, keyspace: Option<&str>) -> Result<TableDef, SchemaError> {
        self.resolve(keyspace)?
            .and_then(|tables| tables.get(name))
            .cloned()
            .ok_or_else(|| SchemaError::table_not_found(name))
    }

    fn index_names(&self, keyspace: Option<&str>) -> Result<Vec<String>, SchemaError> {
        Ok(self
            .resolve(keyspace)?
            .map(|tables| {
                tables
                    .values()
                    .flat_map(|table| table.indexed_columns())
                    .filter_map(|column| column.index_name.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}
