//! In-memory schema accessor over a snapshot of introspection rows.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

use super::diagnostics::Diagnostic;
use super::model::{ColumnRow, LayoutRow, TableDef};
use super::SchemaAccessor;

/// Raw schema rows for every keyspace, as exported from a cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub keyspaces: Vec<KeyspaceSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyspaceSnapshot {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableSnapshot>,
}

/// The layout row of one table and its column rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub layout: LayoutRow,
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
}

impl SchemaSnapshot {
    pub fn keyspace(&self, name: &str) -> Option<&KeyspaceSnapshot> {
        self.keyspaces.iter().find(|keyspace| keyspace.name == name)
    }
}

impl KeyspaceSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables
            .iter()
            .find(|table| table.layout.columnfamily_name == name)
    }

    /// Add a table, filling in the layout's keyspace name when it is blank.
    pub fn with_table(mut self, mut layout: LayoutRow, columns: Vec<ColumnRow>) -> Self {
        if layout.keyspace_name.is_empty() {
            layout.keyspace_name = self.name.clone();
        }
        self.tables.push(TableSnapshot { layout, columns });
        self
    }
}

/// A [`SchemaAccessor`] backed by a [`SchemaSnapshot`].
///
/// Tables are decoded on each lookup; decoding diagnostics are logged and
/// otherwise available through [`SchemaCatalog::describe`].
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    snapshot: SchemaSnapshot,
    current_keyspace: Option<String>,
}

impl SchemaCatalog {
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        Self {
            snapshot,
            current_keyspace: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn with_current_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.current_keyspace = Some(keyspace.into());
        self
    }

    pub fn set_current_keyspace(&mut self, keyspace: Option<String>) {
        self.current_keyspace = keyspace;
    }

    pub fn current_keyspace(&self) -> Option<&str> {
        self.current_keyspace.as_deref()
    }

    pub fn snapshot(&self) -> &SchemaSnapshot {
        &self.snapshot
    }

    /// Decode a table, returning its decoding diagnostics as well.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn describe(
        &self,
        name: &str,
        keyspace: Option<&str>,
    ) -> Result<(TableDef, Vec<Diagnostic>), SchemaError> {
        let Some(keyspace) = self.resolve_keyspace(keyspace)? else {
            return Err(SchemaError::table_not_found(name));
        };
        let table = keyspace
            .table(name)
            .ok_or_else(|| SchemaError::table_not_found(format!("{}.{name}", keyspace.name)))?;

        let (table, diagnostics) = decode(keyspace, table);

        #[cfg(feature = "tracing")]
        for diagnostic in &diagnostics {
            tracing::warn!(%diagnostic, "schema decoding diagnostic");
        }

        Ok((table, diagnostics))
    }

    /// The explicit keyspace, else the current one, else `None`.
    fn resolve_keyspace(
        &self,
        keyspace: Option<&str>,
    ) -> Result<Option<&KeyspaceSnapshot>, SchemaError> {
        match keyspace.or(self.current_keyspace.as_deref()) {
            None => Ok(None),
            Some(name) => self
                .snapshot
                .keyspace(name)
                .map(Some)
                .ok_or_else(|| SchemaError::keyspace_not_found(name)),
        }
    }
}

fn decode(keyspace: &KeyspaceSnapshot, table: &TableSnapshot) -> (TableDef, Vec<Diagnostic>) {
    if table.layout.keyspace_name.is_empty() {
        let layout = LayoutRow {
            keyspace_name: keyspace.name.clone(),
            ..table.layout.clone()
        };
        TableDef::build(&layout, &table.columns)
    } else {
        TableDef::build(&table.layout, &table.columns)
    }
}

impl SchemaAccessor for SchemaCatalog {
    fn keyspace_names(&self) -> Result<Vec<String>, SchemaError> {
        Ok(self
            .snapshot
            .keyspaces
            .iter()
            .map(|keyspace| keyspace.name.clone())
            .collect())
    }

    fn columnfamily_names(&self, keyspace: Option<&str>) -> Result<Vec<String>, SchemaError> {
        Ok(self
            .resolve_keyspace(keyspace)?
            .map(|keyspace| {
                keyspace
                    .tables
                    .iter()
                    .map(|table| table.layout.columnfamily_name.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn columnfamily(&self, name: &str, keyspace: Option<&str>) -> Result<TableDef, SchemaError> {
        self.describe(name, keyspace).map(|(table, _)| table)
    }

    fn index_names(&self, keyspace: Option<&str>) -> Result<Vec<String>, SchemaError> {
        let Some(keyspace) = self.resolve_keyspace(keyspace)? else {
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        for table in &keyspace.tables {
            let (table, _) = decode(keyspace, table);
            names.extend(
                table
                    .indexed_columns()
                    .filter_map(|column| column.index_name.clone()),
            );
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaObject;

    fn catalog() -> SchemaCatalog {
        let users = LayoutRow {
            key_alias: Some("id".to_string()),
            key_validator: "UUIDType".to_string(),
            ..LayoutRow::new("", "users")
        };
        let snapshot = SchemaSnapshot {
            keyspaces: vec![
                KeyspaceSnapshot::new("app").with_table(
                    users,
                    vec![
                        ColumnRow::new("name", "UTF8Type"),
                        ColumnRow::new("email", "UTF8Type").with_index("users_email_idx"),
                    ],
                ),
                KeyspaceSnapshot::new("system"),
            ],
        };
        SchemaCatalog::new(snapshot)
    }

    #[test]
    fn test_keyspace_names() {
        assert_eq!(catalog().keyspace_names().unwrap(), vec!["app", "system"]);
    }

    #[test]
    fn test_table_names_need_a_keyspace() {
        let catalog = catalog();
        assert!(catalog.columnfamily_names(None).unwrap().is_empty());
        assert_eq!(catalog.columnfamily_names(Some("app")).unwrap(), vec!["users"]);

        let catalog = catalog.with_current_keyspace("app");
        assert_eq!(catalog.columnfamily_names(None).unwrap(), vec!["users"]);
    }

    #[test]
    fn test_unknown_keyspace_is_not_found() {
        let err = catalog().columnfamily_names(Some("nope")).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::NotFound { kind: SchemaObject::Keyspace, ref name } if name == "nope"
        ));
    }

    #[test]
    fn test_unknown_table_is_not_found() {
        let err = catalog().columnfamily("nope", Some("app")).unwrap_err();
        assert_eq!(err, SchemaError::table_not_found("app.nope"));
        assert!(catalog().columnfamily("users", None).is_err());
    }

    #[test]
    fn test_filterable_columns_are_keys_and_indexed_columns() {
        let catalog = catalog();
        assert_eq!(
            catalog.filterable_column_names("users", Some("app")).unwrap(),
            vec!["id", "email"]
        );
        assert_eq!(
            catalog.index_names(Some("app")).unwrap(),
            vec!["users_email_idx"]
        );
    }

    #[test]
    fn test_keyspace_is_filled_in() {
        let table = catalog().columnfamily("users", Some("app")).unwrap();
        assert_eq!(table.keyspace, "app");
        assert_eq!(table.column("id").unwrap().cql_type, "uuid");
    }

    #[test]
    fn test_from_json() {
        let catalog = SchemaCatalog::from_json(
            r#"{"keyspaces": [{"name": "app", "tables": [
                {"layout": {"columnfamily": "events", "key_alias": "id"}, "columns": []}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(
            catalog.columnfamily_names(Some("app")).unwrap(),
            vec!["events"]
        );
    }
}
