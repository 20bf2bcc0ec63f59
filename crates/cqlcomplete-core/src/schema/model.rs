//! Normalized table definitions decoded from raw schema rows.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::escape::escape_value;

use super::diagnostics::Diagnostic;
use super::marshal::{self, cql_typename, MARSHAL_PACKAGE};

const DEFAULT_KEY_ALIAS: &str = "key";

/// Type assumed for key components the comparator does not describe.
const UNTYPED_COMPONENT: &str = "blob";

fn bytes_type() -> String {
    format!("{MARSHAL_PACKAGE}BytesType")
}

/// Per-table layout row, as returned by schema introspection.
///
/// Only the named fields are read; anything else in the row is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayoutRow {
    #[serde(default, alias = "keyspace")]
    pub keyspace_name: String,

    #[serde(alias = "columnfamily")]
    pub columnfamily_name: String,

    #[serde(default = "bytes_type")]
    pub key_validator: String,

    #[serde(default = "bytes_type")]
    pub default_validator: String,

    #[serde(default = "bytes_type")]
    pub comparator: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_alias: Option<String>,

    /// JSON-encoded list of clustering column names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_aliases: Option<String>,

    /// JSON-encoded object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compaction_strategy_options: Option<String>,

    /// JSON-encoded object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_parameters: Option<String>,

    #[serde(flatten)]
    pub options: TableOptions,
}

impl LayoutRow {
    /// A layout row with untyped (`BytesType`) validators and no aliases.
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace_name: keyspace.into(),
            columnfamily_name: table.into(),
            key_validator: bytes_type(),
            default_validator: bytes_type(),
            comparator: bytes_type(),
            key_alias: None,
            value_alias: None,
            column_aliases: None,
            compaction_strategy_options: None,
            compression_parameters: None,
            options: TableOptions::default(),
        }
    }
}

/// Per-column row, as returned by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnRow {
    #[serde(alias = "column")]
    pub column_name: String,

    #[serde(default = "bytes_type")]
    pub validator: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
}

impl ColumnRow {
    pub fn new(name: impl Into<String>, validator: impl Into<String>) -> Self {
        Self {
            column_name: name.into(),
            validator: validator.into(),
            index_name: None,
        }
    }

    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }
}

/// Simple per-table properties carried by the layout row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TableOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom_filter_fp_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caching: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_repair_chance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gc_grace_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_compaction_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_compaction_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicate_on_write: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compaction_strategy_class: Option<String>,
}

impl TableOptions {
    /// The properties that are set, as `(name, CQL literal)` pairs.
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        let text = |value: &Option<String>| value.as_deref().map(escape_value);
        let number = |value: Option<f64>| value.map(|v| v.to_string());
        let integer = |value: Option<i64>| value.map(|v| v.to_string());

        [
            ("comment", text(&self.comment)),
            ("bloom_filter_fp_chance", number(self.bloom_filter_fp_chance)),
            ("caching", text(&self.caching)),
            ("read_repair_chance", number(self.read_repair_chance)),
            ("gc_grace_seconds", integer(self.gc_grace_seconds)),
            ("min_compaction_threshold", integer(self.min_compaction_threshold)),
            ("max_compaction_threshold", integer(self.max_compaction_threshold)),
            (
                "replicate_on_write",
                self.replicate_on_write.map(|v| escape_value(&v.to_string())),
            ),
            ("compaction_strategy_class", text(&self.compaction_strategy_class)),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
    }
}

/// A column with its CQL type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub name: String,
    pub cql_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, cql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cql_type: cql_type.into(),
            index_name: None,
        }
    }
}

/// A normalized table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableDef {
    pub name: String,
    pub keyspace: String,
    pub key_validator: String,
    pub default_validator: String,
    pub comparator: String,
    /// Partition key alias followed by the clustering column aliases.
    pub key_components: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_alias: Option<String>,
    pub compact_storage: bool,
    /// Key columns, then the value column (compact tables) or the declared columns.
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub compaction_strategy_options: BTreeMap<String, String>,
    #[serde(default)]
    pub compression_parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub options: TableOptions,
}

impl TableDef {
    /// Decode a layout row and its column rows.
    ///
    /// Never fails: shape problems and undecodable sub-fields are reported as
    /// diagnostics next to a best-effort definition.
    pub fn build(layout: &LayoutRow, column_rows: &[ColumnRow]) -> (TableDef, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        let column_aliases = decode_list(
            "column_aliases",
            layout.column_aliases.as_deref(),
            &mut diagnostics,
        );
        let compaction_strategy_options = decode_map(
            "compaction_strategy_options",
            layout.compaction_strategy_options.as_deref(),
            &mut diagnostics,
        );
        let compression_parameters = decode_map(
            "compression_parameters",
            layout.compression_parameters.as_deref(),
            &mut diagnostics,
        );

        let key_alias = match non_empty(&layout.key_alias) {
            Some(alias) => alias.to_string(),
            None => {
                diagnostics.push(
                    Diagnostic::structural(format!(
                        "missing key alias; assuming '{DEFAULT_KEY_ALIAS}'"
                    ))
                    .with_field("key_alias"),
                );
                DEFAULT_KEY_ALIAS.to_string()
            }
        };
        let mut key_components = vec![key_alias];
        key_components.extend(column_aliases.iter().cloned());

        let value_alias = non_empty(&layout.value_alias).map(str::to_string);
        let composite = marshal::composite_components(&layout.comparator);

        // Comparator components that type the clustering columns.
        let clustering_types: Vec<String> = match (&value_alias, &composite) {
            (Some(_), None) if column_aliases.is_empty() => Vec::new(),
            (Some(_), Some(components)) => components.clone(),
            (Some(_), None) => vec![layout.comparator.clone()],
            // The trailing component names the cell, not a key column.
            (None, Some(components)) => {
                components[..components.len().saturating_sub(1)].to_vec()
            }
            (None, None) => Vec::new(),
        };

        let expected = 1 + clustering_types.len();
        if value_alias.is_none() && composite.is_none() && !column_aliases.is_empty() {
            diagnostics.push(
                Diagnostic::structural(format!(
                    "column aliases {column_aliases:?} are unexpected for a single-column key"
                ))
                .with_field("column_aliases"),
            );
        } else if expected != key_components.len() {
            diagnostics.push(Diagnostic::structural(format!(
                "key validator and comparator describe {expected} key components, \
                 but {} are named",
                key_components.len()
            )));
        }

        match (&value_alias, &composite) {
            (Some(alias), _) if !column_rows.is_empty() => {
                diagnostics.push(Diagnostic::structural(format!(
                    "compact storage table has {} declared column rows; \
                     using value alias '{alias}' and ignoring them",
                    column_rows.len()
                )));
            }
            (None, Some(_)) if column_rows.is_empty() => {
                diagnostics.push(Diagnostic::structural(
                    "composite comparator without value alias, but no declared columns",
                ));
            }
            _ => {}
        }

        let key_validator = cql_typename(&layout.key_validator);
        let default_validator = cql_typename(&layout.default_validator);

        let mut columns: Vec<ColumnDef> = Vec::new();
        let mut add_column = |column: ColumnDef, diagnostics: &mut Vec<Diagnostic>| {
            if columns.iter().any(|existing| existing.name == column.name) {
                diagnostics.push(Diagnostic::structural(format!(
                    "duplicate column '{}' skipped",
                    column.name
                )));
            } else {
                columns.push(column);
            }
        };

        for (i, name) in key_components.iter().enumerate() {
            let cql_type = if i == 0 {
                key_validator.clone()
            } else {
                clustering_types
                    .get(i - 1)
                    .map_or_else(|| UNTYPED_COMPONENT.to_string(), |t| cql_typename(t))
            };
            add_column(ColumnDef::new(name, cql_type), &mut diagnostics);
        }

        match &value_alias {
            Some(alias) => add_column(
                ColumnDef::new(alias, default_validator.clone()),
                &mut diagnostics,
            ),
            None => {
                for row in column_rows {
                    add_column(
                        ColumnDef {
                            name: row.column_name.clone(),
                            cql_type: cql_typename(&row.validator),
                            index_name: non_empty(&row.index_name).map(str::to_string),
                        },
                        &mut diagnostics,
                    );
                }
            }
        }

        let table = TableDef {
            name: layout.columnfamily_name.clone(),
            keyspace: layout.keyspace_name.clone(),
            key_validator,
            default_validator,
            comparator: cql_typename(&layout.comparator),
            key_components,
            compact_storage: value_alias.is_some(),
            value_alias,
            columns,
            compaction_strategy_options,
            compression_parameters,
            options: layout.options.clone(),
        };

        let qualified = table.qualified_name();
        let diagnostics = diagnostics
            .into_iter()
            .map(|d| d.with_table(qualified.clone()))
            .collect();

        (table, diagnostics)
    }

    /// `keyspace.table`, or just the table name when the keyspace is unknown.
    pub fn qualified_name(&self) -> String {
        if self.keyspace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.keyspace, self.name)
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.key_components.first().map(String::as_str)
    }

    pub fn clustering_columns(&self) -> &[String] {
        self.key_components.get(1..).unwrap_or_default()
    }

    pub fn is_key_column(&self, name: &str) -> bool {
        self.key_components.iter().any(|key| key == name)
    }

    /// Columns that are not part of the primary key.
    pub fn regular_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns
            .iter()
            .filter(move |column| !self.is_key_column(&column.name))
    }

    pub fn indexed_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns
            .iter()
            .filter(|column| column.index_name.is_some())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn decode_value(field: &str, raw: Option<&str>, diagnostics: &mut Vec<Diagnostic>) -> Value {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Value::Null;
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        diagnostics.push(Diagnostic::malformed(field, format!("invalid JSON: {e}")));
        Value::Null
    })
}

fn decode_list(field: &str, raw: Option<&str>, diagnostics: &mut Vec<Diagnostic>) -> Vec<String> {
    match decode_value(field, raw, diagnostics) {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(stringify).collect(),
        other => {
            diagnostics.push(Diagnostic::malformed(
                field,
                format!("expected a JSON list, found {other}"),
            ));
            Vec::new()
        }
    }
}

fn decode_map(
    field: &str,
    raw: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<String, String> {
    match decode_value(field, raw, diagnostics) {
        Value::Null => BTreeMap::new(),
        Value::Object(entries) => entries
            .into_iter()
            .map(|(key, value)| (key, stringify(value)))
            .collect(),
        other => {
            diagnostics.push(Diagnostic::malformed(
                field,
                format!("expected a JSON object, found {other}"),
            ));
            BTreeMap::new()
        }
    }
}
