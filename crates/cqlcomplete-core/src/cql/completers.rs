//! Schema-aware completers for the CQL grammar's binding sites.

use crate::completion::{BindingContext, CompleterRegistry};
use crate::error::{GrammarError, SchemaError};
use crate::escape::{escape_value, maybe_escape_name, unescape_name};
use crate::schema::{SchemaAccessor, TableDef};

/// Levels accepted after `USING CONSISTENCY`.
pub const CONSISTENCY_LEVELS: &[&str] = &[
    "ONE",
    "TWO",
    "THREE",
    "QUORUM",
    "ALL",
    "ANY",
    "LOCAL_QUORUM",
    "EACH_QUORUM",
];

/// Scalar table properties settable with `WITH name = value`.
pub const COLUMNFAMILY_OPTIONS: &[&str] = &[
    "comment",
    "bloom_filter_fp_chance",
    "caching",
    "read_repair_chance",
    "gc_grace_seconds",
    "min_compaction_threshold",
    "max_compaction_threshold",
    "replicate_on_write",
    "compaction_strategy_class",
];

/// Map-valued table properties and their known keys, set as `name:key = value`.
pub const COLUMNFAMILY_MAP_OPTIONS: &[(&str, &[&str])] = &[
    ("compaction_strategy_options", &[]),
    (
        "compression_parameters",
        &["sstable_compression", "chunk_length_kb", "crc_check_chance"],
    ),
];

pub const KEYSPACE_OPTIONS: &[&str] = &[
    "strategy_class",
    "strategy_options:replication_factor",
    "durable_writes",
];

const REPLICATION_STRATEGIES: &[&str] = &[
    "SimpleStrategy",
    "NetworkTopologyStrategy",
    "OldNetworkTopologyStrategy",
];
const COMPACTION_STRATEGIES: &[&str] =
    &["SizeTieredCompactionStrategy", "LeveledCompactionStrategy"];
const CACHING_MODES: &[&str] = &["ALL", "KEYS_ONLY", "ROWS_ONLY", "NONE"];
const COMPRESSORS: &[&str] = &["SnappyCompressor", "DeflateCompressor"];
const BOOLEANS: &[&str] = &["true", "false"];

const MODIFICATION_OPTIONS: &[&str] = &["CONSISTENCY", "TIMESTAMP", "TTL"];
const DELETE_OPTIONS: &[&str] = &["CONSISTENCY", "TIMESTAMP"];

/// Register every completer and hint of the CQL grammar.
pub fn register(registry: &mut CompleterRegistry) -> Result<(), GrammarError> {
    registry
        .register_completer("keyspaceName", "ksname", keyspace_names)?
        .register_completer("columnFamilyName", "ksname", keyspace_qualifiers)?
        .register_completer("columnFamilyName", "cfname", table_names)?
        .register_completer("relation", "rel_lhs", where_columns)?
        .register_completer("orderByClause", "ordercol", clustering_columns)?
        .register_completer("insertStatement", "colname", insert_columns)?
        .register_completer("assignment", "update_col", update_columns)?
        .register_keyword_completer("insertStatement", "insertopt", |ctx, _| {
            Ok(remaining_options(MODIFICATION_OPTIONS, ctx.values("insertopt")))
        })?
        .register_keyword_completer("updateStatement", "updateopt", |ctx, _| {
            Ok(remaining_options(MODIFICATION_OPTIONS, ctx.values("updateopt")))
        })?
        .register_keyword_completer("deleteStatement", "delopt", |ctx, _| {
            Ok(remaining_options(DELETE_OPTIONS, ctx.values("delopt")))
        })?
        .register_completer("ksProperty", "optname", keyspace_property_names)?
        .register_completer("ksProperty", "optval", keyspace_property_values)?
        .register_completer("cfProperty", "propname", table_property_names)?
        .register_completer("cfProperty", "propval", table_property_values)?
        .register_completer("createColumnFamilyStatement", "ksname", keyspace_qualifiers)?
        .register_completer("createColumnFamilyStatement", "pkey", primary_key_columns)?
        .register_completer("createIndexStatement", "idxcol", unindexed_columns)?
        .register_completer("dropIndexStatement", "indexname", index_names)?
        .register_completer("alterInstructions", "existcol", alterable_columns)?;

    registry
        .register_hint("createKeyspaceStatement", "ksname", "<new_keyspace_name>")?
        .register_hint("createColumnFamilyStatement", "cfname", "<new_table_name>")?
        .register_hint("columnDefinition", "newcolname", "<new_column_name>")?
        .register_hint("alterInstructions", "newcol", "<new_column_name>")?
        .register_hint("createIndexStatement", "indexname", "<new_index_name>")?
        .register_hint("selectClause", "colname", "<column_name>")?
        .register_hint("deleteStatement", "delcol", "<column_name>")?
        .register_hint("relation", "rel_rhs", "<value>")?
        .register_hint("insertStatement", "newval", "<value>")?
        .register_hint("assignment", "update_val", "<value>")?
        .register_hint("selectStatement", "limit", "<wholenumber>")?
        .register_hint("usingOption", "optval", "<wholenumber>")?
        .register_hint("deleteOption", "optval", "<wholenumber>")?;

    Ok(())
}

fn keyspace_names(
    _ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    Ok(escape_all(schema.keyspace_names()?))
}

/// Keyspace names followed by the `.` that qualifies a table name.
fn keyspace_qualifiers(
    _ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    Ok(schema
        .keyspace_names()?
        .iter()
        .map(|name| format!("{}.", maybe_escape_name(name)))
        .collect())
}

fn table_names(
    ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let keyspace = bound_keyspace(ctx);
    Ok(escape_all(schema.columnfamily_names(keyspace.as_deref())?))
}

fn where_columns(
    ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let Some(table) = bound_table(ctx) else {
        return Ok(Vec::new());
    };
    let keyspace = bound_keyspace(ctx);
    let filterable = schema.filterable_column_names(&table, keyspace.as_deref())?;
    Ok(escape_unused(filterable, ctx.values("rel_lhs")))
}

fn clustering_columns(
    ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let Some(table) = context_table(ctx, schema)? else {
        return Ok(Vec::new());
    };
    Ok(escape_all(table.clustering_columns().to_vec()))
}

/// Missing key components while any remain, then the other columns. Columns
/// already listed are never offered again.
fn insert_columns(
    ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let Some(table) = context_table(ctx, schema)? else {
        return Ok(Vec::new());
    };
    let chosen = ctx.values("colname");

    let missing_keys = escape_unused(table.key_components.clone(), chosen);
    if !missing_keys.is_empty() {
        return Ok(missing_keys);
    }
    let regular = table.regular_columns().map(|c| c.name.clone()).collect();
    Ok(escape_unused(regular, chosen))
}

fn update_columns(
    ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let Some(table) = context_table(ctx, schema)? else {
        return Ok(Vec::new());
    };
    let regular = table.regular_columns().map(|c| c.name.clone()).collect();
    Ok(escape_unused(regular, ctx.values("update_col")))
}

fn alterable_columns(
    ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let Some(table) = context_table(ctx, schema)? else {
        return Ok(Vec::new());
    };
    Ok(escape_all(
        table.regular_columns().map(|c| c.name.clone()).collect(),
    ))
}

fn unindexed_columns(
    ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let Some(table) = context_table(ctx, schema)? else {
        return Ok(Vec::new());
    };
    Ok(escape_all(
        table
            .columns
            .iter()
            .filter(|c| c.index_name.is_none() && !table.is_key_column(&c.name))
            .map(|c| c.name.clone())
            .collect(),
    ))
}

fn index_names(
    _ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    Ok(escape_all(schema.index_names(None)?))
}

/// Columns declared earlier in the same `CREATE TABLE`, minus those already in
/// the primary key list.
fn primary_key_columns(
    ctx: &BindingContext,
    _schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let declared = ctx.values("newcolname").iter().map(|c| unescape_name(c)).collect();
    Ok(escape_unused(declared, ctx.values("pkey")))
}

fn keyspace_property_names(
    ctx: &BindingContext,
    _schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    Ok(unset_properties(
        KEYSPACE_OPTIONS.iter().map(|s| s.to_string()),
        ctx.values("optname"),
    ))
}

fn keyspace_property_values(
    ctx: &BindingContext,
    _schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let values: &[&str] = match property_key(ctx.get("optname")).as_str() {
        "strategy_class" => REPLICATION_STRATEGIES,
        "durable_writes" => BOOLEANS,
        _ => &[],
    };
    Ok(values.iter().map(|v| escape_value(v)).collect())
}

fn table_property_names(
    ctx: &BindingContext,
    _schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let scalar = COLUMNFAMILY_OPTIONS.iter().map(|s| s.to_string());
    let mapped = COLUMNFAMILY_MAP_OPTIONS
        .iter()
        .flat_map(|(name, keys)| keys.iter().map(move |key| format!("{name}:{key}")));
    Ok(unset_properties(scalar.chain(mapped), ctx.values("propname")))
}

fn table_property_values(
    ctx: &BindingContext,
    _schema: &dyn SchemaAccessor,
) -> Result<Vec<String>, SchemaError> {
    let values: &[&str] = match property_key(ctx.get("propname")).as_str() {
        "compaction_strategy_class" => COMPACTION_STRATEGIES,
        "caching" => CACHING_MODES,
        "replicate_on_write" => BOOLEANS,
        "compression_parameters:sstable_compression" => COMPRESSORS,
        _ => &[],
    };
    Ok(values.iter().map(|v| escape_value(v)).collect())
}

/// Options from `universe` not yet used, judged by each chosen option's first word.
fn remaining_options(universe: &[&str], chosen: &[String]) -> Vec<String> {
    let used: Vec<String> = chosen
        .iter()
        .filter_map(|option| option.split_whitespace().next())
        .map(|word| word.to_uppercase())
        .collect();
    universe
        .iter()
        .filter(|option| !used.iter().any(|u| u == *option))
        .map(|option| option.to_string())
        .collect()
}

/// Bound property names are joined token texts (`compression_parameters : chunk_length_kb`).
fn property_key(bound: Option<&str>) -> String {
    bound
        .map(|name| name.split_whitespace().collect::<String>().to_lowercase())
        .unwrap_or_default()
}

fn unset_properties(names: impl Iterator<Item = String>, chosen: &[String]) -> Vec<String> {
    let set: Vec<String> = chosen.iter().map(|c| property_key(Some(c))).collect();
    names.filter(|name| !set.contains(name)).collect()
}

/// The keyspace qualifier of the table reference being matched. The binding
/// covers the trailing `.` and is cleared when the reference is unqualified.
fn bound_keyspace(ctx: &BindingContext) -> Option<String> {
    let qualifier = ctx.get("ksname")?;
    let name = qualifier.trim_end().strip_suffix('.').unwrap_or(qualifier);
    Some(unescape_name(name))
}

fn bound_table(ctx: &BindingContext) -> Option<String> {
    ctx.get("cfname").map(unescape_name)
}

fn context_table(
    ctx: &BindingContext,
    schema: &dyn SchemaAccessor,
) -> Result<Option<TableDef>, SchemaError> {
    let Some(name) = bound_table(ctx) else {
        return Ok(None);
    };
    let keyspace = bound_keyspace(ctx);
    schema.columnfamily(&name, keyspace.as_deref()).map(Some)
}

fn escape_all(names: Vec<String>) -> Vec<String> {
    names.iter().map(|name| maybe_escape_name(name)).collect()
}

/// Escape the names not already bound in `used`. Bound names are unquoted and
/// compared with the stored names exactly, as completion offered them.
fn escape_unused(names: Vec<String>, used: &[String]) -> Vec<String> {
    let used: Vec<String> = used.iter().map(|u| unescape_name(u)).collect();
    names
        .iter()
        .filter(|name| !used.contains(name))
        .map(|name| maybe_escape_name(name))
        .collect()
}
