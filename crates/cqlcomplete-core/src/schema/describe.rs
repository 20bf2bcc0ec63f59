//! Renders a [`TableDef`] back into CQL DDL.

use crate::escape::{escape_value, maybe_escape_name};

use super::model::TableDef;

/// `CREATE TABLE` statement for `table`, followed by one `CREATE INDEX` per
/// indexed column.
pub fn create_table_statement(table: &TableDef) -> String {
    let qualified = qualified_name(table);

    let mut body: Vec<String> = table
        .columns
        .iter()
        .map(|column| format!("  {} {}", maybe_escape_name(&column.name), column.cql_type))
        .collect();
    let keys: Vec<String> = table
        .key_components
        .iter()
        .map(|key| maybe_escape_name(key))
        .collect();
    body.push(format!("  PRIMARY KEY ({})", keys.join(", ")));

    let mut properties: Vec<String> = Vec::new();
    if table.compact_storage {
        properties.push("COMPACT STORAGE".to_string());
    }
    properties.extend(
        table
            .options
            .properties()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}")),
    );
    properties.extend(map_properties(
        "compaction_strategy_options",
        &table.compaction_strategy_options,
    ));
    properties.extend(map_properties(
        "compression_parameters",
        &table.compression_parameters,
    ));

    let mut statement = format!("CREATE TABLE {qualified} (\n{}\n)", body.join(",\n"));
    if !properties.is_empty() {
        statement.push_str(" WITH\n  ");
        statement.push_str(&properties.join(" AND\n  "));
    }
    statement.push(';');

    for column in table.indexed_columns() {
        if let Some(index) = &column.index_name {
            statement.push_str(&format!(
                "\n\nCREATE INDEX {} ON {qualified} ({});",
                maybe_escape_name(index),
                maybe_escape_name(&column.name)
            ));
        }
    }

    statement
}

fn qualified_name(table: &TableDef) -> String {
    if table.keyspace.is_empty() {
        maybe_escape_name(&table.name)
    } else {
        format!(
            "{}.{}",
            maybe_escape_name(&table.keyspace),
            maybe_escape_name(&table.name)
        )
    }
}

fn map_properties<'a>(
    prefix: &'a str,
    entries: &'a std::collections::BTreeMap<String, String>,
) -> impl Iterator<Item = String> + 'a {
    entries
        .iter()
        .map(move |(key, value)| format!("{prefix}:{key}={}", escape_value(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnRow, LayoutRow};

    #[test]
    fn test_simple_table() {
        let layout = LayoutRow {
            key_alias: Some("id".to_string()),
            key_validator: "UUIDType".to_string(),
            ..LayoutRow::new("app", "users")
        };
        let rows = vec![
            ColumnRow::new("select", "UTF8Type"),
            ColumnRow::new("email", "UTF8Type").with_index("users_email_idx"),
        ];
        let (table, _) = TableDef::build(&layout, &rows);

        insta::assert_snapshot!(create_table_statement(&table), @r###"
        CREATE TABLE app.users (
          id uuid,
          "select" text,
          email text,
          PRIMARY KEY (id)
        );

        CREATE INDEX users_email_idx ON app.users (email);
        "###);
    }
}
