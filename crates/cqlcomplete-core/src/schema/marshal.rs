//! Translation of storage-engine type descriptors into CQL type names.
//!
//! Descriptors look like `org.apache.cassandra.db.marshal.UTF8Type` or
//! `org.apache.cassandra.db.marshal.MapType(org.apache.cassandra.db.marshal.UTF8Type,org.apache.cassandra.db.marshal.Int32Type)`.

/// Package prefix carried by fully qualified descriptors.
pub const MARSHAL_PACKAGE: &str = "org.apache.cassandra.db.marshal.";

/// Class name of the composite comparator wrapper.
pub const COMPOSITE_TYPE: &str = "CompositeType";

const SIMPLE_TYPES: &[(&str, &str)] = &[
    ("AsciiType", "ascii"),
    ("LongType", "bigint"),
    ("BytesType", "blob"),
    ("BooleanType", "boolean"),
    ("CounterColumnType", "counter"),
    ("DecimalType", "decimal"),
    ("DoubleType", "double"),
    ("FloatType", "float"),
    ("InetAddressType", "inet"),
    ("Int32Type", "int"),
    ("UTF8Type", "text"),
    ("DateType", "timestamp"),
    ("TimestampType", "timestamp"),
    ("UUIDType", "uuid"),
    ("IntegerType", "varint"),
    ("TimeUUIDType", "timeuuid"),
];

/// Translate a type descriptor into its CQL display name.
///
/// Unknown classes keep their (unqualified) class name, with parameters
/// translated recursively.
///
/// # Examples
/// - `org.apache.cassandra.db.marshal.UTF8Type` → `text`
/// - `ReversedType(Int32Type)` → `int`
/// - `MapType(UTF8Type,LongType)` → `map<text, bigint>`
pub fn cql_typename(descriptor: &str) -> String {
    let (class, params) = split_class(descriptor);

    match (class, params.as_deref()) {
        ("ReversedType", Some([inner])) => cql_typename(inner),
        ("ListType", Some([element])) => format!("list<{}>", cql_typename(element)),
        ("SetType", Some([element])) => format!("set<{}>", cql_typename(element)),
        ("MapType", Some([key, value])) => {
            format!("map<{}, {}>", cql_typename(key), cql_typename(value))
        }
        (class, None) => SIMPLE_TYPES
            .iter()
            .find(|(marshal, _)| *marshal == class)
            .map_or_else(|| class.to_string(), |(_, cql)| cql.to_string()),
        (class, Some(params)) => {
            let params: Vec<String> = params.iter().map(|p| cql_typename(p)).collect();
            format!("{class}({})", params.join(", "))
        }
    }
}

/// Components of a composite comparator, or `None` if `descriptor` is not a
/// composite. Components are returned as raw descriptors.
pub fn composite_components(descriptor: &str) -> Option<Vec<String>> {
    match split_class(descriptor) {
        (COMPOSITE_TYPE, Some(params)) => Some(params),
        _ => None,
    }
}

/// True if `descriptor` is the composite comparator wrapper.
pub fn is_composite(descriptor: &str) -> bool {
    composite_components(descriptor).is_some()
}

/// Split `Class(a,b)` into the unqualified class name and its top-level
/// parameters.
fn split_class(descriptor: &str) -> (&str, Option<Vec<String>>) {
    let descriptor = descriptor.trim();
    let descriptor = descriptor
        .strip_prefix(MARSHAL_PACKAGE)
        .unwrap_or(descriptor);

    match descriptor.find('(') {
        Some(open) if descriptor.ends_with(')') => {
            let inner = &descriptor[open + 1..descriptor.len() - 1];
            (descriptor[..open].trim(), Some(split_top_level(inner)))
        }
        _ => (descriptor, None),
    }
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(params: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in params.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(params[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = params[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last.to_string());
    }
    parts
}
