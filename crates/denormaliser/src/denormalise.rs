//! Fold repeated join rows back into nested, deduplicated entity trees.
//!
//! SQL flattens one-to-many joins into repeated rows; this module reverses
//! that. Column ownership is read from the `<alias>__<field>` prefix
//! convention, alias matching the caller's include map exactly.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stratum_metadata::metadata::{
    EntityMetadata, MetadataError, MetadataProvider, RelationshipKind,
};

/// A flat result row: column name to scalar value.
pub type Row = Map<String, Value>;

/// Options for one denormalisation call.
pub struct DenormaliseOptions<'a> {
    /// Resolves the entity names carried by the include map.
    pub metadata_provider: &'a dyn MetadataProvider,
    /// Alias to entity name, one entry per joined relationship.
    pub include_map: &'a IndexMap<String, String>,
    /// The root entity the rows were selected for.
    pub entity: &'a str,
}

/// One claimed include alias: the relationship it was claimed for, the
/// child's primary key, and the aliases nested beneath it. The whole
/// expansion is computed once from the include map before any row work.
struct Expansion {
    alias: String,
    property: String,
    kind: RelationshipKind,
    primary_key: Option<String>,
    children: Vec<Expansion>,
}

/// Rebuilds entity trees from flat rows.
///
/// Stateless: every call builds and returns a fresh tree, so concurrent
/// calls with independent inputs are safe.
#[derive(Debug, Default)]
pub struct SqlDenormaliser;

impl SqlDenormaliser {
    pub fn new() -> Self {
        SqlDenormaliser
    }

    /// Reconstruct one entity tree per distinct root row, in first seen
    /// order.
    pub fn denormalise(
        &self,
        rows: &[Row],
        options: &DenormaliseOptions,
    ) -> Result<Vec<Value>, MetadataError> {
        let root = options.metadata_provider.entity_metadata(options.entity)?;

        // resolve every included entity up front so unknown names surface
        // before any row work
        let mut resolved: IndexMap<&str, EntityMetadata> = IndexMap::new();
        for (alias, entity) in options.include_map {
            resolved.insert(
                alias.as_str(),
                options.metadata_provider.entity_metadata(entity)?,
            );
        }

        let mut claimed: Vec<String> = vec![];
        let expansions = claim_expansions(&root, &resolved, &mut claimed);

        let Some(first_row) = rows.first() else {
            return Ok(vec![]);
        };

        let root_prefix = detect_root_prefix(first_row, &claimed);
        let root_pk = root.primary_key.as_ref().map(|pk| pk.field.as_str());

        let mut roots: IndexMap<String, Map<String, Value>> = IndexMap::new();
        for row in rows {
            let record = extract_root_record(row, root_prefix.as_deref());
            let key = identity_key(&record, root_pk);
            let node = roots.entry(key).or_insert(record);
            attach_children(row, node, &expansions);
        }

        let trees: Vec<Value> = roots.into_values().map(Value::Object).collect();
        tracing::debug!(rows = rows.len(), roots = trees.len(), "denormalised rows");
        Ok(trees)
    }
}

/// Claim include aliases against an entity's declared relationships, then
/// recurse through each claimed child's own metadata. Every alias is claimed
/// at most once, which keeps the expansion acyclic even on graph shaped
/// metadata.
fn claim_expansions(
    metadata: &EntityMetadata,
    resolved: &IndexMap<&str, EntityMetadata>,
    claimed: &mut Vec<String>,
) -> Vec<Expansion> {
    let mut expansions = vec![];
    for (alias, relationship) in &metadata.relationships {
        if !resolved.contains_key(alias.as_str()) || claimed.iter().any(|c| c == alias) {
            continue;
        }
        claimed.push(alias.clone());
        let child = &resolved[alias.as_str()];
        let children = claim_expansions(child, resolved, claimed);
        expansions.push(Expansion {
            alias: alias.clone(),
            property: relationship.property.clone(),
            kind: relationship.kind,
            primary_key: child.primary_key.as_ref().map(|pk| pk.field.clone()),
            children,
        });
    }
    expansions
}

/// The root's column prefix: the first prefixed column not owned by a
/// claimed alias. Unprefixed columns always belong to the root.
fn detect_root_prefix(row: &Row, claimed: &[String]) -> Option<String> {
    for column in row.keys() {
        if let Some((prefix, _)) = column.split_once("__") {
            if !claimed.iter().any(|alias| alias == prefix) {
                return Some(prefix.to_string());
            }
        }
    }
    None
}

/// Pull the root owned fields out of a row: unprefixed columns and columns
/// carrying the root prefix. Columns owned by other, undeclared prefixes
/// are dropped.
fn extract_root_record(row: &Row, root_prefix: Option<&str>) -> Map<String, Value> {
    let mut record = Map::new();
    for (column, value) in row {
        match column.split_once("__") {
            None => {
                record.insert(column.clone(), decode_json_text(value.clone()));
            }
            Some((prefix, field)) if Some(prefix) == root_prefix => {
                record.insert(field.to_string(), decode_json_text(value.clone()));
            }
            Some(_) => {}
        }
    }
    record
}

/// Pull the fields owned by one include alias out of a row.
fn extract_alias_record(row: &Row, alias: &str) -> Map<String, Value> {
    let mut record = Map::new();
    for (column, value) in row {
        if let Some((prefix, field)) = column.split_once("__") {
            if prefix == alias {
                record.insert(field.to_string(), decode_json_text(value.clone()));
            }
        }
    }
    record
}

/// Best effort decode of JSON container text. Strings whose first non
/// whitespace byte is `[` or `{` and which parse as JSON are replaced by
/// the decoded structure; everything else passes through untouched, so a
/// JSON encoded scalar or malformed text never fails the call.
fn decode_json_text(value: Value) -> Value {
    match &value {
        Value::String(text) => {
            let trimmed = text.trim_start();
            if trimmed.starts_with('[') || trimmed.starts_with('{') {
                match serde_json::from_str::<Value>(text) {
                    Ok(decoded) => decoded,
                    Err(_) => value,
                }
            } else {
                value
            }
        }
        _ => value,
    }
}

/// A node's identity: the primary key value when one is declared and
/// present, otherwise the full set of its own scalar fields. The structural
/// fallback lets keyless queries still deduplicate identical rows.
fn identity_key(record: &Map<String, Value>, primary_key: Option<&str>) -> String {
    match primary_key.and_then(|field| record.get(field)) {
        Some(key) => format!("k:{key}"),
        None => format!("s:{}", Value::Object(record.clone())),
    }
}

/// Whether an existing node holds the same entity as a freshly extracted
/// record: primary key comparison when declared, else every candidate field
/// must match (nested properties already attached to the node are ignored).
fn same_node(
    existing: &Map<String, Value>,
    record: &Map<String, Value>,
    primary_key: Option<&str>,
) -> bool {
    match primary_key {
        Some(field) => match (existing.get(field), record.get(field)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        None => record
            .iter()
            .all(|(field, value)| existing.get(field) == Some(value)),
    }
}

fn find_child_index(
    entries: &[Value],
    record: &Map<String, Value>,
    primary_key: Option<&str>,
) -> Option<usize> {
    entries.iter().position(|entry| match entry {
        Value::Object(existing) => same_node(existing, record, primary_key),
        _ => false,
    })
}

/// Attach one row's child fragments to a parent node, recursing through the
/// expansion for multi level relationships. Deduplication is scoped to the
/// parent, so the same child may legitimately recur under distinct parents.
fn attach_children(row: &Row, node: &mut Map<String, Value>, expansions: &[Expansion]) {
    for expansion in expansions {
        let record = extract_alias_record(row, &expansion.alias);
        // a row whose child columns are all null carries no child fragment
        let is_absent = record.is_empty() || record.values().all(Value::is_null);
        let primary_key = expansion.primary_key.as_deref();

        match expansion.kind {
            RelationshipKind::OneToMany => {
                let slot = node
                    .entry(expansion.property.clone())
                    .or_insert_with(|| Value::Array(vec![]));
                if is_absent {
                    continue;
                }
                let Value::Array(entries) = slot else {
                    continue;
                };
                let index = match find_child_index(entries, &record, primary_key) {
                    Some(index) => index,
                    None => {
                        entries.push(Value::Object(record));
                        entries.len() - 1
                    }
                };
                if let Some(Value::Object(child)) = entries.get_mut(index) {
                    attach_children(row, child, &expansion.children);
                }
            }
            RelationshipKind::OneToOne => {
                if is_absent {
                    continue;
                }
                let keep = match node.get(&expansion.property) {
                    Some(Value::Object(existing)) => same_node(existing, &record, primary_key),
                    _ => false,
                };
                if !keep {
                    node.insert(expansion.property.clone(), Value::Object(record));
                }
                if let Some(Value::Object(child)) = node.get_mut(&expansion.property) {
                    attach_children(row, child, &expansion.children);
                }
            }
        }
    }
}
