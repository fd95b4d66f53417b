#![allow(dead_code)]

use std::sync::Arc;

use indexmap::IndexMap;
use stratum_interpreter::interpret::{InterpreterConfig, SqlQueryInterpreter};
use stratum_metadata::metadata::{EntityMetadata, MetadataRegistry, Relationship};

/// The shared fixture: a small schema with auto generated keys, a natural
/// key, a keyless collection and both relationship cardinalities.
pub fn registry() -> MetadataRegistry {
    MetadataRegistry::empty()
        .with(
            EntityMetadata::new("user", "users")
                .with_fields(&["id", "name", "email", "created_at"])
                .with_primary_key("id", true)
                .with_relationship(
                    "address",
                    Relationship::one_to_one("address", "address").with_our_field("address_id"),
                )
                .with_relationship("orders", Relationship::one_to_many("order", "orders")),
        )
        .with(
            EntityMetadata::new("address", "addresses")
                .with_fields(&["id", "street", "city"])
                .with_primary_key("id", true),
        )
        .with(
            EntityMetadata::new("order", "orders")
                .with_fields(&["id", "user_id", "total"])
                .with_primary_key("id", true),
        )
        .with(
            EntityMetadata::new("project", "projects")
                .with_fields(&["code", "name"])
                .with_primary_key("code", false),
        )
        .with(
            EntityMetadata::new("thing", "t")
                .with_fields(&["id", "name"])
                .with_primary_key("id", true),
        )
        .with(EntityMetadata::new("log_entry", "log_entries").with_fields(&["message", "level"]))
}

pub fn interpreter() -> SqlQueryInterpreter {
    interpreter_with(InterpreterConfig::default())
}

pub fn interpreter_with(config: InterpreterConfig) -> SqlQueryInterpreter {
    let mut interpreter = SqlQueryInterpreter::with_default_compilers(config);
    interpreter.set_metadata_provider(Arc::new(registry()));
    interpreter
}

/// Build an ordered field map from a JSON object literal.
pub fn record(value: serde_json::Value) -> IndexMap<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        _ => panic!("expected an object literal"),
    }
}
