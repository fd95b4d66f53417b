//! The compiled artifact handed to the database driver.

use indexmap::IndexMap;

/// An interpreted query: SQL text, bound parameters and, for inserts against
/// an auto generated key, the sequence to query for the new key value.
///
/// Constructed once per interpretation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub parameters: IndexMap<String, serde_json::Value>,
    pub primary_key_sequence: Option<String>,
}
