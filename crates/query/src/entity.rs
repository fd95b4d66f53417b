//! Entity payloads carried by save queries.

use indexmap::IndexMap;

/// Field accessor protocol for entity objects.
///
/// `field` returns `None` when the entity exposes no accessor for the
/// property at all; a present-but-null value is `Some(Value::Null)`. The
/// distinction matters: a missing primary key accessor is an interpretation
/// error, while a null key value simply routes a save to INSERT.
pub trait EntityAccess {
    /// Look up a scalar field by property name (the entity's own naming
    /// convention, not the storage one).
    fn field(&self, property: &str) -> Option<serde_json::Value>;

    /// Look up a related entity by relationship property name.
    fn related(&self, property: &str) -> Option<&dyn EntityAccess> {
        let _ = property;
        None
    }

    /// Export every scalar field, keyed by property name.
    fn export(&self) -> IndexMap<String, serde_json::Value>;
}

/// An entity payload: either a plain field map already in storage naming,
/// or an object reached through the [`EntityAccess`] adapter.
pub enum EntityValue {
    Record(IndexMap<String, serde_json::Value>),
    Object(Box<dyn EntityAccess>),
}

impl EntityValue {
    pub fn record(fields: IndexMap<String, serde_json::Value>) -> Self {
        EntityValue::Record(fields)
    }

    pub fn object(entity: impl EntityAccess + 'static) -> Self {
        EntityValue::Object(Box::new(entity))
    }
}

impl std::fmt::Debug for EntityValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EntityValue::Record(fields) => f.debug_tuple("Record").field(fields).finish(),
            EntityValue::Object(_) => f.write_str("Object(..)"),
        }
    }
}
