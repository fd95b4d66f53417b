//! Entity metadata types.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata for one entity and its physical collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityMetadata {
    pub entity: String,
    pub collection: String,
    /// Field names in storage order.
    pub fields: Vec<String>,
    #[serde(default)]
    pub primary_key: Option<PrimaryKey>,
    /// Relationships keyed by the alias used in include maps.
    #[serde(default)]
    pub relationships: IndexMap<String, Relationship>,
}

impl EntityMetadata {
    pub fn new(entity: impl Into<String>, collection: impl Into<String>) -> Self {
        EntityMetadata {
            entity: entity.into(),
            collection: collection.into(),
            fields: vec![],
            primary_key: None,
            relationships: IndexMap::new(),
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|field| (*field).to_string()).collect();
        self
    }

    pub fn with_primary_key(mut self, field: impl Into<String>, auto_generated: bool) -> Self {
        self.primary_key = Some(PrimaryKey {
            field: field.into(),
            auto_generated,
        });
        self
    }

    pub fn with_relationship(
        mut self,
        alias: impl Into<String>,
        relationship: Relationship,
    ) -> Self {
        self.relationships.insert(alias.into(), relationship);
        self
    }
}

/// The primary key of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrimaryKey {
    pub field: String,
    /// Whether the database assigns the key value at insert time.
    #[serde(default)]
    pub auto_generated: bool,
}

/// Relationship cardinality between a parent and a child collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
}

/// A relationship from a parent entity to a related child entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Relationship {
    pub kind: RelationshipKind,
    /// Target entity name.
    pub entity: String,
    /// Property on the parent entity holding the related value(s).
    pub property: String,
    /// Local foreign key column (one to one only).
    #[serde(default)]
    pub our_field: Option<String>,
    /// Referenced key on the child; defaults to the child's primary key.
    #[serde(default)]
    pub their_field: Option<String>,
}

impl Relationship {
    pub fn one_to_one(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Relationship {
            kind: RelationshipKind::OneToOne,
            entity: entity.into(),
            property: property.into(),
            our_field: None,
            their_field: None,
        }
    }

    pub fn one_to_many(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Relationship {
            kind: RelationshipKind::OneToMany,
            entity: entity.into(),
            property: property.into(),
            our_field: None,
            their_field: None,
        }
    }

    pub fn with_our_field(mut self, field: impl Into<String>) -> Self {
        self.our_field = Some(field.into());
        self
    }

    pub fn with_their_field(mut self, field: impl Into<String>) -> Self {
        self.their_field = Some(field.into());
        self
    }
}
