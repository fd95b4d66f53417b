//! Metadata information regarding entities and tracked relationships.

pub mod entities;
pub mod error;

// re-export without modules
pub use entities::*;
pub use error::*;

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Source of entity metadata, queried by entity name.
pub trait MetadataProvider {
    /// Look up the metadata for a named entity.
    fn entity_metadata(&self, entity: &str) -> Result<EntityMetadata, MetadataError>;
}

/// A map backed metadata provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MetadataRegistry {
    pub entities: BTreeMap<String, EntityMetadata>,
}

impl MetadataRegistry {
    pub fn empty() -> Self {
        MetadataRegistry {
            entities: BTreeMap::new(),
        }
    }

    /// Register an entity, keyed by its entity name.
    pub fn insert(&mut self, metadata: EntityMetadata) {
        self.entities.insert(metadata.entity.clone(), metadata);
    }

    pub fn with(mut self, metadata: EntityMetadata) -> Self {
        self.insert(metadata);
        self
    }
}

impl MetadataProvider for MetadataRegistry {
    fn entity_metadata(&self, entity: &str) -> Result<EntityMetadata, MetadataError> {
        self.entities
            .get(entity)
            .cloned()
            .ok_or_else(|| MetadataError::EntityNotFound(entity.to_string()))
    }
}
