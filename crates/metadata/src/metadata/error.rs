//! Errors raised when resolving metadata.

use thiserror::Error;

/// A type for metadata resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("Entity '{0}' not found.")]
    EntityNotFound(String),
}
