//! Errors for query interpretation.

use stratum_metadata::metadata::MetadataError;
use stratum_query::{Operator, QueryKind};
use thiserror::Error;

/// A type for interpretation errors. All of them are fatal to the current
/// call and surfaced to the caller.
#[derive(Debug, Error)]
pub enum InterpretationError {
    #[error("Cannot interpret any queries without an entity metadata provider.")]
    NoMetadataProvider,

    #[error("The query kind '{0}' is not supported by any of the registered compilers.")]
    UnsupportedQueryKind(QueryKind),

    #[error("Expected an entity token at the start of a save query.")]
    MissingEntity,

    #[error("Save queries carry entity tokens only; found a {0} token.")]
    UnexpectedToken(&'static str),

    #[error("The entity does not expose an accessor for '{property}'.")]
    MissingAccessor { property: String },

    #[error("The operator '{0:?}' is missing its operands.")]
    MalformedCondition(Operator),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}
