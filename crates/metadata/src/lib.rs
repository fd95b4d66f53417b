//! Relational metadata describing entities, their physical collections and
//! the relationships between them.

pub mod metadata;

pub use metadata::*;
