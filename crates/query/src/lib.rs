//! The abstract query model consumed by the interpreter: typed tokens, the
//! sequences that carry them, and the entity value adapter used by save
//! queries.
//!
//! Sequences are produced by the fluent query builder, which lives outside
//! this workspace; this crate only defines the shapes it emits.

pub mod entity;
pub mod sequence;
pub mod tokens;

pub use entity::*;
pub use sequence::*;
pub use tokens::*;
