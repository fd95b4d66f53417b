//! Reconstruct nested entity trees from the flat, join flattened rows a
//! database driver returns.

pub mod denormalise;

pub use denormalise::{DenormaliseOptions, Row, SqlDenormaliser};
