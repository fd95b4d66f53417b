//! Compile abstract query token sequences into dialect SQL with bound
//! parameters.

pub mod interpret;
