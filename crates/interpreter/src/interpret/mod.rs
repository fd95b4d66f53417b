//! Interpret a token sequence into a [`CompiledQuery`] ready for a driver.
//!
//! One compiler per query kind renders the sequence to SQL text; shared
//! token rendering and all call scoped state (parameters, quoting, the
//! primary key sequence slot) live in a [`RenderContext`] constructed fresh
//! for every interpretation.

pub mod compiled;
pub mod compilers;
pub mod context;
pub mod error;
pub mod render;

mod interpreter;

pub use compiled::CompiledQuery;
pub use context::{ParameterMode, RenderContext};
pub use error::InterpretationError;
pub use interpreter::{InterpreterConfig, QueryTypeCompiler, SqlQueryInterpreter};
