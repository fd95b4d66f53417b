//! One compiler per query kind.

pub mod delete;
pub mod save;
pub mod select;

pub use delete::DeleteCompiler;
pub use save::SaveCompiler;
pub use select::SelectCompiler;

use crate::interpret::interpreter::QueryTypeCompiler;

/// The standard compiler set, one per supported query kind.
pub fn default_compilers() -> Vec<Box<dyn QueryTypeCompiler>> {
    vec![
        Box::new(SelectCompiler),
        Box::new(SaveCompiler),
        Box::new(DeleteCompiler),
    ]
}
