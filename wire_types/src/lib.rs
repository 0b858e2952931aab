//! Wire Format Type Definitions
//!
//! This crate contains the typed AST of a loaded format description: files,
//! shared parsing contexts, structures and the recursive type, member and
//! constraint vocabulary. It provides pure data structures without any file
//! I/O or code generation logic.

pub mod expr;
pub mod types;

// Re-export commonly used types at the crate root
pub use expr::*;
pub use types::*;
