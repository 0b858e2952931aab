//! Format Description Loading and Import Resolution
//!
//! This crate provides functionality for loading format description
//! documents from disk, resolving imports between them, and handing the
//! resulting AST files to the generator.

pub mod file;
pub mod resolver;

// Re-export commonly used types at the crate root
pub use file::WireFile;
pub use resolver::ImportResolver;

// Re-export wire_types for convenience
pub use wire_types;
