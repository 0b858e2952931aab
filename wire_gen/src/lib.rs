//! Wire format compiler
//!
//! Turns format descriptions (structs, unions, arrays and integer constraints)
//! into a self-contained Rust module with decode, encode and validate
//! functions for every declared struct.

pub mod codegen;
pub mod dependency;
pub mod error;
pub mod naming;
pub mod schema;

pub use codegen::generate;
pub use codegen::rust::{RustCodeGenerator, RustCodeGeneratorOptions};
pub use error::{GenError, GenResult};
pub use schema::resolved::Resolver;
