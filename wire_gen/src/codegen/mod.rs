pub mod rust;
pub mod rust_gen;
pub mod sink;

use crate::error::GenResult;
use crate::schema::File;
use crate::schema::resolved::Resolver;
use rust::{RustCodeGenerator, RustCodeGeneratorOptions};

/// Generate the Rust module for a compilation unit of loaded files.
pub fn generate(files: &[File], options: RustCodeGeneratorOptions) -> GenResult<String> {
  let resolver = Resolver::new(files)?;
  RustCodeGenerator::new(&resolver, options).emit_code()
}
