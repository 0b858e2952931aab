/* Codegen command - generate a Rust module from format descriptions */

use super::common::{build_resolver, load_files, source_names};
use std::path::PathBuf;
use wire_gen::{RustCodeGenerator, RustCodeGeneratorOptions};

/* Execute the codegen command */
pub fn run(
  files: Vec<PathBuf>,
  include_dirs: Vec<PathBuf>,
  output: PathBuf,
  no_constants: bool,
  verbose: bool,
) -> anyhow::Result<()> {
  if verbose {
    println!("Wire Generator - Code Generation Tool");
    println!("=====================================\n");
    println!("[~] Configuration:");
    println!("  Output file: {}", output.display());
    println!("  Input files: {}", files.len());
    for file in &files {
      println!("    - {}", file.display());
    }
    if !include_dirs.is_empty() {
      println!("  Include directories: {}", include_dirs.len());
      for dir in &include_dirs {
        println!("    - {}", dir.display());
      }
    }
    println!();
  }

  let loaded = load_files(&files, include_dirs, verbose)?;
  let resolver = build_resolver(&loaded)?;

  let options = RustCodeGeneratorOptions {
    emit_constants: !no_constants,
    sources: source_names(&files),
    ..Default::default()
  };
  RustCodeGenerator::new(&resolver, options).write_module(&output)?;

  if verbose {
    println!("[✓] Generated Rust code: {}", output.display());
  }
  Ok(())
}
