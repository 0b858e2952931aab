/* Common utilities shared between analyze and codegen commands */

use anyhow::Context;
use std::path::PathBuf;
use wire_gen::Resolver;
use wire_gen::schema::File;
use wire_loader::ImportResolver;

/* Load every input file with its imports, in dependency order */
pub fn load_files(files: &[PathBuf], include_dirs: Vec<PathBuf>, verbose: bool) -> anyhow::Result<Vec<File>> {
  let mut loader = ImportResolver::new(include_dirs);

  for file in files {
    loader.load_file_with_imports(file)?;
  }

  if verbose {
    println!("[~] Loaded {} file(s) total (including imports)", loader.loaded_file_count());
    for file in loader.files() {
      println!("    - {} ({} structs)", file.name, file.structs.len());
    }
  }

  Ok(loader.into_files())
}

/* Build the resolver for a compilation unit */
pub fn build_resolver(files: &[File]) -> anyhow::Result<Resolver> {
  Resolver::new(files).context("Failed to resolve format descriptions")
}

/* File names listed in the generated header */
pub fn source_names(files: &[PathBuf]) -> Vec<String> {
  files
    .iter()
    .map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default())
    .collect()
}
