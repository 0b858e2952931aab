/* Compiles every fixture format into a module under OUT_DIR */

use anyhow::Context as _;
use std::env;
use std::path::PathBuf;
use wire_gen::{Resolver, RustCodeGenerator, RustCodeGeneratorOptions};
use wire_loader::ImportResolver;

const FIXTURES: &[&str] = &["arrays", "strings", "unions", "nested", "socks5", "contexts", "leftover", "recursive"];

fn main() -> anyhow::Result<()> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let fixtures = manifest_dir.join("fixtures");
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    println!("cargo:rerun-if-changed={}", fixtures.display());

    for name in FIXTURES {
        let source = fixtures.join(format!("{}.yaml", name));
        println!("cargo:rerun-if-changed={}", source.display());

        let mut loader = ImportResolver::new(vec![fixtures.clone()]);
        loader
            .load_file_with_imports(&source)
            .with_context(|| format!("Failed to load fixture {}", source.display()))?;
        let resolver = Resolver::new(loader.files())?;

        let options = RustCodeGeneratorOptions {
            sources: vec![format!("{}.yaml", name)],
            ..RustCodeGeneratorOptions::default()
        };
        RustCodeGenerator::new(&resolver, options)
            .write_module(&out_dir.join(format!("{}.rs", name)))
            .with_context(|| format!("Failed to generate code for fixture '{}'", name))?;
    }

    Ok(())
}
