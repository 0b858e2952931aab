use crate::codegen::rust_gen::{
  EmitCtx, RUNTIME_PREAMBLE, emit_constant, emit_context_decl, emit_struct_decl, emit_struct_impl, module_header,
};
use crate::codegen::sink::{CodeSink, ModuleSink, Section};
use crate::dependency::DependencyAnalyzer;
use crate::error::{GenError, GenResult};
use crate::naming::{RESERVED_TYPE_IDENTS, type_ident};
use crate::schema::resolved::Resolver;
use crate::schema::{Context, Struct};
use anyhow::Context as _;
use std::path::Path;
use tracing::{debug, info};

pub struct RustCodeGenerator<'a> {
  resolver: &'a Resolver,
  options: RustCodeGeneratorOptions,
}

#[derive(Debug, Clone)]
pub struct RustCodeGeneratorOptions {
  /* Free text placed in the header comment */
  pub module_doc: Option<String>,
  pub emit_constants: bool,
  pub emit_parse_fns: bool,
  /* Source documents listed in the header comment */
  pub sources: Vec<String>,
}

impl Default for RustCodeGeneratorOptions {
  fn default() -> Self {
    Self { module_doc: None, emit_constants: true, emit_parse_fns: true, sources: Vec::new() }
  }
}

impl<'a> RustCodeGenerator<'a> {
  pub fn new(resolver: &'a Resolver, options: RustCodeGeneratorOptions) -> Self {
    Self { resolver, options }
  }

  /// Check the whole compilation unit before anything is emitted.
  pub fn analyze(&self) -> GenResult<()> {
    let structs: Vec<&Struct> = self.resolver.structs().collect();
    let contexts: Vec<&Context> = self.resolver.contexts().collect();
    let analysis = DependencyAnalyzer::new().analyze(&structs, &contexts);
    match analysis.first_error() {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }

  /// Emit the complete module into `sink`. Stops at the first error.
  pub fn emit_into<S: CodeSink>(&self, sink: &mut S) -> GenResult<()> {
    self.analyze()?;
    self.seed_declarations(sink)?;

    let mut preamble = module_header(&self.options.sources, self.options.module_doc.as_deref());
    preamble.push('\n');
    preamble.push_str(RUNTIME_PREAMBLE);
    sink.push_section(Section::Preamble, &preamble);

    if self.options.emit_constants {
      for (name, value) in self.resolver.constants() {
        sink.push_section(Section::Constants, &emit_constant(name, value));
      }
    }

    for context in self.resolver.contexts() {
      sink.push_section(Section::Contexts, &emit_context_decl(context)?);
    }

    let mut emitted = 0usize;
    for def in self.resolver.structs() {
      if def.is_extern() {
        debug!(name = %def.name, "skipping extern struct");
        continue;
      }
      self.emit_struct(def, sink)?;
      emitted += 1;
    }

    info!(structs = emitted, contexts = self.resolver.contexts().count(), "generated module");
    Ok(())
  }

  pub fn emit_code(&self) -> GenResult<String> {
    let mut sink = ModuleSink::new();
    self.emit_into(&mut sink)?;
    Ok(sink.finish())
  }

  /// Declarations and impl of a single struct, without the module preamble.
  pub fn emit_struct_code(&self, name: &str) -> GenResult<String> {
    self.analyze()?;
    let def = self
      .resolver
      .lookup_struct(name)
      .ok_or_else(|| GenError::UnknownStruct { name: name.to_string() })?;
    let mut sink = ModuleSink::new();
    self.seed_declarations(&mut sink)?;
    self.emit_struct(def, &mut sink)?;
    Ok(sink.finish())
  }

  /// Generate and write the module. Nothing is written if generation fails.
  pub fn write_module(&self, path: &Path) -> anyhow::Result<()> {
    let code = self.emit_code()?;
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)
          .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
      }
    }
    std::fs::write(path, code).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote generated module");
    Ok(())
  }

  fn emit_struct<S: CodeSink>(&self, def: &Struct, sink: &mut S) -> GenResult<()> {
    let resolved = self.resolver.resolve_struct(def)?;
    let ctx = EmitCtx::new(self.resolver, def);
    let decl = emit_struct_decl(&ctx, &resolved, sink)?;
    sink.push_section(Section::Types, &decl);
    sink.push_section(Section::Impls, &emit_struct_impl(&ctx, &resolved, self.options.emit_parse_fns)?);
    debug!(name = %def.name, members = resolved.members.len(), "emitted struct");
    Ok(())
  }

  /* Names of every top-level type, so union enums cannot take them */
  fn seed_declarations<S: CodeSink>(&self, sink: &mut S) -> GenResult<()> {
    for name in RESERVED_TYPE_IDENTS {
      sink.declare(name);
    }
    let names = self.resolver.structs().map(|s| &s.name).chain(self.resolver.contexts().map(|c| &c.name));
    for name in names {
      let ident = type_ident(name);
      if !sink.declare(&ident) {
        return Err(GenError::DuplicateDefinition { kind: "type", name: ident });
      }
    }
    Ok(())
  }
}
