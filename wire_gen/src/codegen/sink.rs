use indexmap::IndexSet;

/* Output sections, in the order they appear in a finished module */
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
  Preamble,
  Constants,
  Contexts,
  Types,
  Impls,
}

impl Section {
  pub const ALL: [Section; 5] = [Section::Preamble, Section::Constants, Section::Contexts, Section::Types, Section::Impls];
}

/// Destination for generated source text.
pub trait CodeSink {
  /// Register a top-level declaration. Returns false if the name is already taken.
  fn declare(&mut self, name: &str) -> bool;

  fn is_declared(&self, name: &str) -> bool;

  fn push_section(&mut self, section: Section, code: &str);

  fn finish(self) -> String
  where
    Self: Sized;
}

/// Accumulates one generated Rust module in memory.
#[derive(Debug, Default)]
pub struct ModuleSink {
  declared: IndexSet<String>,
  sections: [String; 5],
}

impl ModuleSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn declared(&self) -> impl Iterator<Item = &str> {
    self.declared.iter().map(String::as_str)
  }

  fn slot(section: Section) -> usize {
    Section::ALL.iter().position(|s| *s == section).unwrap_or(Section::ALL.len() - 1)
  }
}

impl CodeSink for ModuleSink {
  fn declare(&mut self, name: &str) -> bool {
    self.declared.insert(name.to_string())
  }

  fn is_declared(&self, name: &str) -> bool {
    self.declared.contains(name)
  }

  fn push_section(&mut self, section: Section, code: &str) {
    let buf = &mut self.sections[Self::slot(section)];
    buf.push_str(code);
    if !code.ends_with('\n') {
      buf.push('\n');
    }
  }

  fn finish(self) -> String {
    let mut output = String::new();
    for section in self.sections.into_iter().filter(|s| !s.is_empty()) {
      if !output.is_empty() {
        output.push('\n');
      }
      output.push_str(&section);
    }
    output
  }
}
