use crate::error::Site;
use crate::naming::{context_param, field_ident, type_ident, union_type_ident};
use crate::schema::Struct;
use crate::schema::resolved::{Origin, Resolver};

/* Which generated function an expression is rendered for */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  /* Fields are locals, contexts are parameters */
  Decode,
  /* Fields are read from `self` or from match bindings; contexts are absent */
  Validate,
}

/// Indented line writer with a shared counter for generated temporaries.
pub struct Emitter {
  output: String,
  depth: usize,
  temp_idx: usize,
}

impl Emitter {
  pub fn new(depth: usize) -> Self {
    Self { output: String::new(), depth, temp_idx: 0 }
  }

  pub fn line(&mut self, text: impl AsRef<str>) {
    for _ in 0..self.depth {
      self.output.push_str("    ");
    }
    self.output.push_str(text.as_ref());
    self.output.push('\n');
  }

  /* Write a line that opens a block */
  pub fn open(&mut self, text: impl AsRef<str>) {
    self.line(text);
    self.depth += 1;
  }

  /* Write a line that closes a block */
  pub fn close(&mut self, text: impl AsRef<str>) {
    self.depth = self.depth.saturating_sub(1);
    self.line(text);
  }

  pub fn blank(&mut self) {
    self.output.push('\n');
  }

  pub fn temp(&mut self, prefix: &str) -> String {
    let name = format!("__{}{}", prefix, self.temp_idx);
    self.temp_idx += 1;
    name
  }

  pub fn finish(self) -> String {
    self.output
  }
}

/// State handed down the member walk of one struct. Never mutated; entering
/// a union case derives a new context.
#[derive(Clone)]
pub struct EmitCtx<'a> {
  pub resolver: &'a Resolver,
  pub owner: &'a Struct,
  /* Prefix for the enum names of unions declared at this level */
  pub type_prefix: String,
  /* Whether member names are fields of `self` or bindings of a case */
  pub origin: Origin,
  /* Buffer encode appends to */
  pub out: String,
  /* Encode compares each stored remaining offset with the length of `out` */
  pub check_offsets: bool,
}

impl<'a> EmitCtx<'a> {
  pub fn new(resolver: &'a Resolver, owner: &'a Struct) -> Self {
    Self {
      resolver,
      owner,
      type_prefix: type_ident(&owner.name),
      origin: Origin::Struct,
      out: "__out".to_string(),
      check_offsets: false,
    }
  }

  pub fn site<'s>(&'s self, field: &'s str) -> Site<'s> {
    Site::new(&self.owner.name, field)
  }

  pub fn union_ident(&self, union_name: &str) -> String {
    union_type_ident(&self.type_prefix, union_name)
  }

  pub fn enter_case(&self, enum_ident: &str, variant: &str) -> Self {
    Self {
      type_prefix: format!("{}{}", enum_ident, variant),
      origin: Origin::Case,
      ..self.clone()
    }
  }

  pub fn with_out(&self, out: &str) -> Self {
    Self { out: out.to_string(), ..self.clone() }
  }

  pub fn with_offset_checks(&self, out: &str) -> Self {
    Self { out: out.to_string(), check_offsets: true, ..self.clone() }
  }

  /* Place expression for a member; method calls auto-deref either form */
  pub fn member_place(&self, name: &str) -> String {
    match self.origin {
      Origin::Struct => format!("self.{}", field_ident(name)),
      Origin::Case => field_ident(name),
    }
  }

  /* Reference to a member, suitable as a match scrutinee */
  pub fn member_ref(&self, name: &str) -> String {
    match self.origin {
      Origin::Struct => format!("&self.{}", field_ident(name)),
      Origin::Case => field_ident(name),
    }
  }

  pub fn is_bound(&self) -> bool {
    self.origin == Origin::Case
  }

  /* Context parameters of the owner, as declared in signatures */
  pub fn context_params(&self) -> String {
    self
      .owner
      .contexts
      .iter()
      .map(|context| format!(", {}: &{}", context_param(context), type_ident(context)))
      .collect()
  }

  /* Context arguments forwarded to a callee, each led by a comma */
  pub fn context_args(callee: &Struct) -> String {
    callee.contexts.iter().map(|context| format!(", {}", context_param(context))).collect()
  }
}
