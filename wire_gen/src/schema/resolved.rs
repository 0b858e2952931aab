use crate::dependency::DependencyGraph;
use crate::error::{GenError, GenResult, Site};
use crate::naming::{RESERVED_TYPE_IDENTS, const_ident, type_ident};
use crate::schema::{Context, Field, File, IdRef, IntWidth, Integer, IntegerList, LengthConstraint, Member, Struct, Type};
use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::debug;

/* Where a sibling field reference points: the struct itself, or the body of the union case being decoded */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
  Struct,
  Case,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
  Field { name: String, origin: Origin },
  Context { context: String, field: String },
}

/// An integer whose value is only known while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeRef {
  pub target: RefTarget,
  pub width: IntWidth,
}

impl RuntimeRef {
  pub fn is_context(&self) -> bool {
    matches!(self.target, RefTarget::Context { .. })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluated {
  Value(i64),
  Runtime(RuntimeRef),
}

#[derive(Debug, Clone)]
struct ScopeEntry {
  name: String,
  width: Option<IntWidth>,
  origin: Origin,
}

/// Fields already decoded at the current point of a struct, latest last.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
  owner: &'a Struct,
  entries: Vec<ScopeEntry>,
  origin: Origin,
}

impl<'a> Scope<'a> {
  pub fn new(owner: &'a Struct) -> Self {
    Self { owner, entries: Vec::new(), origin: Origin::Struct }
  }

  pub fn owner(&self) -> &'a Struct {
    self.owner
  }

  /* Fields declared in the returned scope are only visible inside one union case */
  pub fn case_body(&self) -> Self {
    let mut scope = self.clone();
    scope.origin = Origin::Case;
    scope
  }

  pub fn declare(&mut self, field: &Field) {
    self.entries.push(ScopeEntry {
      name: field.name.clone(),
      width: field.field_type.int_width(),
      origin: self.origin,
    });
  }

  fn lookup(&self, name: &str) -> Option<&ScopeEntry> {
    self.entries.iter().rev().find(|entry| entry.name == name)
  }
}

/* Resolved form of a struct: every reference looked up, every constant evaluated */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
  pub low: u64,
  pub high: u64,
  /// Name of the constant when the range is a single named value.
  pub name: Option<String>,
}

impl ResolvedRange {
  pub fn contains(&self, value: u64) -> bool {
    self.low <= value && value <= self.high
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLength {
  Greedy,
  Count(Evaluated),
  Leftover(u64),
}

#[derive(Debug, Clone)]
pub enum ResolvedType<'a> {
  Int { width: IntWidth, ranges: Option<Vec<ResolvedRange>> },
  NulTermString,
  RemainingOffset,
  Struct { def: &'a Struct, boxed: bool },
  FixedArray { base: Box<ResolvedType<'a>>, size: u64 },
  VarArray { base: Box<ResolvedType<'a>>, length: ResolvedLength },
}

#[derive(Debug, Clone)]
pub struct ResolvedField<'a> {
  pub name: &'a str,
  pub ty: ResolvedType<'a>,
}

#[derive(Debug, Clone)]
pub struct ResolvedCase<'a> {
  /// `None` for the default case.
  pub labels: Option<Vec<ResolvedRange>>,
  pub disallowed: bool,
  pub members: Vec<ResolvedMember<'a>>,
}

impl ResolvedCase<'_> {
  pub fn matches(&self, value: u64) -> bool {
    match &self.labels {
      Some(labels) => labels.iter().any(|range| range.contains(value)),
      None => true,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ResolvedUnion<'a> {
  pub name: &'a str,
  pub tag: RuntimeRef,
  pub length: ResolvedLength,
  pub cases: Vec<ResolvedCase<'a>>,
}

#[derive(Debug, Clone)]
pub enum ResolvedMember<'a> {
  Field(ResolvedField<'a>),
  Union(ResolvedUnion<'a>),
  Eos,
  Ignore,
  Fail,
}

#[derive(Debug, Clone)]
pub struct ResolvedStruct<'a> {
  pub def: &'a Struct,
  pub members: Vec<ResolvedMember<'a>>,
}

/// Answers struct lookups and integer evaluation for every loaded file.
/// Built once before generation and never mutated afterwards.
#[derive(Debug)]
pub struct Resolver {
  structs: IndexMap<String, Struct>,
  contexts: IndexMap<String, Context>,
  constants: IndexMap<String, i64>,
  containment: DependencyGraph,
}

impl Resolver {
  pub fn new(files: &[File]) -> GenResult<Self> {
    let mut structs = IndexMap::new();
    let mut contexts = IndexMap::new();
    let mut constants = IndexMap::new();

    for file in files {
      for constant in &file.constants {
        insert_unique(&mut constants, "constant", &constant.name, constant.value)?;
      }
      for context in &file.contexts {
        if let Some(field) = context.fields.iter().find(|f| !f.field_type.is_integer()) {
          return Err(GenError::InvalidContextField { context: context.name.clone(), field: field.name.clone() });
        }
        insert_unique(&mut contexts, "context", &context.name, context.clone())?;
      }
      for s in &file.structs {
        insert_unique(&mut structs, "struct", &s.name, s.clone())?;
      }
    }

    /* Distinct declarations must stay distinct once turned into identifiers */
    let mut type_names = IndexMap::new();
    for name in structs.keys().chain(contexts.keys()) {
      let ident = type_ident(name);
      if RESERVED_TYPE_IDENTS.contains(&ident.as_str()) {
        return Err(GenError::ReservedName { owner: name.clone(), name: name.clone() });
      }
      insert_unique(&mut type_names, "type", name, ident.clone())?;
      if type_names.values().filter(|other| **other == ident).count() > 1 {
        return Err(GenError::DuplicateDefinition { kind: "type", name: name.clone() });
      }
    }
    let mut const_names: IndexMap<String, ()> = IndexMap::new();
    for name in constants.keys() {
      insert_unique(&mut const_names, "constant", &const_ident(name), ())?;
    }

    for s in structs.values() {
      for (idx, context) in s.contexts.iter().enumerate() {
        if !contexts.contains_key(context) {
          return Err(GenError::UnknownContext { owner: s.name.clone(), context: context.clone() });
        }
        if s.contexts[..idx].contains(context) {
          return Err(GenError::DuplicateMember { owner: s.name.clone(), name: context.clone() });
        }
      }
    }

    let containment = DependencyGraph::build(structs.values());
    debug!(
      structs = structs.len(),
      contexts = contexts.len(),
      constants = constants.len(),
      "built resolver"
    );

    Ok(Self { structs, contexts, constants, containment })
  }

  pub fn structs(&self) -> impl Iterator<Item = &Struct> {
    self.structs.values()
  }

  pub fn contexts(&self) -> impl Iterator<Item = &Context> {
    self.contexts.values()
  }

  pub fn constants(&self) -> impl Iterator<Item = (&str, i64)> {
    self.constants.iter().map(|(name, value)| (name.as_str(), *value))
  }

  pub fn containment(&self) -> &DependencyGraph {
    &self.containment
  }

  pub fn lookup_struct(&self, name: &str) -> Option<&Struct> {
    self.structs.get(name)
  }

  pub fn lookup_context(&self, name: &str) -> Option<&Context> {
    self.contexts.get(name)
  }

  pub fn struct_ref(&self, site: Site<'_>, name: &str) -> GenResult<&Struct> {
    self.lookup_struct(name).ok_or_else(|| site.unresolved_struct(name))
  }

  /* Resolve a reference to an already decoded field or a context field */
  pub fn resolve_ref(&self, scope: &Scope<'_>, site: Site<'_>, id: &IdRef) -> GenResult<RuntimeRef> {
    match &id.scope {
      Some(context_name) => {
        if !scope.owner().contexts.contains(context_name) {
          return Err(site.missing_context(context_name));
        }
        let context = self.contexts.get(context_name).ok_or_else(|| site.missing_context(context_name))?;
        let field = context.field(&id.name).ok_or_else(|| site.unresolved_integer(id))?;
        let width = field.field_type.int_width().ok_or_else(|| site.unresolved_integer(id))?;
        Ok(RuntimeRef {
          target: RefTarget::Context { context: context_name.clone(), field: id.name.clone() },
          width,
        })
      }
      None => {
        let entry = scope.lookup(&id.name).ok_or_else(|| site.unresolved_integer(id))?;
        let width = entry
          .width
          .ok_or_else(|| site.invalid(format!("'{}' is not an integer field", id.name)))?;
        Ok(RuntimeRef {
          target: RefTarget::Field { name: entry.name.clone(), origin: entry.origin },
          width,
        })
      }
    }
  }

  pub fn evaluate_integer(&self, scope: &Scope<'_>, site: Site<'_>, integer: &Integer) -> GenResult<Evaluated> {
    match integer {
      Integer::Literal(value) => Ok(Evaluated::Value(*value)),
      Integer::Const(name) => self
        .constants
        .get(name)
        .map(|value| Evaluated::Value(*value))
        .ok_or_else(|| site.unresolved_integer(name)),
      Integer::Ref(id) => self.resolve_ref(scope, site, id).map(Evaluated::Runtime),
    }
  }

  pub fn constant(&self, scope: &Scope<'_>, site: Site<'_>, integer: &Integer) -> GenResult<i64> {
    match self.evaluate_integer(scope, site, integer)? {
      Evaluated::Value(value) => Ok(value),
      Evaluated::Runtime(_) => Err(site.expected_constant(integer)),
    }
  }

  fn length_constant(&self, scope: &Scope<'_>, site: Site<'_>, integer: &Integer) -> GenResult<u64> {
    let value = self.constant(scope, site, integer)?;
    u64::try_from(value).map_err(|_| out_of_range(site, value, 64))
  }

  /* Evaluate a range list against the width of the value it constrains */
  pub fn evaluate_ranges(
    &self,
    scope: &Scope<'_>,
    site: Site<'_>,
    list: &IntegerList,
    width: IntWidth,
  ) -> GenResult<Vec<ResolvedRange>> {
    if list.is_empty() {
      return Err(site.invalid("range list matches no value"));
    }
    list
      .ranges
      .iter()
      .map(|range| {
        let low = self.constant(scope, site, &range.low)?;
        let high = match &range.high {
          Some(high) => self.constant(scope, site, high)?,
          None => low,
        };
        for value in [low, high] {
          if !width.contains(value) {
            return Err(out_of_range(site, value, width.bits()));
          }
        }
        if low > high {
          return Err(GenError::InvalidRange {
            owner: site.owner.to_string(),
            field: site.field.to_string(),
            low,
            high,
          });
        }
        let name = match (&range.low, &range.high) {
          (Integer::Const(name), None) => Some(name.clone()),
          _ => None,
        };
        Ok(ResolvedRange { low: low as u64, high: high as u64, name })
      })
      .collect()
  }

  /* The caller must be able to forward every context the callee declares */
  pub fn check_context_args(&self, site: Site<'_>, caller: &Struct, callee: &Struct) -> GenResult<()> {
    match callee.contexts.iter().find(|context| !caller.contexts.contains(context)) {
      Some(missing) => Err(site.missing_context(missing)),
      None => Ok(()),
    }
  }

  /// Whether a by-value `target` inside `owner` would make `owner` contain itself.
  pub fn needs_indirection(&self, owner: &str, target: &str) -> bool {
    self.containment.reaches(target, owner)
  }

  pub fn resolve_struct<'r>(&'r self, def: &'r Struct) -> GenResult<ResolvedStruct<'r>> {
    let mut scope = Scope::new(def);
    let members = self.resolve_members(&mut scope, &def.members)?;
    Ok(ResolvedStruct { def, members })
  }

  fn resolve_members<'r>(
    &'r self,
    scope: &mut Scope<'r>,
    members: &'r [Member],
  ) -> GenResult<Vec<ResolvedMember<'r>>> {
    let owner = scope.owner();
    let mut resolved = Vec::with_capacity(members.len());

    for member in members {
      let next = match member {
        Member::Field(field) => {
          let site = Site::new(&owner.name, &field.name);
          let ty = self.resolve_type(scope, site, &field.field_type, false)?;
          scope.declare(field);
          ResolvedMember::Field(ResolvedField { name: &field.name, ty })
        }
        Member::Union(union) => {
          let site = Site::new(&owner.name, &union.name);
          let tag = self.resolve_ref(scope, site, &union.tag)?;
          let length = self.resolve_length(scope, site, union.length.as_ref())?;

          let mut cases = Vec::with_capacity(union.cases.len());
          for (idx, case) in union.cases.iter().enumerate() {
            if case.is_default() && idx + 1 != union.cases.len() {
              return Err(GenError::MisplacedDefault { owner: owner.name.clone(), field: union.name.clone() });
            }
            let labels = match &case.case {
              Some(list) => Some(self.evaluate_ranges(scope, site, list, tag.width)?),
              None => None,
            };
            let mut body = scope.case_body();
            let members = self.resolve_members(&mut body, &case.members)?;
            cases.push(ResolvedCase { labels, disallowed: case.is_disallowed(), members });
          }

          ResolvedMember::Union(ResolvedUnion { name: &union.name, tag, length, cases })
        }
        Member::Eos => ResolvedMember::Eos,
        Member::Ignore => ResolvedMember::Ignore,
        Member::Fail => ResolvedMember::Fail,
      };
      resolved.push(next);
    }

    Ok(resolved)
  }

  /* `indirect` is set below a variable array, whose storage already breaks recursion */
  fn resolve_type<'r>(
    &'r self,
    scope: &Scope<'r>,
    site: Site<'_>,
    ty: &Type,
    indirect: bool,
  ) -> GenResult<ResolvedType<'r>> {
    Ok(match ty {
      Type::Int(int_type) => ResolvedType::Int {
        width: int_type.width,
        ranges: match &int_type.constraint {
          Some(list) => Some(self.evaluate_ranges(scope, site, list, int_type.width)?),
          None => None,
        },
      },
      Type::Char => ResolvedType::Int { width: IntWidth::U8, ranges: None },
      Type::NulTermString => ResolvedType::NulTermString,
      Type::RemainingOffset => ResolvedType::RemainingOffset,
      Type::StructRef(name) => {
        let def = self.struct_ref(site, name)?;
        self.check_context_args(site, scope.owner(), def)?;
        let boxed = !indirect && self.needs_indirection(&scope.owner().name, name);
        ResolvedType::Struct { def, boxed }
      }
      Type::FixedArray(array) => ResolvedType::FixedArray {
        size: self.length_constant(scope, site, &array.size)?,
        base: Box::new(self.resolve_type(scope, site, &array.base, indirect)?),
      },
      Type::VarArray(array) => {
        let length = self.resolve_length(scope, site, array.length.as_ref())?;
        let base = Box::new(self.resolve_type(scope, site, &array.base, true)?);
        /* Only consumed input bounds a runtime count, so every element must consume some */
        if matches!(length, ResolvedLength::Count(Evaluated::Runtime(_))) && self.min_wire_size(&array.base) == 0 {
          return Err(GenError::ZeroSizedElement { owner: site.owner.to_string(), field: site.field.to_string() });
        }
        ResolvedType::VarArray { base, length }
      }
    })
  }

  /// Fewest bytes any decodable value of `ty` occupies on the wire.
  /// Extern structs count as zero since their layout is unknown here.
  pub fn min_wire_size(&self, ty: &Type) -> u64 {
    self.min_type_size(ty, &mut Vec::new())
  }

  fn min_type_size<'r>(&'r self, ty: &Type, visiting: &mut Vec<&'r str>) -> u64 {
    match ty {
      Type::Int(int_type) => int_type.width.bytes() as u64,
      Type::Char | Type::NulTermString => 1,
      Type::RemainingOffset | Type::VarArray(_) => 0,
      Type::StructRef(name) => match self.structs.get_key_value(name) {
        Some((_, def)) if def.is_extern() => 0,
        /* A finite value never takes the recursive path, so that path never sets the minimum */
        Some((key, _)) if visiting.contains(&key.as_str()) => u64::MAX,
        Some((key, def)) => {
          visiting.push(key);
          let size = self.min_members_size(&def.members, visiting);
          visiting.pop();
          size
        }
        None => 0,
      },
      Type::FixedArray(array) => {
        let size = match &array.size {
          Integer::Literal(value) => *value,
          Integer::Const(name) => self.constants.get(name).copied().unwrap_or(0),
          Integer::Ref(_) => 0,
        };
        u64::try_from(size).unwrap_or(0).saturating_mul(self.min_type_size(&array.base, visiting))
      }
    }
  }

  fn min_members_size<'r>(&'r self, members: &[Member], visiting: &mut Vec<&'r str>) -> u64 {
    members.iter().fold(0u64, |total, member| {
      let size = match member {
        Member::Field(field) => self.min_type_size(&field.field_type, visiting),
        Member::Union(union) => union
          .cases
          .iter()
          .filter(|case| !case.is_disallowed())
          .map(|case| self.min_members_size(&case.members, visiting))
          .min()
          .unwrap_or(u64::MAX),
        Member::Eos | Member::Ignore => 0,
        Member::Fail => u64::MAX,
      };
      total.saturating_add(size)
    })
  }

  fn resolve_length(
    &self,
    scope: &Scope<'_>,
    site: Site<'_>,
    length: Option<&LengthConstraint>,
  ) -> GenResult<ResolvedLength> {
    Ok(match length {
      None => ResolvedLength::Greedy,
      Some(LengthConstraint::Count(count)) => match self.evaluate_integer(scope, site, count)? {
        Evaluated::Value(value) => {
          let value = u64::try_from(value).map_err(|_| out_of_range(site, value, 64))?;
          ResolvedLength::Count(Evaluated::Value(value as i64))
        }
        runtime => ResolvedLength::Count(runtime),
      },
      Some(LengthConstraint::Leftover(reserved)) => {
        ResolvedLength::Leftover(self.length_constant(scope, site, reserved)?)
      }
    })
  }
}

fn insert_unique<V>(map: &mut IndexMap<String, V>, kind: &'static str, name: &str, value: V) -> GenResult<()> {
  match map.entry(name.to_string()) {
    Entry::Occupied(_) => Err(GenError::DuplicateDefinition { kind, name: name.to_string() }),
    Entry::Vacant(slot) => {
      slot.insert(value);
      Ok(())
    }
  }
}

fn out_of_range(site: Site<'_>, value: i64, bits: u32) -> GenError {
  GenError::ConstantOutOfRange {
    owner: site.owner.to_string(),
    field: site.field.to_string(),
    value,
    bits,
  }
}
