/* Helper utilities for Rust code generation */

use super::emit_ctx::Access;
use crate::naming::{context_param, field_ident, type_ident};
use crate::schema::IntWidth;
use crate::schema::resolved::{
  Evaluated, Origin, RefTarget, ResolvedCase, ResolvedLength, ResolvedMember, ResolvedRange, ResolvedType, RuntimeRef,
};
use std::collections::HashSet;

/* Rust integer type for a wire width */
pub fn int_type(width: IntWidth) -> &'static str {
  match width {
    IntWidth::U8 => "u8",
    IntWidth::U16 => "u16",
    IntWidth::U32 => "u32",
    IntWidth::U64 => "u64",
  }
}

/* Runtime helper reading one big-endian integer */
pub fn read_fn(width: IntWidth) -> &'static str {
  match width {
    IntWidth::U8 => "__read_u8",
    IntWidth::U16 => "__read_u16",
    IntWidth::U32 => "__read_u32",
    IntWidth::U64 => "__read_u64",
  }
}

/* Format a resolved type as the Rust type of the field holding it */
pub fn rust_type(ty: &ResolvedType) -> String {
  match ty {
    ResolvedType::Int { width, .. } => int_type(*width).to_string(),
    ResolvedType::NulTermString => "String".to_string(),
    ResolvedType::RemainingOffset => "usize".to_string(),
    ResolvedType::Struct { def, boxed } => {
      let ident = type_ident(&def.name);
      if *boxed {
        format!("Box<{}>", ident)
      } else {
        ident
      }
    }
    ResolvedType::FixedArray { base, size } => format!("[{}; {}]", rust_type(base), size),
    ResolvedType::VarArray { base, .. } => format!("Vec<{}>", rust_type(base)),
  }
}

/* Unconstrained bytes are copied as slices instead of element by element */
pub fn is_plain_byte(ty: &ResolvedType) -> bool {
  matches!(ty, ResolvedType::Int { width: IntWidth::U8, ranges: None })
}

/* Match pattern accepting exactly the given ranges; range lists are never empty */
pub fn range_pattern(ranges: &[ResolvedRange]) -> String {
  let arms: Vec<String> = ranges
    .iter()
    .map(|range| {
      if range.low == range.high {
        range.low.to_string()
      } else {
        format!("{}..={}", range.low, range.high)
      }
    })
    .collect();
  arms.join(" | ")
}

/* Expression reading a runtime integer, or `None` where it is not visible */
pub fn ref_value(runtime: &RuntimeRef, access: Access) -> Option<String> {
  match (&runtime.target, access) {
    (RefTarget::Context { context, field }, Access::Decode) => {
      Some(format!("{}.{}", context_param(context), field_ident(field)))
    }
    (RefTarget::Context { .. }, Access::Validate) => None,
    (RefTarget::Field { name, .. }, Access::Decode) => Some(field_ident(name)),
    (RefTarget::Field { name, origin: Origin::Struct }, Access::Validate) => Some(format!("self.{}", field_ident(name))),
    (RefTarget::Field { name, origin: Origin::Case }, Access::Validate) => Some(format!("*{}", field_ident(name))),
  }
}

/* Element or byte count as a `usize` expression */
pub fn count_value(count: &Evaluated, access: Access) -> Option<String> {
  match count {
    Evaluated::Value(value) => Some(format!("{}usize", value)),
    Evaluated::Runtime(runtime) => ref_value(runtime, access).map(|value| format!("({} as usize)", value)),
  }
}

/* Whether validate has anything to check for a value of this type */
pub fn needs_validation(ty: &ResolvedType) -> bool {
  match ty {
    ResolvedType::Int { ranges, .. } => ranges.is_some(),
    ResolvedType::NulTermString => true,
    ResolvedType::RemainingOffset => false,
    ResolvedType::Struct { .. } => true,
    ResolvedType::FixedArray { base, .. } => needs_validation(base),
    ResolvedType::VarArray { base, length } => {
      matches!(length, ResolvedLength::Count(_)) || needs_validation(base)
    }
  }
}

/* Identifiers of the members that hold a value, in declaration order */
pub fn member_idents(members: &[ResolvedMember<'_>]) -> Vec<String> {
  members
    .iter()
    .filter_map(|member| match member {
      ResolvedMember::Field(field) => Some(field_ident(field.name)),
      ResolvedMember::Union(union) => Some(field_ident(union.name)),
      ResolvedMember::Eos | ResolvedMember::Ignore | ResolvedMember::Fail => None,
    })
    .collect()
}

/* Variant constructor, also usable as a pattern binding every member */
pub fn variant_pattern(enum_ident: &str, variant: &str, members: &[ResolvedMember<'_>]) -> String {
  let idents = member_idents(members);
  if idents.is_empty() {
    format!("{}::{}", enum_ident, variant)
  } else {
    format!("{}::{} {{ {} }}", enum_ident, variant, idents.join(", "))
  }
}

/* Pattern matching a variant without binding anything */
pub fn variant_wildcard(enum_ident: &str, variant: &str, members: &[ResolvedMember<'_>]) -> String {
  if member_idents(members).is_empty() {
    format!("{}::{}", enum_ident, variant)
  } else {
    format!("{}::{} {{ .. }}", enum_ident, variant)
  }
}

/* Variant names of a union enum, `None` for disallowed cases */
pub fn variant_idents(cases: &[ResolvedCase<'_>]) -> Vec<Option<String>> {
  let mut used = HashSet::new();
  cases
    .iter()
    .enumerate()
    .map(|(idx, case)| {
      if case.disallowed {
        return None;
      }
      let base = match case.labels.as_deref() {
        None => "Default".to_string(),
        Some([single]) => match (&single.name, single.low == single.high) {
          (Some(name), true) => type_ident(name),
          (None, true) => format!("Case{}", single.low),
          (_, false) => format!("Case{}To{}", single.low, single.high),
        },
        Some(_) => format!("Group{}", idx),
      };
      let ident = if used.contains(&base) { format!("{}Alt{}", base, idx) } else { base };
      used.insert(ident.clone());
      Some(ident)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::resolved::ResolvedCase;

  fn single(value: u64, name: Option<&str>) -> ResolvedRange {
    ResolvedRange { low: value, high: value, name: name.map(str::to_string) }
  }

  fn case(labels: Option<Vec<ResolvedRange>>, disallowed: bool) -> ResolvedCase<'static> {
    ResolvedCase { labels, disallowed, members: Vec::new() }
  }

  #[test]
  fn test_range_patterns() {
    assert_eq!(range_pattern(&[single(7, None)]), "7");
    assert_eq!(
      range_pattern(&[single(1, None), ResolvedRange { low: 3, high: 5, name: None }]),
      "1 | 3..=5"
    );
  }

  #[test]
  fn test_variant_names() {
    let cases = vec![
      case(Some(vec![single(1, Some("ATYPE_IPV4"))]), false),
      case(Some(vec![single(3, None)]), false),
      case(Some(vec![ResolvedRange { low: 4, high: 9, name: None }]), false),
      case(Some(vec![single(3, None)]), false),
      case(Some(vec![single(10, None), single(12, None)]), false),
      case(Some(vec![single(11, None)]), true),
      case(None, false),
    ];
    assert_eq!(
      variant_idents(&cases),
      vec![
        Some("AtypeIpv4".to_string()),
        Some("Case3".to_string()),
        Some("Case4To9".to_string()),
        Some("Case3Alt3".to_string()),
        Some("Group4".to_string()),
        None,
        Some("Default".to_string()),
      ]
    );
  }

  #[test]
  fn test_reference_rendering() {
    let field = RuntimeRef { target: RefTarget::Field { name: "nMethods".to_string(), origin: Origin::Struct }, width: IntWidth::U8 };
    let bound = RuntimeRef { target: RefTarget::Field { name: "len".to_string(), origin: Origin::Case }, width: IntWidth::U8 };
    let context = RuntimeRef {
      target: RefTarget::Context { context: "flags".to_string(), field: "mode".to_string() },
      width: IntWidth::U16,
    };

    assert_eq!(ref_value(&field, Access::Decode).as_deref(), Some("n_methods"));
    assert_eq!(ref_value(&field, Access::Validate).as_deref(), Some("self.n_methods"));
    assert_eq!(ref_value(&bound, Access::Validate).as_deref(), Some("*len"));
    assert_eq!(ref_value(&context, Access::Decode).as_deref(), Some("ctx_flags.mode"));
    assert_eq!(ref_value(&context, Access::Validate), None);
    assert_eq!(count_value(&Evaluated::Value(4), Access::Validate).as_deref(), Some("4usize"));
    assert_eq!(
      count_value(&Evaluated::Runtime(field), Access::Decode).as_deref(),
      Some("(n_methods as usize)")
    );
  }
}
