/* Validate pass: re-checks on an in-memory value every constraint decode
   enforces, so that a value which validates encodes to bytes decode accepts.
   Checks that depend on a context value are left to decode. Stored remaining
   offsets are checked last, against a scratch encode of the whole value. */

use super::emit_ctx::{Access, EmitCtx, Emitter};
use super::encode;
use super::helpers::{
  count_value, needs_validation, range_pattern, ref_value, variant_idents, variant_pattern, variant_wildcard,
};
use crate::error::GenResult;
use crate::schema::resolved::{ResolvedLength, ResolvedMember, ResolvedStruct, ResolvedType, ResolvedUnion};

pub fn emit_validate_fns(ctx: &EmitCtx<'_>, resolved: &ResolvedStruct<'_>, e: &mut Emitter) -> GenResult<()> {
  e.open("pub fn validate(&self) -> Result<(), Error> {");
  if emit_members(ctx, &resolved.members, e)? {
    if has_remaining_offset(&resolved.members) {
      let buf = e.temp("buf");
      let scratch = e.temp("scratch");
      e.line(format!("let mut {}: Vec<u8> = Vec::new();", buf));
      e.line(format!("let {} = &mut {};", scratch, buf));
      encode::emit_members(&ctx.with_offset_checks(&scratch), &resolved.members, e);
    }
    e.line("Ok(())");
  }
  e.close("}");
  e.blank();
  e.open("pub fn encode(&self) -> Result<Vec<u8>, Error> {");
  e.line("self.validate()?;");
  e.line("Ok(self.encode_unchecked())");
  e.close("}");
  Ok(())
}

/* Returns false when the list ends in `fail` */
fn emit_members(ctx: &EmitCtx<'_>, members: &[ResolvedMember<'_>], e: &mut Emitter) -> GenResult<bool> {
  for member in members {
    match member {
      ResolvedMember::Field(field) => {
        if needs_validation(&field.ty) {
          emit_value(&ctx.member_place(field.name), ctx.is_bound(), &field.ty, e);
        }
      }
      ResolvedMember::Union(union) => emit_union(ctx, union, e)?,
      ResolvedMember::Eos | ResolvedMember::Ignore => {}
      ResolvedMember::Fail => {
        e.line("return Err(Error::DisallowedCase);");
        return Ok(false);
      }
    }
  }
  Ok(true)
}

/* `by_ref` is set when `place` is a reference binding rather than a field of `self` */
fn emit_value(place: &str, by_ref: bool, ty: &ResolvedType<'_>, e: &mut Emitter) {
  match ty {
    ResolvedType::Int { ranges: Some(ranges), .. } => {
      let value = if by_ref { format!("*{}", place) } else { place.to_string() };
      e.line(format!(
        "if !matches!({}, {}) {{ return Err(Error::ConstraintViolation); }}",
        value,
        range_pattern(ranges)
      ));
    }
    ResolvedType::Int { ranges: None, .. } | ResolvedType::RemainingOffset => {}
    ResolvedType::NulTermString => {
      e.line(format!("if {}.as_bytes().contains(&0) {{ return Err(Error::MalformedString); }}", place));
    }
    ResolvedType::Struct { .. } => e.line(format!("{}.validate()?;", place)),
    ResolvedType::FixedArray { base, .. } => emit_elements(place, base, e),
    ResolvedType::VarArray { base, length } => {
      if let ResolvedLength::Count(count) = length {
        if let Some(count) = count_value(count, Access::Validate) {
          e.line(format!(
            "if {}.len() != {} {{ return Err(Error::LengthConstraintViolation); }}",
            place, count
          ));
        }
      }
      emit_elements(place, base, e);
    }
  }
}

fn emit_elements(place: &str, base: &ResolvedType<'_>, e: &mut Emitter) {
  if !needs_validation(base) {
    return;
  }
  let item = e.temp("item");
  e.open(format!("for {} in {}.iter() {{", item, place));
  emit_value(&item, true, base, e);
  e.close("}");
}

fn emit_union(ctx: &EmitCtx<'_>, union: &ResolvedUnion<'_>, e: &mut Emitter) -> GenResult<()> {
  let enum_ident = ctx.union_ident(union.name);
  let variants = variant_idents(&union.cases);
  /* No value of an enum without variants can exist */
  if variants.iter().all(Option::is_none) {
    return Ok(());
  }
  let scrutinee = ctx.member_ref(union.name);

  if let Some(tag) = ref_value(&union.tag, Access::Validate) {
    let selected = e.temp("selected");
    let actual = e.temp("actual");
    let mut has_default = false;

    e.open(format!("let {}: Option<usize> = match {} {{", selected, tag));
    for (idx, (case, variant)) in union.cases.iter().zip(&variants).enumerate() {
      let pattern = match &case.labels {
        Some(labels) => range_pattern(labels),
        None => {
          has_default = true;
          "_".to_string()
        }
      };
      match variant {
        Some(_) => e.line(format!("{} => Some({}),", pattern, idx)),
        None => e.line(format!("{} => None,", pattern)),
      }
    }
    if !has_default {
      e.line("_ => None,");
    }
    e.close("};");

    e.open(format!("let {}: usize = match {} {{", actual, scrutinee));
    for (idx, (case, variant)) in union.cases.iter().zip(&variants).enumerate() {
      if let Some(variant) = variant {
        e.line(format!("{} => {},", variant_wildcard(&enum_ident, variant, &case.members), idx));
      }
    }
    e.close("};");
    e.line(format!("if {} != Some({}) {{ return Err(Error::DisallowedCase); }}", selected, actual));
  }

  if let ResolvedLength::Count(count) = &union.length {
    if let Some(count) = count_value(count, Access::Validate) {
      let buf = e.temp("buf");
      let scratch = e.temp("scratch");
      e.line(format!("let mut {}: Vec<u8> = Vec::new();", buf));
      e.line(format!("let {} = &mut {};", scratch, buf));
      encode::emit_union(&ctx.with_out(&scratch), union, e);
      e.line(format!(
        "if {}.len() != {} {{ return Err(Error::LengthConstraintViolation); }}",
        buf, count
      ));
    }
  }

  if !union.cases.iter().any(|case| !case.disallowed && case_needs_validation(&case.members)) {
    return Ok(());
  }
  e.open(format!("match {} {{", scrutinee));
  for (case, variant) in union.cases.iter().zip(&variants) {
    let Some(variant) = variant else { continue };
    if case_needs_validation(&case.members) {
      e.open(format!("{} => {{", variant_pattern(&enum_ident, variant, &case.members)));
      emit_members(&ctx.enter_case(&enum_ident, variant), &case.members, e)?;
      e.close("}");
    } else {
      e.line(format!("{} => {{}}", variant_wildcard(&enum_ident, variant, &case.members)));
    }
  }
  e.close("}");
  Ok(())
}

fn case_needs_validation(members: &[ResolvedMember<'_>]) -> bool {
  members.iter().any(|member| match member {
    ResolvedMember::Field(field) => needs_validation(&field.ty),
    ResolvedMember::Union(_) | ResolvedMember::Fail => true,
    ResolvedMember::Eos | ResolvedMember::Ignore => false,
  })
}

/* Offsets inside nested structs are relative to those structs and checked by their own validate */
fn has_remaining_offset(members: &[ResolvedMember<'_>]) -> bool {
  fn in_type(ty: &ResolvedType<'_>) -> bool {
    match ty {
      ResolvedType::RemainingOffset => true,
      ResolvedType::FixedArray { base, .. } | ResolvedType::VarArray { base, .. } => in_type(base),
      _ => false,
    }
  }
  members.iter().any(|member| match member {
    ResolvedMember::Field(field) => in_type(&field.ty),
    ResolvedMember::Union(union) => union.cases.iter().any(|case| !case.disallowed && has_remaining_offset(&case.members)),
    ResolvedMember::Eos | ResolvedMember::Ignore | ResolvedMember::Fail => false,
  })
}
