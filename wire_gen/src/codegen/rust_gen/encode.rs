/* Unchecked encode pass. Mirrors decode member by member and trusts the
   in-memory value: lengths are whatever the sequences hold. The validate
   pass reuses it with offset checks on to compare stored remaining offsets
   against the bytes written before them. */

use super::emit_ctx::{EmitCtx, Emitter};
use super::helpers::{is_plain_byte, variant_idents, variant_pattern};
use crate::schema::resolved::{ResolvedMember, ResolvedStruct, ResolvedType, ResolvedUnion};

pub fn emit_encode_fns(ctx: &EmitCtx<'_>, resolved: &ResolvedStruct<'_>, e: &mut Emitter) {
  e.open(format!("pub fn encode_into(&self, {}: &mut Vec<u8>) {{", ctx.out));
  emit_members(ctx, &resolved.members, e);
  e.close("}");
  e.blank();
  e.open("pub fn encode_unchecked(&self) -> Vec<u8> {");
  e.line("let mut __out = Vec::new();");
  e.line("self.encode_into(&mut __out);");
  e.line("__out");
  e.close("}");
}

pub(crate) fn emit_members(ctx: &EmitCtx<'_>, members: &[ResolvedMember<'_>], e: &mut Emitter) {
  for member in members {
    match member {
      ResolvedMember::Field(field) => emit_value(ctx, &ctx.member_place(field.name), ctx.is_bound(), &field.ty, e),
      ResolvedMember::Union(union) => emit_union(ctx, union, e),
      ResolvedMember::Eos | ResolvedMember::Ignore | ResolvedMember::Fail => {}
    }
  }
}

/* `by_ref` is set when `place` is a reference binding rather than a field of `self` */
fn emit_value(ctx: &EmitCtx<'_>, place: &str, by_ref: bool, ty: &ResolvedType<'_>, e: &mut Emitter) {
  let out = &ctx.out;
  match ty {
    ResolvedType::Int { .. } => e.line(format!("{}.extend_from_slice(&{}.to_be_bytes());", out, place)),
    ResolvedType::NulTermString => {
      e.line(format!("{}.extend_from_slice({}.as_bytes());", out, place));
      e.line(format!("{}.push(0);", out));
    }
    ResolvedType::RemainingOffset => {
      if ctx.check_offsets {
        let value = if by_ref { format!("*{}", place) } else { place.to_string() };
        e.line(format!(
          "if {} != {}.len() {{ return Err(Error::LengthConstraintViolation); }}",
          value, out
        ));
      }
    }
    ResolvedType::Struct { .. } => e.line(format!("{}.encode_into({});", place, out)),
    ResolvedType::FixedArray { base, .. } | ResolvedType::VarArray { base, .. } => {
      if is_plain_byte(base) {
        e.line(format!("{}.extend_from_slice({}.as_slice());", out, place));
      } else {
        let item = e.temp("item");
        e.open(format!("for {} in {}.iter() {{", item, place));
        emit_value(ctx, &item, true, base, e);
        e.close("}");
      }
    }
  }
}

/* Encodes the stored variant; a union whose cases are all disallowed has no value to write */
pub(crate) fn emit_union(ctx: &EmitCtx<'_>, union: &ResolvedUnion<'_>, e: &mut Emitter) {
  let enum_ident = ctx.union_ident(union.name);
  let variants = variant_idents(&union.cases);
  if variants.iter().all(Option::is_none) {
    return;
  }

  e.open(format!("match {} {{", ctx.member_ref(union.name)));
  for (case, variant) in union.cases.iter().zip(&variants) {
    let Some(variant) = variant else { continue };
    e.open(format!("{} => {{", variant_pattern(&enum_ident, variant, &case.members)));
    emit_members(&ctx.enter_case(&enum_ident, variant), &case.members, e);
    e.close("}");
  }
  e.close("}");
}
