/* Decode pass: reads members in declaration order from a single cursor.
   Every read goes through a runtime helper that checks the remaining length
   first, so generated code never indexes past its input. */

use super::emit_ctx::{Access, EmitCtx, Emitter};
use super::helpers::{
  count_value, is_plain_byte, member_idents, range_pattern, read_fn, ref_value, rust_type, variant_idents,
  variant_pattern,
};
use crate::error::{GenResult, Site};
use crate::naming::{field_ident, type_ident};
use crate::schema::resolved::{Evaluated, ResolvedLength, ResolvedMember, ResolvedStruct, ResolvedType, ResolvedUnion};

pub fn emit_decode_fn(ctx: &EmitCtx<'_>, resolved: &ResolvedStruct<'_>, e: &mut Emitter) -> GenResult<()> {
  e.open(format!(
    "pub fn decode<'a>(__input: &'a [u8]{}) -> Result<(Self, &'a [u8]), Error> {{",
    ctx.context_params()
  ));
  e.line("let mut __cur: &'a [u8] = __input;");
  if emit_members(ctx, &resolved.members, e)? {
    let idents = member_idents(&resolved.members);
    if idents.is_empty() {
      e.line("Ok((Self {}, __cur))");
    } else {
      e.line(format!("Ok((Self {{ {} }}, __cur))", idents.join(", ")));
    }
  }
  e.close("}");
  Ok(())
}

/* Returns false when the list ends in `fail`; nothing after it is emitted */
fn emit_members(ctx: &EmitCtx<'_>, members: &[ResolvedMember<'_>], e: &mut Emitter) -> GenResult<bool> {
  for member in members {
    match member {
      ResolvedMember::Field(field) => {
        emit_value(ctx.site(field.name), &field_ident(field.name), &field.ty, e)?;
      }
      ResolvedMember::Union(union) => emit_union(ctx, union, e)?,
      ResolvedMember::Eos => e.line("if !__cur.is_empty() { return Err(Error::TrailingData); }"),
      ResolvedMember::Ignore => e.line("__cur = &__cur[__cur.len()..];"),
      ResolvedMember::Fail => {
        e.line("return Err(Error::DisallowedCase);");
        return Ok(false);
      }
    }
  }
  Ok(true)
}

/* Emit statements binding `target` to the next value of type `ty` */
fn emit_value(site: Site<'_>, target: &str, ty: &ResolvedType<'_>, e: &mut Emitter) -> GenResult<()> {
  match ty {
    ResolvedType::Int { width, ranges } => {
      e.line(format!("let {} = {}(&mut __cur)?;", target, read_fn(*width)));
      if let Some(ranges) = ranges {
        e.line(format!(
          "if !matches!({}, {}) {{ return Err(Error::ConstraintViolation); }}",
          target,
          range_pattern(ranges)
        ));
      }
    }
    ResolvedType::NulTermString => {
      e.line(format!("let {} = __read_nul_string(&mut __cur)?;", target));
    }
    ResolvedType::RemainingOffset => {
      e.line(format!("let {} = __offset_of(__input, __cur);", target));
    }
    ResolvedType::Struct { def, boxed } => {
      let next = e.temp("next");
      e.line(format!(
        "let ({}, {}) = {}::decode(__cur{})?;",
        target,
        next,
        type_ident(&def.name),
        EmitCtx::context_args(def)
      ));
      e.line(format!("__cur = {};", next));
      if *boxed {
        e.line(format!("let {} = Box::new({});", target, target));
      }
    }
    ResolvedType::FixedArray { base, size } => {
      if is_plain_byte(base) {
        e.line(format!(
          "let {}: [u8; {}] = __take(&mut __cur, {})?.try_into().map_err(|_| Error::TruncatedInput)?;",
          target, size, size
        ));
      } else {
        let items = e.temp("items");
        e.line(format!("let mut {} = Vec::with_capacity({}usize.min(__cur.len()));", items, size));
        e.open(format!("for _ in 0..{}usize {{", size));
        emit_element(site, &items, base, e)?;
        e.close("}");
        e.line(format!(
          "let {}: [{}; {}] = {}.try_into().map_err(|_| Error::LengthConstraintViolation)?;",
          target,
          rust_type(base),
          size,
          items
        ));
      }
    }
    ResolvedType::VarArray { base, length } => match length {
      ResolvedLength::Greedy => emit_greedy(site, target, base, e)?,
      ResolvedLength::Count(count) => emit_counted(site, target, count, base, e)?,
      ResolvedLength::Leftover(reserved) => {
        let rest = enter_region(e, format!("__split_leftover(__cur, {}usize)?", reserved));
        emit_greedy(site, target, base, e)?;
        e.line(format!("__cur = {};", rest));
      }
    },
  }
  Ok(())
}

fn emit_element(site: Site<'_>, items: &str, base: &ResolvedType<'_>, e: &mut Emitter) -> GenResult<()> {
  let elem = e.temp("elem");
  emit_value(site, &elem, base, e)?;
  e.line(format!("{}.push({});", items, elem));
  Ok(())
}

fn emit_counted(
  site: Site<'_>,
  target: &str,
  count: &Evaluated,
  base: &ResolvedType<'_>,
  e: &mut Emitter,
) -> GenResult<()> {
  let value = count_value(count, Access::Decode).ok_or_else(|| site.invalid("length is not visible while decoding"))?;
  let n = e.temp("n");
  e.line(format!("let {} = {};", n, value));
  if is_plain_byte(base) {
    e.line(format!("let {} = __take(&mut __cur, {})?.to_vec();", target, n));
    return Ok(());
  }
  /* Capacity is bounded by the input so a hostile count cannot force a huge allocation */
  let items = e.temp("items");
  e.line(format!("let mut {} = Vec::with_capacity({}.min(__cur.len()));", items, n));
  e.open(format!("for _ in 0..{} {{", n));
  emit_element(site, &items, base, e)?;
  e.close("}");
  e.line(format!("let {} = {};", target, items));
  Ok(())
}

/* Elements until the current region is exhausted */
fn emit_greedy(site: Site<'_>, target: &str, base: &ResolvedType<'_>, e: &mut Emitter) -> GenResult<()> {
  if is_plain_byte(base) {
    e.line(format!("let {} = __cur.to_vec();", target));
    e.line("__cur = &__cur[__cur.len()..];");
    return Ok(());
  }
  let items = e.temp("items");
  let before = e.temp("before");
  e.line(format!("let mut {} = Vec::new();", items));
  e.open("while !__cur.is_empty() {");
  e.line(format!("let {} = __cur.len();", before));
  emit_element(site, &items, base, e)?;
  e.line(format!("if __cur.len() == {} {{ return Err(Error::TrailingData); }}", before));
  e.close("}");
  e.line(format!("let {} = {};", target, items));
  Ok(())
}

/* Narrow the cursor to a sub-region; returns the name holding the bytes after it */
fn enter_region(e: &mut Emitter, split: String) -> String {
  let region = e.temp("region");
  let rest = e.temp("rest");
  e.line(format!("let ({}, {}) = {};", region, rest, split));
  e.line(format!("__cur = {};", region));
  rest
}

fn emit_union(ctx: &EmitCtx<'_>, union: &ResolvedUnion<'_>, e: &mut Emitter) -> GenResult<()> {
  let site = ctx.site(union.name);
  let enum_ident = ctx.union_ident(union.name);

  let rest = match &union.length {
    ResolvedLength::Greedy => None,
    ResolvedLength::Count(count) => {
      let value =
        count_value(count, Access::Decode).ok_or_else(|| site.invalid("length is not visible while decoding"))?;
      Some(enter_region(e, format!("__split_count(__cur, {})?", value)))
    }
    ResolvedLength::Leftover(reserved) => Some(enter_region(e, format!("__split_leftover(__cur, {}usize)?", reserved))),
  };

  let tag = ref_value(&union.tag, Access::Decode).ok_or_else(|| site.invalid("tag is not visible while decoding"))?;
  let variants = variant_idents(&union.cases);
  let mut has_default = false;

  e.open(format!("let {} = match {} {{", field_ident(union.name), tag));
  for (case, variant) in union.cases.iter().zip(&variants) {
    let pattern = match &case.labels {
      Some(labels) => range_pattern(labels),
      None => {
        has_default = true;
        "_".to_string()
      }
    };
    match variant {
      None => e.line(format!("{} => return Err(Error::DisallowedCase),", pattern)),
      Some(variant) => {
        e.open(format!("{} => {{", pattern));
        emit_members(&ctx.enter_case(&enum_ident, variant), &case.members, e)?;
        e.line(variant_pattern(&enum_ident, variant, &case.members));
        e.close("}");
      }
    }
  }
  if !has_default {
    e.line("_ => return Err(Error::DisallowedCase),");
  }
  e.close("};");

  if let Some(rest) = rest {
    e.line("if !__cur.is_empty() { return Err(Error::TrailingData); }");
    e.line(format!("__cur = {};", rest));
  }
  Ok(())
}
