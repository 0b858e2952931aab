/* Type declarations: one struct per wire struct, one enum per union member,
   plus contexts and constants. */

use super::emit_ctx::{EmitCtx, Emitter};
use super::helpers::{int_type, rust_type, variant_idents};
use crate::codegen::sink::CodeSink;
use crate::error::{GenError, GenResult};
use crate::naming::{const_ident, field_ident, type_ident};
use crate::schema::Context;
use crate::schema::resolved::{ResolvedMember, ResolvedStruct};

pub fn emit_struct_decl<S: CodeSink>(
  ctx: &EmitCtx<'_>,
  resolved: &ResolvedStruct<'_>,
  sink: &mut S,
) -> GenResult<String> {
  let mut e = Emitter::new(0);
  e.line("#[derive(Debug, Clone, PartialEq, Eq)]");
  e.open(format!("pub struct {} {{", type_ident(&resolved.def.name)));
  emit_fields(ctx, &resolved.members, "pub ", &mut e);
  e.close("}");
  emit_union_enums(ctx, &resolved.members, sink, &mut e)?;
  Ok(e.finish())
}

/* One line per member holding a value; `vis` is empty inside enum variants */
fn emit_fields(ctx: &EmitCtx<'_>, members: &[ResolvedMember<'_>], vis: &str, e: &mut Emitter) {
  for member in members {
    match member {
      ResolvedMember::Field(field) => {
        e.line(format!("{}{}: {},", vis, field_ident(field.name), rust_type(&field.ty)));
      }
      ResolvedMember::Union(union) => {
        e.line(format!("{}{}: {},", vis, field_ident(union.name), ctx.union_ident(union.name)));
      }
      ResolvedMember::Eos | ResolvedMember::Ignore | ResolvedMember::Fail => {}
    }
  }
}

fn emit_union_enums<S: CodeSink>(
  ctx: &EmitCtx<'_>,
  members: &[ResolvedMember<'_>],
  sink: &mut S,
  e: &mut Emitter,
) -> GenResult<()> {
  for member in members {
    let ResolvedMember::Union(union) = member else { continue };
    let enum_ident = ctx.union_ident(union.name);
    if !sink.declare(&enum_ident) {
      return Err(GenError::DuplicateDefinition { kind: "type", name: enum_ident });
    }

    let variants = variant_idents(&union.cases);
    e.blank();
    e.line(format!("/// Cases of `{}.{}`, selected by the value of its tag.", ctx.owner.name, union.name));
    e.line("#[derive(Debug, Clone, PartialEq, Eq)]");
    e.open(format!("pub enum {} {{", enum_ident));
    for (case, variant) in union.cases.iter().zip(&variants) {
      let Some(variant) = variant else { continue };
      if case.members.iter().any(|m| matches!(m, ResolvedMember::Field(_) | ResolvedMember::Union(_))) {
        e.open(format!("{} {{", variant));
        emit_fields(&ctx.enter_case(&enum_ident, variant), &case.members, "", e);
        e.close("},");
      } else {
        e.line(format!("{},", variant));
      }
    }
    e.close("}");

    for (case, variant) in union.cases.iter().zip(&variants) {
      if let Some(variant) = variant {
        emit_union_enums(&ctx.enter_case(&enum_ident, variant), &case.members, sink, e)?;
      }
    }
  }
  Ok(())
}

pub fn emit_context_decl(context: &Context) -> GenResult<String> {
  let mut e = Emitter::new(0);
  e.line(format!("/// Decode parameters of context `{}`.", context.name));
  e.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]");
  e.open(format!("pub struct {} {{", type_ident(&context.name)));
  for field in &context.fields {
    let width = field.field_type.int_width().ok_or_else(|| GenError::InvalidContextField {
      context: context.name.clone(),
      field: field.name.clone(),
    })?;
    e.line(format!("pub {}: {},", field_ident(&field.name), int_type(width)));
  }
  e.close("}");
  Ok(e.finish())
}

pub fn emit_constant(name: &str, value: i64) -> String {
  format!("pub const {}: i64 = {};\n", const_ident(name), value)
}
