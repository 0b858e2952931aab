use super::decode::emit_decode_fn;
use super::emit_ctx::{EmitCtx, Emitter};
use super::encode::emit_encode_fns;
use super::validate::emit_validate_fns;
use crate::error::GenResult;
use crate::naming::{context_param, parse_fn_ident, type_ident};
use crate::schema::resolved::ResolvedStruct;

const IMPL_ALLOWS: &str = "#[allow(unused_mut, unused_variables, unused_assignments, unused_parens, unreachable_code, unreachable_patterns, clippy::all)]";

/// Emit the `impl` block of a struct followed by its free parse function.
pub fn emit_struct_impl(ctx: &EmitCtx<'_>, resolved: &ResolvedStruct<'_>, emit_parse_fn: bool) -> GenResult<String> {
  let ident = type_ident(&resolved.def.name);
  let params = ctx.context_params();
  let args: String = resolved.def.contexts.iter().map(|c| format!(", {}", context_param(c))).collect();

  let mut e = Emitter::new(0);
  e.line(IMPL_ALLOWS);
  e.open(format!("impl {} {{", ident));

  emit_decode_fn(ctx, resolved, &mut e)?;
  e.blank();

  e.open(format!("pub fn parse(__input: &[u8]{}) -> Result<Self, Error> {{", params));
  e.line(format!("let (__value, __rest) = Self::decode(__input{})?;", args));
  e.line("if !__rest.is_empty() { return Err(Error::TrailingData); }");
  e.line("Ok(__value)");
  e.close("}");
  e.blank();

  emit_encode_fns(ctx, resolved, &mut e);
  e.blank();
  emit_validate_fns(ctx, resolved, &mut e)?;
  e.close("}");

  if emit_parse_fn {
    e.blank();
    e.open(format!(
      "pub fn {}(__input: &[u8]{}) -> Result<{}, Error> {{",
      parse_fn_ident(&resolved.def.name),
      params,
      ident
    ));
    e.line(format!("{}::parse(__input{})", ident, args));
    e.close("}");
  }

  Ok(e.finish())
}
