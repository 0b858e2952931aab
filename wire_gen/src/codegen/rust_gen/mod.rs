pub mod decode;
pub mod emit_ctx;
pub mod encode;
pub mod functions;
pub mod helpers;
pub mod runtime;
pub mod types;
pub mod validate;

pub use emit_ctx::{Access, EmitCtx, Emitter};
pub use functions::emit_struct_impl;
pub use runtime::{RUNTIME_PREAMBLE, module_header};
pub use types::{emit_constant, emit_context_decl, emit_struct_decl};
