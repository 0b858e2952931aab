/* Rust Code Generation Tests
 *
 * These tests load format descriptions from YAML and check the text of the
 * generated module: declarations, signatures and the statements each pass emits.
 */

use std::path::Path;
use wire_gen::codegen::sink::{CodeSink, ModuleSink};
use wire_gen::{GenError, Resolver, RustCodeGenerator, RustCodeGeneratorOptions, generate};
use wire_loader::WireFile;

fn load(yaml: &str) -> wire_gen::schema::File {
    WireFile::from_yaml(yaml)
        .expect("document should parse")
        .into_file(Path::new("test.yaml"))
}

fn generate_from(yaml: &str) -> String {
    generate(&[load(yaml)], RustCodeGeneratorOptions::default()).expect("generation should succeed")
}

const SIMPLE_ARRAY: &str = r#"
structs:
  - name: simple_array
    members:
      - field: { name: count, type: { int: { width: u8 } } }
      - field:
          name: data
          type:
            var-array:
              base: { int: { width: u8 } }
              length: { count: { name: count } }
"#;

const SOCKS5: &str = r#"
constants:
  - { name: ATYPE_IPV4, value: 1 }
  - { name: ATYPE_DOMAINNAME, value: 3 }
structs:
  - name: socks5_client_request
    members:
      - field: { name: version, type: { int: { width: u8, constraint: [{ low: 5 }] } } }
      - field: { name: command, type: { int: { width: u8, constraint: [{ low: 1, high: 3 }] } } }
      - field: { name: reserved, type: { int: { width: u8, constraint: [{ low: 0 }] } } }
      - field: { name: atype, type: { int: { width: u8 } } }
      - union:
          name: dest_addr
          tag: { name: atype }
          cases:
            - case: [{ low: ATYPE_IPV4 }]
              members:
                - field: { name: ipv4, type: { int: { width: u32 } } }
            - case: [{ low: ATYPE_DOMAINNAME }]
              members:
                - field: { name: len, type: { int: { width: u8 } } }
                - field:
                    name: name
                    type:
                      var-array:
                        base: char
                        length: { count: { name: len } }
            - members: [fail]
      - field: { name: dest_port, type: { int: { width: u16 } } }
"#;

#[test]
fn test_module_layout() {
    let code = generate_from(SIMPLE_ARRAY);

    assert!(code.starts_with("// @generated by wire-gen"));
    assert!(code.contains("pub enum Error {"));
    assert!(code.contains("fn __read_u8(cur: &mut &[u8]) -> Result<u8, Error> {"));
    assert!(code.contains("#[derive(Debug, Clone, PartialEq, Eq)]\npub struct SimpleArray {\n    pub count: u8,\n    pub data: Vec<u8>,\n}"));
    assert!(code.contains("impl SimpleArray {"));
    assert!(code.contains("pub fn parse_simple_array(__input: &[u8]) -> Result<SimpleArray, Error> {"));

    /* Declarations come before any impl */
    let decl = code.find("pub struct SimpleArray").unwrap();
    let imp = code.find("impl SimpleArray").unwrap();
    assert!(decl < imp);
}

#[test]
fn test_counted_array_passes() {
    let code = generate_from(SIMPLE_ARRAY);

    assert!(code.contains("pub fn decode<'a>(__input: &'a [u8]) -> Result<(Self, &'a [u8]), Error> {"));
    assert!(code.contains("let count = __read_u8(&mut __cur)?;"));
    assert!(code.contains("let __n0 = (count as usize);"));
    assert!(code.contains("let data = __take(&mut __cur, __n0)?.to_vec();"));
    assert!(code.contains("Ok((Self { count, data }, __cur))"));

    assert!(code.contains("__out.extend_from_slice(&self.count.to_be_bytes());"));
    assert!(code.contains("__out.extend_from_slice(self.data.as_slice());"));

    assert!(code.contains(
        "if self.data.len() != (self.count as usize) { return Err(Error::LengthConstraintViolation); }"
    ));
    assert!(code.contains("self.validate()?;\n        Ok(self.encode_unchecked())"));
}

#[test]
fn test_union_generation() {
    let code = generate_from(SOCKS5);

    assert!(code.contains("pub const ATYPE_IPV4: i64 = 1;"));
    assert!(code.contains("pub dest_addr: Socks5ClientRequestDestAddr,"));
    assert!(code.contains("pub enum Socks5ClientRequestDestAddr {"));
    assert!(code.contains("    AtypeIpv4 {\n        ipv4: u32,\n    },"));
    assert!(code.contains("    AtypeDomainname {\n        len: u8,\n        name: Vec<u8>,\n    },"));

    /* Range checks on decode */
    assert!(code.contains("if !matches!(version, 5) { return Err(Error::ConstraintViolation); }"));
    assert!(code.contains("if !matches!(command, 1..=3) { return Err(Error::ConstraintViolation); }"));

    /* Case dispatch: named cases, then the disallowed default */
    assert!(code.contains("let dest_addr = match atype {"));
    assert!(code.contains("Socks5ClientRequestDestAddr::AtypeDomainname { len, name }"));
    assert!(code.contains("_ => return Err(Error::DisallowedCase),"));

    /* Validate ties the stored variant to the tag */
    assert!(code.contains("= match self.atype {"));
    assert!(code.contains("Socks5ClientRequestDestAddr::AtypeIpv4 { .. } => 0,"));
    assert!(code.contains("if name.len() != (*len as usize) { return Err(Error::LengthConstraintViolation); }"));
}

#[test]
fn test_nul_strings_and_fixed_arrays() {
    let code = generate_from(
        r#"
structs:
  - name: greeting
    members:
      - field: { name: text, type: nul-term-string }
      - field: { name: tail, type: { int: { width: u8 } } }
      - field:
          name: key
          type: { fixed-array: { base: { int: { width: u8 } }, size: 4 } }
      - field:
          name: words
          type: { fixed-array: { base: { int: { width: u16 } }, size: 2 } }
"#,
    );

    assert!(code.contains("pub text: String,"));
    assert!(code.contains("pub key: [u8; 4],"));
    assert!(code.contains("pub words: [u16; 2],"));
    assert!(code.contains("let text = __read_nul_string(&mut __cur)?;"));
    assert!(code.contains("__out.extend_from_slice(self.text.as_bytes());\n        __out.push(0);"));
    assert!(code.contains(
        "let key: [u8; 4] = __take(&mut __cur, 4)?.try_into().map_err(|_| Error::TruncatedInput)?;"
    ));
    assert!(code.contains("if self.text.as_bytes().contains(&0) { return Err(Error::MalformedString); }"));
}

#[test]
fn test_contexts_are_threaded_through_decode() {
    let code = generate_from(
        r#"
contexts:
  - name: flag_ctx
    fields:
      - { name: mode, type: { int: { width: u8 } } }
structs:
  - name: inner
    contexts: [flag_ctx]
    members:
      - field:
          name: data
          type:
            var-array:
              base: { int: { width: u8 } }
              length: { count: { scope: flag_ctx, name: mode } }
  - name: outer
    contexts: [flag_ctx]
    members:
      - field: { name: body, type: { struct-ref: inner } }
"#,
    );

    assert!(code.contains("#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]\npub struct FlagCtx {\n    pub mode: u8,\n}"));
    assert!(code.contains(
        "pub fn decode<'a>(__input: &'a [u8], ctx_flag_ctx: &FlagCtx) -> Result<(Self, &'a [u8]), Error> {"
    ));
    assert!(code.contains("let __n0 = (ctx_flag_ctx.mode as usize);"));
    assert!(code.contains("= Inner::decode(__cur, ctx_flag_ctx)?;"));
    assert!(code.contains("pub fn parse_outer(__input: &[u8], ctx_flag_ctx: &FlagCtx) -> Result<Outer, Error> {"));
    /* Validate cannot see context values */
    assert!(!code.contains("self.data.len() != "));
}

#[test]
fn test_recursive_structs_are_boxed() {
    let code = generate_from(
        r#"
structs:
  - name: node
    members:
      - field: { name: more, type: { int: { width: u8, constraint: [{ low: 0, high: 1 }] } } }
      - union:
          name: next
          tag: { name: more }
          cases:
            - case: [{ low: 0 }]
            - case: [{ low: 1 }]
              members:
                - field: { name: child, type: { struct-ref: node } }
"#,
    );

    assert!(code.contains("pub enum NodeNext {\n    Case0,\n    Case1 {\n        child: Box<Node>,\n    },\n}"));
    assert!(code.contains("let child = Box::new(child);"));
    assert!(code.contains("child.encode_into(__out);"));
    assert!(code.contains("child.validate()?;"));
}

#[test]
fn test_greedy_and_leftover_arrays() {
    let code = generate_from(
        r#"
structs:
  - name: item
    members:
      - field: { name: id, type: { int: { width: u16 } } }
  - name: framed
    members:
      - field:
          name: items
          type:
            var-array:
              base: { struct-ref: item }
              length: { leftover: 2 }
      - field: { name: checksum, type: { int: { width: u16 } } }
"#,
    );

    assert!(code.contains("= __split_leftover(__cur, 2usize)?;"));
    assert!(code.contains("while !__cur.is_empty() {"));
    assert!(code.contains("{ return Err(Error::TrailingData); }"));
    assert!(code.contains("for __item"));
}

#[test]
fn test_remaining_offsets_are_validated() {
    let code = generate_from(
        r#"
structs:
  - name: located
    members:
      - field: { name: head, type: { int: { width: u8 } } }
      - field: { name: offset, type: remaining-offset }
      - field: { name: body, type: { int: { width: u16 } } }
"#,
    );

    assert!(code.contains("let offset = __offset_of(__input, __cur);"));
    assert!(code.contains("let mut __buf0: Vec<u8> = Vec::new();"));
    assert!(code.contains("let __scratch1 = &mut __buf0;"));
    assert!(code.contains("if self.offset != __scratch1.len() { return Err(Error::LengthConstraintViolation); }"));

    /* The unchecked encode writes nothing for the offset */
    let encode_into = code.find("pub fn encode_into").unwrap();
    let unchecked = code.find("pub fn encode_unchecked").unwrap();
    assert!(!code[encode_into..unchecked].contains("offset"));
}

#[test]
fn test_options_control_output() {
    let file = load(
        r#"
constants:
  - { name: max_len, value: 16 }
structs:
  - name: empty
"#,
    );
    let resolver = Resolver::new(&[file]).unwrap();
    let options = RustCodeGeneratorOptions {
        module_doc: Some("Test formats.".to_string()),
        emit_constants: false,
        emit_parse_fns: false,
        sources: vec!["empty.yaml".to_string()],
    };
    let code = RustCodeGenerator::new(&resolver, options).emit_code().unwrap();

    assert!(code.contains("// Sources: empty.yaml\n"));
    assert!(code.contains("// Test formats.\n"));
    assert!(!code.contains("MAX_LEN"));
    assert!(!code.contains("pub fn parse_empty"));
    assert!(code.contains("pub struct Empty {\n}"));
    assert!(code.contains("Ok((Self {}, __cur))"));
}

#[test]
fn test_extern_structs_are_not_emitted() {
    let code = generate_from(
        r#"
structs:
  - name: opaque
    extern: true
  - name: wrapper
    members:
      - field: { name: inner, type: { struct-ref: opaque } }
"#,
    );

    assert!(!code.contains("pub struct Opaque"));
    assert!(code.contains("pub inner: Opaque,"));
    assert!(code.contains("= Opaque::decode(__cur)?;"));
}

#[test]
fn test_generator_writes_into_any_sink() {
    let resolver = Resolver::new(&[load(SIMPLE_ARRAY)]).unwrap();
    let generator = RustCodeGenerator::new(&resolver, RustCodeGeneratorOptions::default());
    let mut sink = ModuleSink::new();
    generator.emit_into(&mut sink).unwrap();

    assert!(sink.is_declared("SimpleArray"));
    assert!(sink.is_declared("Error"));
    let code = sink.finish();
    assert!(code.contains("impl SimpleArray {"));

    let single = generator.emit_struct_code("simple_array").unwrap();
    assert!(single.contains("impl SimpleArray {"));
    assert!(!single.contains("pub enum Error"));

    assert_eq!(
        generator.emit_struct_code("missing").unwrap_err(),
        GenError::UnknownStruct { name: "missing".to_string() }
    );
    assert_eq!(
        generator.emit_struct_code("missing").unwrap_err().to_string(),
        "no struct named 'missing'"
    );
}
