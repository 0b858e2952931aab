use std::path::Path;
use wire_gen::dependency::DependencyAnalyzer;
use wire_gen::schema::{File, Struct};
use wire_gen::{GenError, Resolver, RustCodeGenerator, RustCodeGeneratorOptions, generate};
use wire_loader::WireFile;

fn load(yaml: &str) -> File {
    WireFile::from_yaml(yaml)
        .expect("document should parse")
        .into_file(Path::new("test.yaml"))
}

fn generation_error(yaml: &str) -> GenError {
    generate(&[load(yaml)], RustCodeGeneratorOptions::default()).expect_err("generation should fail")
}

#[test]
fn test_complete_pipeline() {
    // Load -> resolve -> analyze -> generate, across two files
    let common = load(
        r#"
constants:
  - { name: MAX_ITEMS, value: 4 }
structs:
  - name: item
    members:
      - field: { name: id, type: { int: { width: u16 } } }
"#,
    );
    let main = load(
        r#"
structs:
  - name: batch
    members:
      - field:
          name: items
          type:
            var-array:
              base: { struct-ref: item }
              length: { count: MAX_ITEMS }
      - eos
"#,
    );

    let files = vec![common, main];
    let resolver = Resolver::new(&files).unwrap();
    let structs: Vec<&Struct> = resolver.structs().collect();
    let analysis = DependencyAnalyzer::new().analyze(&structs, &[]);
    assert!(!analysis.has_errors());
    assert_eq!(
        analysis.topological_order,
        Some(vec!["item".to_string(), "batch".to_string()])
    );

    let code = RustCodeGenerator::new(&resolver, RustCodeGeneratorOptions::default())
        .emit_code()
        .unwrap();
    assert!(code.contains("pub const MAX_ITEMS: i64 = 4;"));
    assert!(code.contains("let __n0 = 4usize;"));
    assert!(code.contains("if self.items.len() != 4usize { return Err(Error::LengthConstraintViolation); }"));
    assert!(code.contains("if !__cur.is_empty() { return Err(Error::TrailingData); }"));
}

#[test]
fn test_unresolved_struct_reference() {
    let err = generation_error(
        r#"
structs:
  - name: holder
    members:
      - field: { name: missing, type: { struct-ref: nowhere } }
"#,
    );
    assert_eq!(
        err,
        GenError::UnresolvedStructReference {
            owner: "holder".to_string(),
            field: "missing".to_string(),
            name: "nowhere".to_string(),
        }
    );
    assert_eq!(err.to_string(), "holder.missing: reference to undeclared struct 'nowhere'");
}

#[test]
fn test_unresolved_integer_reference() {
    let err = generation_error(
        r#"
structs:
  - name: holder
    members:
      - field:
          name: data
          type:
            var-array:
              base: { int: { width: u8 } }
              length: { count: { name: len } }
      - field: { name: len, type: { int: { width: u8 } } }
"#,
    );
    /* References must name a field decoded earlier */
    assert_eq!(
        err,
        GenError::UnresolvedIntegerReference {
            owner: "holder".to_string(),
            field: "data".to_string(),
            name: "len".to_string(),
        }
    );

    let err = generation_error(
        r#"
structs:
  - name: holder
    members:
      - field: { name: kind, type: { int: { width: u8, constraint: [{ low: UNKNOWN }] } } }
"#,
    );
    assert!(matches!(err, GenError::UnresolvedIntegerReference { name, .. } if name == "UNKNOWN"));
}

#[test]
fn test_missing_context_argument() {
    let err = generation_error(
        r#"
contexts:
  - name: flags
    fields:
      - { name: mode, type: { int: { width: u8 } } }
structs:
  - name: inner
    contexts: [flags]
    members:
      - field: { name: value, type: { int: { width: u8 } } }
  - name: outer
    members:
      - field: { name: body, type: { struct-ref: inner } }
"#,
    );
    assert_eq!(
        err,
        GenError::MissingContextArgument {
            owner: "outer".to_string(),
            field: "body".to_string(),
            context: "flags".to_string(),
        }
    );

    let err = generation_error(
        r#"
contexts:
  - name: flags
    fields:
      - { name: mode, type: { int: { width: u8 } } }
structs:
  - name: unparameterized
    members:
      - field:
          name: data
          type:
            var-array:
              base: { int: { width: u8 } }
              length: { count: { scope: flags, name: mode } }
"#,
    );
    assert!(matches!(err, GenError::MissingContextArgument { context, .. } if context == "flags"));
}

#[test]
fn test_infinite_structs_are_rejected() {
    let err = generation_error(
        r#"
structs:
  - name: a
    members:
      - field: { name: b, type: { struct-ref: b } }
  - name: b
    members:
      - field: { name: pair, type: { fixed-array: { base: { struct-ref: a }, size: 2 } } }
"#,
    );
    assert!(matches!(err, GenError::InfiniteStruct { cycle } if cycle.contains(&"a".to_string())));
}

#[test]
fn test_constraint_errors() {
    let err = generation_error(
        r#"
structs:
  - name: holder
    members:
      - field: { name: kind, type: { int: { width: u8, constraint: [{ low: 1, high: 300 }] } } }
"#,
    );
    assert!(matches!(err, GenError::ConstantOutOfRange { value: 300, bits: 8, .. }));

    let err = generation_error(
        r#"
structs:
  - name: holder
    members:
      - field: { name: kind, type: { int: { width: u8, constraint: [{ low: 9, high: 2 }] } } }
"#,
    );
    assert!(matches!(err, GenError::InvalidRange { low: 9, high: 2, .. }));

    let err = generation_error(
        r#"
structs:
  - name: holder
    members:
      - field: { name: len, type: { int: { width: u8 } } }
      - field:
          name: data
          type:
            var-array:
              base: { int: { width: u8 } }
              length: { leftover: { name: len } }
"#,
    );
    assert!(matches!(err, GenError::ExpectedConstant { .. }));
}

#[test]
fn test_counted_arrays_need_sized_elements() {
    let err = generation_error(
        r#"
structs:
  - name: marker
    members:
      - field: { name: at, type: remaining-offset }
  - name: marker_list
    members:
      - field: { name: n, type: { int: { width: u32 } } }
      - field:
          name: markers
          type:
            var-array:
              base: { struct-ref: marker }
              length: { count: { name: n } }
"#,
    );
    assert_eq!(
        err,
        GenError::ZeroSizedElement {
            owner: "marker_list".to_string(),
            field: "markers".to_string(),
        }
    );

    /* Nested arrays may be empty too */
    let err = generation_error(
        r#"
structs:
  - name: grid
    members:
      - field: { name: rows, type: { int: { width: u16 } } }
      - field:
          name: cells
          type:
            var-array:
              base: { var-array: { base: { int: { width: u8 } } } }
              length: { count: { name: rows } }
"#,
    );
    assert!(matches!(err, GenError::ZeroSizedElement { field, .. } if field == "cells"));

    /* A constant count or a greedy array stays bounded by the input */
    generate(
        &[load(
            r#"
structs:
  - name: marker
    members:
      - field: { name: at, type: remaining-offset }
  - name: markers
    members:
      - field: { name: fixed, type: { var-array: { base: { struct-ref: marker }, length: { count: 4 } } } }
      - field: { name: rest, type: { var-array: { base: { struct-ref: marker } } } }
"#,
        )],
        RustCodeGeneratorOptions::default(),
    )
    .expect("bounded arrays of empty elements should generate");
}

#[test]
fn test_union_shape_errors() {
    let err = generation_error(
        r#"
structs:
  - name: holder
    members:
      - field: { name: kind, type: { int: { width: u8 } } }
      - union:
          name: body
          tag: { name: kind }
          cases:
            - members: [ignore]
            - case: [{ low: 1 }]
"#,
    );
    assert_eq!(
        err,
        GenError::MisplacedDefault {
            owner: "holder".to_string(),
            field: "body".to_string(),
        }
    );

    let err = generation_error(
        r#"
structs:
  - name: holder
    members:
      - field: { name: text, type: nul-term-string }
      - union:
          name: body
          tag: { name: text }
          cases:
            - case: [{ low: 1 }]
"#,
    );
    assert!(matches!(err, GenError::InvalidMember { field, .. } if field == "body"));
}

#[test]
fn test_name_collisions() {
    let err = generation_error(
        r#"
structs:
  - name: holder
    members:
      - field: { name: dataLen, type: { int: { width: u8 } } }
      - field: { name: data_len, type: { int: { width: u8 } } }
"#,
    );
    assert_eq!(
        err,
        GenError::DuplicateMember {
            owner: "holder".to_string(),
            name: "data_len".to_string(),
        }
    );

    /* A union enum may not take the name of a declared struct */
    let err = generation_error(
        r#"
structs:
  - name: packet_body
  - name: packet
    members:
      - field: { name: kind, type: { int: { width: u8 } } }
      - union:
          name: body
          tag: { name: kind }
          cases:
            - case: [{ low: 1 }]
"#,
    );
    assert_eq!(
        err,
        GenError::DuplicateDefinition {
            kind: "type",
            name: "PacketBody".to_string(),
        }
    );

    let err = generation_error("structs:\n  - name: result\n");
    assert!(matches!(err, GenError::ReservedName { .. }));
}

#[test]
fn test_failed_generation_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out").join("wire.rs");
    let file = load(
        r#"
structs:
  - name: holder
    members:
      - field: { name: missing, type: { struct-ref: nowhere } }
"#,
    );
    let resolver = Resolver::new(&[file]).unwrap();
    let generator = RustCodeGenerator::new(&resolver, RustCodeGeneratorOptions::default());

    let err = generator.write_module(&output).unwrap_err();
    assert!(err.downcast_ref::<GenError>().is_some());
    assert!(!output.exists());
}

#[test]
fn test_successful_generation_writes_module() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nested").join("wire.rs");
    let file = load(
        r#"
structs:
  - name: pair
    members:
      - field: { name: a, type: { int: { width: u8 } } }
      - field: { name: b, type: { int: { width: u8 } } }
"#,
    );
    let resolver = Resolver::new(&[file]).unwrap();
    RustCodeGenerator::new(&resolver, RustCodeGeneratorOptions::default())
        .write_module(&output)
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("impl Pair {"));
}
