/* Identifier conventions shared by analysis and code generation */

use heck::{ToSnakeCase, ToUpperCamelCase};

/* Escape Rust keywords to valid identifiers */
pub fn escape_rust_keyword(name: &str) -> String {
    const RUST_KEYWORDS: &[&str] = &[
        "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn",
        "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
        "return", "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe",
        "use", "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do",
        "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
        "gen",
    ];

    if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/* Type names generated code relies on; declarations must not shadow them */
pub const RESERVED_TYPE_IDENTS: &[&str] = &["Error", "Result", "Option", "Vec", "Box", "String"];

/* Rust type name for a struct, context or union declaration */
pub fn type_ident(name: &str) -> String {
    let ident = name.to_upper_camel_case();
    /* `Self` is the only keyword that survives camel casing */
    if ident == "Self" {
        "Self_".to_string()
    } else {
        ident
    }
}

/* Rust field and local variable name for a member */
pub fn field_ident(name: &str) -> String {
    let snake = name.to_snake_case();
    /* `self` and `super` cannot be raw identifiers */
    match snake.as_str() {
        "self" | "super" | "crate" | "Self" => format!("{}_", snake),
        _ => escape_rust_keyword(&snake),
    }
}

/* Enum generated for a union member; nested unions extend their enclosing variant's name */
pub fn union_type_ident(prefix: &str, union_name: &str) -> String {
    format!("{}{}", prefix, union_name.to_upper_camel_case())
}

/* Parameter name carrying a context into decode */
pub fn context_param(context: &str) -> String {
    format!("ctx_{}", context.to_snake_case())
}

/* Name of the free parse function emitted for a struct */
pub fn parse_fn_ident(struct_name: &str) -> String {
    format!("parse_{}", struct_name.to_snake_case())
}

/* Rust constant name */
pub fn const_ident(name: &str) -> String {
    use heck::ToShoutySnakeCase;
    name.to_shouty_snake_case()
}
