//! Formats compiled by `wire-gen` at build time from the descriptions in
//! `fixtures/`. The tests in this crate exercise the generated code against
//! concrete byte strings and generated values.

pub mod arrays {
    include!(concat!(env!("OUT_DIR"), "/arrays.rs"));
}

pub mod strings {
    include!(concat!(env!("OUT_DIR"), "/strings.rs"));
}

pub mod unions {
    include!(concat!(env!("OUT_DIR"), "/unions.rs"));
}

/// Polygon formats built on an imported point description.
pub mod nested {
    include!(concat!(env!("OUT_DIR"), "/nested.rs"));
}

pub mod socks5 {
    include!(concat!(env!("OUT_DIR"), "/socks5.rs"));
}

pub mod contexts {
    include!(concat!(env!("OUT_DIR"), "/contexts.rs"));
}

pub mod leftover {
    include!(concat!(env!("OUT_DIR"), "/leftover.rs"));
}

pub mod recursive {
    include!(concat!(env!("OUT_DIR"), "/recursive.rs"));
}
