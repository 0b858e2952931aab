/* Support code emitted at the top of every generated module. Generated modules
   carry their runtime with them so they can be included without a support crate. */

pub const RUNTIME_PREAMBLE: &str = r#"/// Errors reported by generated decode, validate and encode functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Fewer bytes remain than the next read requires.
    TruncatedInput,
    /// Bytes remain where the input must be fully consumed.
    TrailingData,
    /// A string has no terminator, is not UTF-8, or contains a zero byte.
    MalformedString,
    /// An integer lies outside its declared ranges.
    ConstraintViolation,
    /// A union discriminant selects a disallowed case or no case at all.
    DisallowedCase,
    /// An array length disagrees with its declared or referenced length.
    LengthConstraintViolation,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Error::TruncatedInput => "truncated input",
            Error::TrailingData => "trailing data",
            Error::MalformedString => "malformed string",
            Error::ConstraintViolation => "integer constraint violation",
            Error::DisallowedCase => "disallowed case",
            Error::LengthConstraintViolation => "length constraint violation",
        })
    }
}

impl std::error::Error for Error {}

#[allow(dead_code)]
fn __take<'b>(cur: &mut &'b [u8], n: usize) -> Result<&'b [u8], Error> {
    let data: &'b [u8] = *cur;
    if data.len() < n {
        return Err(Error::TruncatedInput);
    }
    let (head, tail) = data.split_at(n);
    *cur = tail;
    Ok(head)
}

#[allow(dead_code)]
fn __read_u8(cur: &mut &[u8]) -> Result<u8, Error> {
    let b = __take(cur, 1)?;
    Ok(b[0])
}

#[allow(dead_code)]
fn __read_u16(cur: &mut &[u8]) -> Result<u16, Error> {
    let b = __take(cur, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

#[allow(dead_code)]
fn __read_u32(cur: &mut &[u8]) -> Result<u32, Error> {
    let b = __take(cur, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[allow(dead_code)]
fn __read_u64(cur: &mut &[u8]) -> Result<u64, Error> {
    let b = __take(cur, 8)?;
    Ok(u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
}

#[allow(dead_code)]
fn __read_nul_string(cur: &mut &[u8]) -> Result<String, Error> {
    let data: &[u8] = *cur;
    let end = data.iter().position(|b| *b == 0).ok_or(Error::MalformedString)?;
    let text = core::str::from_utf8(&data[..end]).map_err(|_| Error::MalformedString)?;
    let value = text.to_owned();
    *cur = &data[end + 1..];
    Ok(value)
}

/* Split off the first `n` bytes as a region of their own */
#[allow(dead_code)]
fn __split_count(cur: &[u8], n: usize) -> Result<(&[u8], &[u8]), Error> {
    if cur.len() < n {
        return Err(Error::TruncatedInput);
    }
    Ok(cur.split_at(n))
}

/* Split off everything but the last `reserved` bytes as a region of its own */
#[allow(dead_code)]
fn __split_leftover(cur: &[u8], reserved: usize) -> Result<(&[u8], &[u8]), Error> {
    if cur.len() < reserved {
        return Err(Error::TruncatedInput);
    }
    Ok(cur.split_at(cur.len() - reserved))
}

/* Bytes of `input` consumed before `cur`; `cur` always lies within `input` */
#[allow(dead_code)]
fn __offset_of(input: &[u8], cur: &[u8]) -> usize {
    (cur.as_ptr() as usize).saturating_sub(input.as_ptr() as usize)
}
"#;

/* Header comment for a generated module */
pub fn module_header(sources: &[String], module_doc: Option<&str>) -> String {
  let mut header = String::new();
  header.push_str("// @generated by wire-gen. Do not edit by hand.\n");
  if !sources.is_empty() {
    header.push_str(&format!("// Sources: {}\n", sources.join(", ")));
  }
  if let Some(doc) = module_doc {
    header.push_str("//\n");
    for line in doc.lines() {
      if line.is_empty() {
        header.push_str("//\n");
      } else {
        header.push_str(&format!("// {}\n", line));
      }
    }
  }
  header
}
