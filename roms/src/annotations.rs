//! Disassembly annotation files (spec.md §6: `annotations_cpu{1,2,3}`,
//! "Paths to `ADDR: bytes ; comment` disassembly annotation files").
//!
//! The format isn't otherwise specified; this is a small, line-oriented
//! parser: `ADDR: bytes ; comment`, where `bytes` is whitespace-
//! separated hex and `; comment` is optional.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub bytes: Vec<u8>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationParseError {
    pub line_number: usize,
    pub line: String,
}

impl fmt::Display for AnnotationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed annotation at line {}: {:?}",
            self.line_number, self.line
        )
    }
}

impl std::error::Error for AnnotationParseError {}

/// Parse a full annotation file's text into an address-keyed map.
/// Blank lines and lines starting with `;` are skipped.
pub fn parse_annotations(text: &str) -> Result<BTreeMap<u16, Annotation>, AnnotationParseError> {
    let mut out = BTreeMap::new();
    for (i, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        let err = || AnnotationParseError {
            line_number: i + 1,
            line: raw_line.to_string(),
        };

        let (addr_part, rest) = line.split_once(':').ok_or_else(err)?;
        let addr = u16::from_str_radix(addr_part.trim(), 16).map_err(|_| err())?;

        let (bytes_part, comment) = match rest.split_once(';') {
            Some((b, c)) => (b, Some(c.trim().to_string())),
            None => (rest, None),
        };

        let mut bytes = Vec::new();
        for tok in bytes_part.split_whitespace() {
            bytes.push(u8::from_str_radix(tok, 16).map_err(|_| err())?);
        }
        if bytes.is_empty() {
            return Err(err());
        }

        out.insert(addr, Annotation { bytes, comment });
    }
    Ok(out)
}
