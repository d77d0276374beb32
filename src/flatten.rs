//! Flatten nested config documents into delimited key-value pairs.
//!
//! Structured decoders walk their own value trees and report leaves here:
//! `{database = {url = "pg://"}}` → `[("database.url", "pg://")]`. Arrays of
//! scalars produce one pair per element under the same key, so a list
//! variable accumulates them and a scalar keeps the last.

use crate::error::DecodeError;

/// Collects `(key, value)` pairs in document order.
pub struct Flattener<'a> {
    delimiter: &'a str,
    pairs: Vec<(String, String)>,
}

impl<'a> Flattener<'a> {
    pub fn new(delimiter: &'a str) -> Self {
        Self {
            delimiter,
            pairs: Vec::new(),
        }
    }

    /// Key for `segment` nested under `prefix`.
    pub fn join(&self, prefix: &str, segment: &str) -> String {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{prefix}{}{segment}", self.delimiter)
        }
    }

    pub fn push(&mut self, key: &str, value: String) {
        self.pairs.push((key.to_string(), value));
    }

    pub fn finish(self) -> Vec<(String, String)> {
        self.pairs
    }
}

/// The error for a value shape that has no flat textual form.
pub fn unsupported(key: &str, kind: &'static str) -> DecodeError {
    DecodeError::Unsupported {
        key: key.to_string(),
        kind,
    }
}

/// True when the document has nothing but whitespace.
pub fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| b.is_ascii_whitespace())
}
