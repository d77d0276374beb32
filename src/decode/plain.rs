//! The plain `key value` line format.

use crate::decode::ConfigDecoder;
use crate::error::DecodeError;

/// Line-oriented `key value` config files.
///
/// ```text
/// # comment
/// str   i am the very model of a modern major general
/// int   99   # trailing comment
/// bool
/// url   http://host/#fragment-is-literal
/// ```
///
/// Per line, after trimming: blank lines and lines starting with `#` are
/// skipped. The key runs to the first whitespace; the rest of the line,
/// trimmed, is the value. A `#` preceded by whitespace starts a comment; a
/// `#` inside a token (`bar#baz`) is literal. A key with no value (or only a
/// comment) is a presence key and reads as `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDecoder;

impl ConfigDecoder for PlainDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, String)>, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        let mut pairs = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, rest) = match line.find(char::is_whitespace) {
                Some(i) => line.split_at(i),
                None => (line, ""),
            };
            let value = strip_comment(rest).trim();
            let value = if value.is_empty() { "true" } else { value };
            pairs.push((key.to_string(), value.to_string()));
        }
        Ok(pairs)
    }
}

/// Cut `rest` at the first `#` that follows whitespace. `rest` starts with
/// the whitespace after the key, so a value that opens with `#` is a comment.
fn strip_comment(rest: &str) -> &str {
    let mut prev_ws = false;
    for (i, c) in rest.char_indices() {
        if c == '#' && prev_ws {
            return &rest[..i];
        }
        prev_ws = c.is_whitespace();
    }
    rest
}
