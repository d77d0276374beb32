use serde_yaml::{Mapping, Value};

use crate::decode::{ConfigDecoder, DEFAULT_DELIMITER};
use crate::error::DecodeError;
use crate::flatten::{Flattener, is_blank, unsupported};

/// YAML config files. Nested mappings flatten into delimited keys, sequences
/// yield one pair per element, and tags are looked through. Null values are
/// rejected rather than guessed at.
#[derive(Debug, Clone)]
pub struct YamlDecoder {
    delimiter: String,
}

impl YamlDecoder {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Join nested mapping keys with `delimiter` instead of `.`.
    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }
}

impl Default for YamlDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDecoder for YamlDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, String)>, DecodeError> {
        if is_blank(bytes) || is_comment_only(bytes) {
            return Ok(Vec::new());
        }
        let root: Value = serde_yaml::from_slice(bytes)?;
        let mut out = Flattener::new(&self.delimiter);
        match root {
            Value::Null => {}
            Value::Mapping(mapping) => walk_mapping(&mut out, "", &mapping)?,
            _ => return Err(unsupported("", "non-mapping document")),
        }
        Ok(out.finish())
    }
}

fn is_comment_only(bytes: &[u8]) -> bool {
    String::from_utf8_lossy(bytes).lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

fn walk_mapping(out: &mut Flattener<'_>, prefix: &str, mapping: &Mapping) -> Result<(), DecodeError> {
    for (segment, value) in mapping {
        let segment = key_text(prefix, segment)?;
        let key = out.join(prefix, &segment);
        walk_value(out, &key, value)?;
    }
    Ok(())
}

fn walk_value(out: &mut Flattener<'_>, key: &str, value: &Value) -> Result<(), DecodeError> {
    match value {
        Value::Mapping(inner) => walk_mapping(out, key, inner),
        Value::Sequence(items) => {
            for item in items {
                out.push(key, scalar(key, item)?);
            }
            Ok(())
        }
        Value::Tagged(tagged) => walk_value(out, key, &tagged.value),
        other => {
            out.push(key, scalar(key, other)?);
            Ok(())
        }
    }
}

fn key_text(prefix: &str, key: &Value) -> Result<String, DecodeError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(unsupported(prefix, "non-scalar key")),
    }
}

fn scalar(key: &str, value: &Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Tagged(tagged) => scalar(key, &tagged.value),
        Value::Null => Err(unsupported(key, "null")),
        Value::Sequence(_) => Err(unsupported(key, "nested sequence")),
        Value::Mapping(_) => Err(unsupported(key, "mapping-in-sequence")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(pairs: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn decode(text: &str) -> Vec<(String, String)> {
        YamlDecoder::new().decode(text.as_bytes()).unwrap()
    }

    #[test]
    fn empty_inputs() {
        assert!(decode("").is_empty());
        assert!(decode("# only a comment\n").is_empty());
    }

    #[test]
    fn basic_pairs() {
        let pairs = decode("s: hello\ni: 10\nb: true\nd: 5s\nf: 3.14\n");
        assert_eq!(values(&pairs, "s"), vec!["hello"]);
        assert_eq!(values(&pairs, "i"), vec!["10"]);
        assert_eq!(values(&pairs, "b"), vec!["true"]);
        assert_eq!(values(&pairs, "d"), vec!["5s"]);
        assert_eq!(values(&pairs, "f"), vec!["3.14"]);
    }

    #[test]
    fn flow_and_block_sequences() {
        let pairs = decode("s: [a, b, c]\nx:\n  - d\n  - e\n  - f\n");
        assert_eq!(values(&pairs, "s"), vec!["a", "b", "c"]);
        assert_eq!(values(&pairs, "x"), vec!["d", "e", "f"]);
    }

    #[test]
    fn quoted_strings_with_spaces() {
        let pairs = decode("x:\n  - \"first string\"\n  - 'second string'\n  - third\n");
        assert_eq!(values(&pairs, "x"), vec!["first string", "second string", "third"]);
    }

    #[test]
    fn nested_mappings() {
        let pairs = decode("db:\n  url: pg://\n  pool:\n    size: 5\n");
        assert_eq!(values(&pairs, "db.url"), vec!["pg://"]);
        assert_eq!(values(&pairs, "db.pool.size"), vec!["5"]);

        let pairs = YamlDecoder::new()
            .with_delimiter("-")
            .decode(b"db:\n  url: pg://\n")
            .unwrap();
        assert_eq!(values(&pairs, "db-url"), vec!["pg://"]);
    }

    #[test]
    fn pairs_keep_document_order() {
        let pairs = decode("zeta: 1\nalpha: 2\nmid:\n  b: 3\n  a: 4\n");
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid.b", "mid.a"]);
    }

    #[test]
    fn missing_value_is_unsupported() {
        let err = YamlDecoder::new().decode(b"s:\n").unwrap_err();
        assert!(matches!(err, DecodeError::Unsupported { ref key, kind: "null" } if key == "s"));
    }

    #[test]
    fn malformed_document() {
        let err = YamlDecoder::new().decode(b"@s: x\n").unwrap_err();
        match err {
            DecodeError::Yaml(e) => {
                assert!(e.to_string().contains("cannot start any token"), "{e}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
