use serde_json::{Map, Value};

use crate::decode::{ConfigDecoder, DEFAULT_DELIMITER};
use crate::error::DecodeError;
use crate::flatten::{Flattener, is_blank, unsupported};

/// JSON config files. The document must be an object; nested objects
/// flatten into delimited keys and arrays yield one pair per element.
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    delimiter: String,
}

impl JsonDecoder {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Join nested object keys with `delimiter` instead of `.`.
    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDecoder for JsonDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, String)>, DecodeError> {
        if is_blank(bytes) {
            return Ok(Vec::new());
        }
        let root: Value = serde_json::from_slice(bytes)?;
        let Value::Object(object) = root else {
            return Err(unsupported("", "non-object document"));
        };
        let mut out = Flattener::new(&self.delimiter);
        walk_object(&mut out, "", &object)?;
        Ok(out.finish())
    }
}

fn walk_object(
    out: &mut Flattener<'_>,
    prefix: &str,
    object: &Map<String, Value>,
) -> Result<(), DecodeError> {
    for (segment, value) in object {
        let key = out.join(prefix, segment);
        match value {
            Value::Object(inner) => walk_object(out, &key, inner)?,
            Value::Array(items) => {
                for item in items {
                    out.push(&key, scalar(&key, item)?);
                }
            }
            other => out.push(&key, scalar(&key, other)?),
        }
    }
    Ok(())
}

fn scalar(key: &str, value: &Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(unsupported(key, "null")),
        Value::Array(_) => Err(unsupported(key, "nested array")),
        Value::Object(_) => Err(unsupported(key, "object-in-array")),
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

    #[test]
    fn empty_inputs() {
        assert!(JsonDecoder::new().decode(b"").unwrap().is_empty());
        assert!(JsonDecoder::new().decode(b"{}").unwrap().is_empty());
    }

    #[test]
    fn basic_pairs() {
        let pairs = JsonDecoder::new()
            .decode(br#"{"s": "s", "i": 10, "b": true, "d": "5s"}"#)
            .unwrap();
        assert_eq!(values(&pairs, "s"), vec!["s"]);
        assert_eq!(values(&pairs, "i"), vec!["10"]);
        assert_eq!(values(&pairs, "b"), vec!["true"]);
        assert_eq!(values(&pairs, "d"), vec!["5s"]);
    }

    #[test]
    fn value_arrays() {
        let pairs = JsonDecoder::new()
            .decode(r#"{"s": ["aa", "bb"], "x": ["a", "B", "👍"]}"#.as_bytes())
            .unwrap();
        assert_eq!(values(&pairs, "s"), vec!["aa", "bb"]);
        assert_eq!(values(&pairs, "x"), vec!["a", "B", "👍"]);
    }

    #[test]
    fn nested_objects() {
        let doc = br#"{"db": {"url": "pg://", "pool": {"size": 5}}}"#;
        let pairs = JsonDecoder::new().decode(doc).unwrap();
        assert_eq!(values(&pairs, "db.url"), vec!["pg://"]);
        assert_eq!(values(&pairs, "db.pool.size"), vec!["5"]);

        let pairs = JsonDecoder::new().with_delimiter("_").decode(doc).unwrap();
        assert_eq!(values(&pairs, "db_pool_size"), vec!["5"]);
    }

    #[test]
    fn pairs_keep_document_order() {
        let pairs = JsonDecoder::new()
            .decode(br#"{"zeta": 1, "alpha": 2, "mid": {"b": 3, "a": 4}}"#)
            .unwrap();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid.b", "mid.a"]);
    }

    #[test]
    fn truncated_document() {
        let err = JsonDecoder::new().decode(br#"{"s": "s""#).unwrap_err();
        match err {
            DecodeError::Json(e) => assert!(e.is_eof()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_is_unsupported() {
        let err = JsonDecoder::new().decode(br#"{"s": null}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Unsupported { ref key, kind: "null" } if key == "s"));
    }

    #[test]
    fn top_level_array_is_unsupported() {
        let err = JsonDecoder::new().decode(b"[1, 2]").unwrap_err();
        assert!(matches!(err, DecodeError::Unsupported { .. }));
    }
}
