use toml::{Table, Value};

use crate::decode::{ConfigDecoder, DEFAULT_DELIMITER};
use crate::error::DecodeError;
use crate::flatten::{Flattener, unsupported};

/// TOML config files. Tables flatten into delimited keys:
/// `[database] url = "pg://"` yields `("database.url", "pg://")`.
#[derive(Debug, Clone)]
pub struct TomlDecoder {
    delimiter: String,
}

impl TomlDecoder {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Join nested table keys with `delimiter` instead of `.`.
    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }
}

impl Default for TomlDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDecoder for TomlDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, String)>, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        let table: Table = toml::from_str(text)?;
        let mut out = Flattener::new(&self.delimiter);
        walk_table(&mut out, "", &table)?;
        Ok(out.finish())
    }
}

fn walk_table(out: &mut Flattener<'_>, prefix: &str, table: &Table) -> Result<(), DecodeError> {
    for (segment, value) in table {
        let key = out.join(prefix, segment);
        match value {
            Value::Table(inner) => walk_table(out, &key, inner)?,
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
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(d) => Ok(d.to_string()),
        Value::Array(_) => Err(unsupported(key, "nested array")),
        Value::Table(_) => Err(unsupported(key, "table-in-array")),
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

    const TABLES: &str = r#"
[string]
key = "a string"

[float.nested]
key = 1.23

[strings.nested]
key = ["one", "two", "three"]
"#;

    #[test]
    fn empty_document() {
        assert!(TomlDecoder::new().decode(b"").unwrap().is_empty());
    }

    #[test]
    fn basic_pairs() {
        let pairs = TomlDecoder::new()
            .decode(
                r#"
s = "s"
i = 10
f = 3.14e10
b = true
d = "5s"
x = ["1", "a", "👍"]
"#
                .as_bytes(),
            )
            .unwrap();
        assert_eq!(values(&pairs, "s"), vec!["s"]);
        assert_eq!(values(&pairs, "i"), vec!["10"]);
        assert_eq!(values(&pairs, "f")[0].parse::<f64>().unwrap(), 3.14e10);
        assert_eq!(values(&pairs, "b"), vec!["true"]);
        assert_eq!(values(&pairs, "d"), vec!["5s"]);
        assert_eq!(values(&pairs, "x"), vec!["1", "a", "👍"]);
    }

    #[test]
    fn nested_tables_use_default_delimiter() {
        let pairs = TomlDecoder::new().decode(TABLES.as_bytes()).unwrap();
        assert_eq!(values(&pairs, "string.key"), vec!["a string"]);
        assert_eq!(values(&pairs, "float.nested.key"), vec!["1.23"]);
        assert_eq!(
            values(&pairs, "strings.nested.key"),
            vec!["one", "two", "three"]
        );
    }

    #[test]
    fn pairs_keep_document_order() {
        let pairs = TomlDecoder::new()
            .decode(b"zeta = 1\nalpha = 2\n[mid]\nb = 3\na = 4\n")
            .unwrap();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid.b", "mid.a"]);
    }

    #[test]
    fn custom_delimiter() {
        let pairs = TomlDecoder::new()
            .with_delimiter("-")
            .decode(TABLES.as_bytes())
            .unwrap();
        assert_eq!(values(&pairs, "string-key"), vec!["a string"]);
        assert_eq!(values(&pairs, "float-nested-key"), vec!["1.23"]);
        assert_eq!(values(&pairs, "strings-nested-key").len(), 3);
    }

    #[test]
    fn datetime_keeps_text_form() {
        let pairs = TomlDecoder::new()
            .decode(b"when = 1979-05-27T07:32:00Z\n")
            .unwrap();
        assert_eq!(values(&pairs, "when"), vec!["1979-05-27T07:32:00Z"]);
    }

    #[test]
    fn malformed_document() {
        let err = TomlDecoder::new().decode(b"{ = 1\n").unwrap_err();
        assert!(matches!(err, DecodeError::Toml(_)));
    }

    #[test]
    fn array_of_tables_is_unsupported() {
        let err = TomlDecoder::new()
            .decode(b"[[servers]]\nhost = \"a\"\n")
            .unwrap_err();
        assert!(matches!(err, DecodeError::Unsupported { ref key, .. } if key == "servers"));
    }
}
