//! Config file decoders.
//!
//! A decoder turns raw file bytes into an ordered list of `(key, value)`
//! pairs. The engine matches each key against variable names and feeds the
//! value through the variable's parse function, so decoders never need to
//! know variable types. Any closure with the right signature is a decoder:
//!
//! ```ignore
//! let options = Options::new()
//!     .config_file("app.ini")
//!     .decoder(|bytes: &[u8]| -> Result<Vec<(String, String)>, DecodeError> {
//!         my_ini::parse(bytes).map_err(DecodeError::other)
//!     });
//! ```
//!
//! Shipped decoders:
//!
//! | Decoder | Format |
//! |---------|--------|
//! | [`PlainDecoder`] | `key value` lines with `#` comments |
//! | [`TomlDecoder`] | TOML, tables flattened with a delimiter |
//! | [`YamlDecoder`] | YAML (feature `yaml`), maps flattened with a delimiter |
//! | [`JsonDecoder`] | JSON, objects flattened with a delimiter |

mod json_file;
mod plain;
mod toml_file;
#[cfg(feature = "yaml")]
mod yaml_file;

pub use json_file::JsonDecoder;
pub use plain::PlainDecoder;
pub use toml_file::TomlDecoder;
#[cfg(feature = "yaml")]
pub use yaml_file::YamlDecoder;

use crate::error::DecodeError;

/// Default delimiter between nested key segments.
pub const DEFAULT_DELIMITER: &str = ".";

/// Turns config file bytes into ordered `(key, value)` pairs.
pub trait ConfigDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, String)>, DecodeError>;
}

impl<F> ConfigDecoder for F
where
    F: Fn(&[u8]) -> Result<Vec<(String, String)>, DecodeError> + Send + Sync,
{
    fn decode(&self, bytes: &[u8]) -> Result<Vec<(String, String)>, DecodeError> {
        self(bytes)
    }
}
