use std::path::PathBuf;

use thiserror::Error;

use crate::types::Source;

/// Errors from a single resolution pass.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Malformed or unknown command-line flag.
    #[error(transparent)]
    Flags(#[from] clap::Error),

    #[error("Invalid value '{value}' for '{name}' from {origin}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        origin: Source,
        reason: String,
    },

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: DecodeError,
    },

    #[error("Undefined key '{key}' in {origin}")]
    UndefinedKey { key: String, origin: Source },

    #[error("Config file flag '{0}' is not declared; declare it before resolving")]
    ConfigFileFlagNotDeclared(String),
}

/// Errors reported by a [`ConfigDecoder`](crate::ConfigDecoder).
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[cfg(feature = "yaml")]
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("unsupported {kind} value for key '{key}'")]
    Unsupported { key: String, kind: &'static str },

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl DecodeError {
    /// Wrap an arbitrary error from a custom decoder.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        DecodeError::Other(err.into())
    }
}

/// Errors from parsing or running a [`Command`](crate::Command) tree.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{command}: {source}")]
    Resolve {
        command: String,
        source: ResolveError,
    },

    #[error("{}", no_such_command(.command, .requested.as_deref()))]
    NoSuchCommand {
        command: String,
        requested: Option<String>,
    },

    #[error("Command '{0}' was not parsed; call parse() before run()")]
    NotParsed(String),

    #[error("Cancelled before running '{0}'")]
    Cancelled(String),

    #[error(transparent)]
    Exec(#[from] anyhow::Error),
}

fn no_such_command(command: &str, requested: Option<&str>) -> String {
    match requested {
        Some(name) => format!("No such command '{name}' under '{command}'"),
        None => format!("No such command: '{command}' has no action and no subcommand was given"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_formats_correctly() {
        let err = ResolveError::InvalidValue {
            name: "int".into(),
            value: "abc".into(),
            origin: Source::Env,
            reason: "invalid digit found in string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("int"));
        assert!(msg.contains("abc"));
        assert!(msg.contains("environment"));
    }

    #[test]
    fn undefined_key_names_key_and_tier() {
        let err = ResolveError::UndefinedKey {
            key: "undefined".into(),
            origin: Source::ConfigFile,
        };
        assert_eq!(err.to_string(), "Undefined key 'undefined' in config file");
    }

    #[test]
    fn decode_error_keeps_underlying_source() {
        let inner = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ResolveError::Decode {
            path: "bad.json".into(),
            source: DecodeError::Json(inner),
        };
        assert!(err.to_string().contains("bad.json"));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("EOF"));
    }

    #[test]
    fn no_such_command_names_request() {
        let err = CommandError::NoSuchCommand {
            command: "root".into(),
            requested: Some("frobnicate".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("frobnicate"));
        assert!(msg.contains("root"));
    }

    #[test]
    fn no_such_command_without_request() {
        let err = CommandError::NoSuchCommand {
            command: "root".into(),
            requested: None,
        };
        assert!(err.to_string().contains("no action"));
    }

    #[test]
    fn not_parsed_points_at_parse() {
        let err = CommandError::NotParsed("root".into());
        assert!(err.to_string().contains("parse()"));
    }
}
