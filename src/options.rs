//! Per-call resolution options: where the config file comes from, how it is
//! decoded, and how the environment tier is named and split.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::decode::ConfigDecoder;
use crate::env::{Environment, ProcessEnv};
use crate::value::Handle;

/// Parameters for one resolution pass.
///
/// Built with chained setters and then passed by reference to
/// [`resolve`](crate::resolve), which never changes them.
///
/// ```ignore
/// let options = Options::new()
///     .config_file_flag("config")
///     .decoder(TomlDecoder::new())
///     .allow_missing_config_file(true)
///     .env_prefix("MYAPP")
///     .env_split(",");
/// ```
#[derive(Clone, Default)]
pub struct Options {
    config_file: Option<PathBuf>,
    config_file_flag: Option<String>,
    config_file_via: Option<Handle<String>>,
    decoder: Option<Arc<dyn ConfigDecoder>>,
    allow_missing_config_file: bool,
    env_prefix: Option<String>,
    env_no_prefix: bool,
    env_split: Option<String>,
    ignore_undefined: bool,
    environment: Option<Arc<dyn Environment>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this config file (lowest-priority path source).
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Take the config file path from the named variable of the same
    /// registry, read after flags are applied. A non-empty value overrides
    /// [`config_file_via`](Self::config_file_via) and
    /// [`config_file`](Self::config_file).
    pub fn config_file_flag(mut self, name: &str) -> Self {
        self.config_file_flag = Some(name.to_string());
        self
    }

    /// Take the config file path from a handle, typically a parent command's
    /// `--config` variable. A non-empty value overrides
    /// [`config_file`](Self::config_file).
    pub fn config_file_via(mut self, handle: Handle<String>) -> Self {
        self.config_file_via = Some(handle);
        self
    }

    /// Decoder for the config file. Without one the config file tier is
    /// skipped.
    pub fn decoder(mut self, decoder: impl ConfigDecoder + 'static) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    /// Treat a missing config file as empty instead of failing.
    pub fn allow_missing_config_file(mut self, allow: bool) -> Self {
        self.allow_missing_config_file = allow;
        self
    }

    /// Enable the environment tier with `{PREFIX}_{NAME}` variables.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Enable the environment tier with bare `{NAME}` variables. Takes
    /// precedence over [`env_prefix`](Self::env_prefix).
    pub fn env_no_prefix(mut self) -> Self {
        self.env_no_prefix = true;
        self
    }

    /// Split env values on `delimiter` and apply each piece in order.
    pub fn env_split(mut self, delimiter: &str) -> Self {
        self.env_split = Some(delimiter.to_string());
        self
    }

    /// Skip config keys and prefixed env vars that match no variable instead
    /// of failing.
    pub fn ignore_undefined(mut self, ignore: bool) -> Self {
        self.ignore_undefined = ignore;
        self
    }

    /// Read the environment from `env` instead of the process environment.
    pub fn environment(mut self, env: impl Environment + 'static) -> Self {
        self.environment = Some(Arc::new(env));
        self
    }

    pub(crate) fn static_config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub(crate) fn config_file_flag_name(&self) -> Option<&str> {
        self.config_file_flag.as_deref()
    }

    pub(crate) fn config_file_via_handle(&self) -> Option<&Handle<String>> {
        self.config_file_via.as_ref()
    }

    pub(crate) fn config_decoder(&self) -> Option<&dyn ConfigDecoder> {
        self.decoder.as_deref()
    }

    pub(crate) fn allows_missing_config_file(&self) -> bool {
        self.allow_missing_config_file
    }

    pub(crate) fn ignores_undefined(&self) -> bool {
        self.ignore_undefined
    }

    pub(crate) fn env_split_delimiter(&self) -> Option<&str> {
        self.env_split.as_deref()
    }

    /// `None` when the env tier is off, `Some(None)` for no-prefix mode.
    pub(crate) fn env_mode(&self) -> Option<Option<&str>> {
        if self.env_no_prefix {
            Some(None)
        } else {
            self.env_prefix.as_deref().map(Some)
        }
    }

    pub(crate) fn env_reader(&self) -> &dyn Environment {
        match &self.environment {
            Some(env) => env.as_ref(),
            None => &ProcessEnv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::PlainDecoder;
    use crate::fixtures::test::env;

    #[test]
    fn defaults_disable_everything_optional() {
        let options = Options::new();
        assert!(options.static_config_file().is_none());
        assert!(options.config_decoder().is_none());
        assert!(!options.allows_missing_config_file());
        assert!(!options.ignores_undefined());
        assert_eq!(options.env_mode(), None);
    }

    #[test]
    fn env_prefix_enables_env_tier() {
        let options = Options::new().env_prefix("APP");
        assert_eq!(options.env_mode(), Some(Some("APP")));
    }

    #[test]
    fn no_prefix_wins_over_prefix() {
        let options = Options::new().env_prefix("APP").env_no_prefix();
        assert_eq!(options.env_mode(), Some(None));
    }

    #[test]
    fn setters_are_recorded() {
        let options = Options::new()
            .config_file("app.conf")
            .config_file_flag("config")
            .decoder(PlainDecoder)
            .allow_missing_config_file(true)
            .env_split(",")
            .ignore_undefined(true)
            .environment(env(&[("A", "1")]));
        assert_eq!(options.static_config_file(), Some(Path::new("app.conf")));
        assert_eq!(options.config_file_flag_name(), Some("config"));
        assert!(options.config_decoder().is_some());
        assert!(options.allows_missing_config_file());
        assert!(options.ignores_undefined());
        assert_eq!(options.env_split_delimiter(), Some(","));
        assert_eq!(options.env_reader().get("A").as_deref(), Some("1"));
    }
}
