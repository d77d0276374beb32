//! Environment tier helpers: the injectable environment reader, the
//! variable-name-to-env-name mapping, and value splitting.

use std::collections::HashMap;
use std::ffi::OsString;

/// Read access to an environment.
///
/// The process environment is the default; tests (and embedders) can pass a
/// `HashMap<String, String>` instead of mutating real process state.
pub trait Environment: Send + Sync {
    /// Value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Every `(key, value)` pair. Used to detect undefined prefixed keys.
    fn vars(&self) -> Vec<(String, String)>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    /// Non-UTF-8 values are converted lossily, so a bad value fails to parse
    /// under its own name instead of reading as unset.
    fn get(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }

    fn vars(&self) -> Vec<(String, String)> {
        utf8_keyed(std::env::vars_os())
    }
}

/// Keep pairs whose key is valid UTF-8; values are converted lossily.
fn utf8_keyed(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Vec<(String, String)> {
    vars.into_iter()
        .filter_map(|(k, v)| {
            let k = k.into_string().ok()?;
            Some((k, v.to_string_lossy().into_owned()))
        })
        .collect()
}

impl Environment for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Environment variable name for a variable.
///
/// Upper-cases `name` and turns `-`, `.` and `/` into `_`. With a prefix the
/// result is `{PREFIX}_{NAME}`.
///
/// `("APP", "listen-addr")` → `APP_LISTEN_ADDR`; `(None, "db.url")` → `DB_URL`.
pub fn env_var_name(prefix: Option<&str>, name: &str) -> String {
    let upper: String = name
        .chars()
        .map(|c| match c {
            '-' | '.' | '/' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    match prefix {
        Some(p) => format!("{}_{upper}", p.to_ascii_uppercase()),
        None => upper,
    }
}

/// Split a raw env value on `delimiter`, or keep it whole. Pieces are not
/// trimmed.
pub fn split_value<'a>(raw: &'a str, delimiter: Option<&str>) -> Vec<&'a str> {
    match delimiter {
        Some(d) if !d.is_empty() => raw.split(d).collect(),
        _ => vec![raw],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_name() {
        assert_eq!(env_var_name(Some("TEST_PARSE"), "str"), "TEST_PARSE_STR");
    }

    #[test]
    fn separators_become_underscores() {
        assert_eq!(
            env_var_name(Some("APP"), "string-slice"),
            "APP_STRING_SLICE"
        );
        assert_eq!(env_var_name(Some("APP"), "db.url"), "APP_DB_URL");
        assert_eq!(env_var_name(Some("APP"), "a/b"), "APP_A_B");
    }

    #[test]
    fn prefix_is_uppercased() {
        assert_eq!(env_var_name(Some("app"), "port"), "APP_PORT");
    }

    #[test]
    fn no_prefix_is_bare() {
        assert_eq!(env_var_name(None, "str"), "STR");
    }

    #[test]
    fn split_without_delimiter_keeps_whole() {
        assert_eq!(split_value("one,two", None), vec!["one,two"]);
        assert_eq!(split_value("one,two", Some("")), vec!["one,two"]);
    }

    #[test]
    fn split_keeps_whitespace() {
        assert_eq!(
            split_value("one, two, three ", Some(",")),
            vec!["one", " two", " three "]
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_entries_do_not_panic() {
        use std::os::unix::ffi::OsStringExt;

        let pairs = utf8_keyed([
            (OsString::from("APP_STR"), OsString::from("ok")),
            (OsString::from("APP_JUNK"), OsString::from_vec(b"\xff\xfe".to_vec())),
            (OsString::from_vec(b"BAD\xffKEY".to_vec()), OsString::from("x")),
        ]);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("APP_STR".to_string(), "ok".to_string()));
        assert_eq!(pairs[1].0, "APP_JUNK");
        assert_eq!(pairs[1].1, "\u{fffd}\u{fffd}");
    }

    #[test]
    fn process_env_lists_without_panicking() {
        let _ = ProcessEnv.vars();
        assert_eq!(ProcessEnv.get("FLAGTIER_SURELY_UNSET_VARIABLE"), None);
    }

    #[test]
    fn hashmap_environment() {
        let mut env = HashMap::new();
        env.insert("A".to_string(), "1".to_string());
        assert_eq!(Environment::get(&env, "A").as_deref(), Some("1"));
        assert_eq!(Environment::get(&env, "B"), None);
        assert_eq!(env.vars().len(), 1);
    }
}
