//! The variable registry: declared variables, their typed handles, and the
//! per-pass record of which tier set each one.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ResolveError;
use crate::types::Source;
use crate::value::{self, Handle, List, Scalar, Value};

/// One declared variable.
pub struct Variable {
    name: String,
    alias: Option<char>,
    usage: String,
    value: Box<dyn Value>,
    source: Option<Source>,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<char> {
        self.alias
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Tier that set this variable in the current pass, if any.
    pub fn source(&self) -> Option<Source> {
        self.source
    }

    /// Current value as text.
    pub fn render(&self) -> String {
        self.value.render()
    }

    pub fn default_text(&self) -> String {
        self.value.default_text()
    }

    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }

    pub fn is_presence(&self) -> bool {
        self.value.is_presence()
    }
}

/// An ordered set of declared variables, indexed by name and alias.
///
/// Declaration order is kept for usage output; it has no effect on
/// resolution. Declaring a name or alias twice panics.
///
/// ```ignore
/// let mut registry = Registry::new("myapp");
/// let port = registry.int("port", Some('p'), 8080, "listen port");
/// let tags = registry.string_list("tag", None, &[], "repeatable tag");
/// flagtier::resolve(&mut registry, std::env::args().skip(1), &Options::new())?;
/// println!("{} {:?}", port.get(), tags.get());
/// ```
pub struct Registry {
    name: String,
    vars: Vec<Variable>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<char, usize>,
}

impl Registry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vars: Vec::new(),
            by_name: HashMap::new(),
            by_alias: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter()
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.position(name).map(|idx| &self.vars[idx])
    }

    /// Look up a variable by its single-character alias.
    pub fn get_alias(&self, alias: char) -> Option<&Variable> {
        self.by_alias.get(&alias).map(|&idx| &self.vars[idx])
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn at(&self, idx: usize) -> &Variable {
        &self.vars[idx]
    }

    /// Declare a variable backed by an arbitrary [`Value`].
    pub fn declare(
        &mut self,
        name: &str,
        alias: Option<char>,
        usage: &str,
        value: Box<dyn Value>,
    ) {
        assert!(
            is_valid_name(name),
            "flagtier: invalid variable name '{name}' in '{}'",
            self.name
        );
        assert!(
            !self.by_name.contains_key(name),
            "flagtier: variable '{name}' declared twice in '{}'",
            self.name
        );
        let idx = self.vars.len();
        if let Some(a) = alias {
            assert!(
                a.is_alphanumeric() && !self.by_alias.contains_key(&a),
                "flagtier: alias '{a}' for '{name}' is invalid or taken in '{}'",
                self.name
            );
            self.by_alias.insert(a, idx);
        }
        self.by_name.insert(name.to_string(), idx);
        self.vars.push(Variable {
            name: name.to_string(),
            alias,
            usage: usage.to_string(),
            value,
            source: None,
        });
    }

    /// Declare a scalar variable with a custom parse function.
    pub fn scalar<T, P>(
        &mut self,
        name: &str,
        alias: Option<char>,
        default: T,
        usage: &str,
        parse: P,
    ) -> Handle<T>
    where
        T: Clone + Display + Send + Sync + 'static,
        P: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        let handle = Handle::new(default.clone());
        let scalar = Scalar::new(
            handle.clone(),
            default,
            "value",
            Arc::new(parse),
            value::display(),
        );
        self.declare(name, alias, usage, Box::new(scalar));
        handle
    }

    /// Declare a repeatable variable with a custom per-item parse function.
    pub fn list<T, P>(
        &mut self,
        name: &str,
        alias: Option<char>,
        default: Vec<T>,
        usage: &str,
        parse: P,
    ) -> Handle<Vec<T>>
    where
        T: Clone + Display + Send + Sync + 'static,
        P: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        let handle = Handle::new(default.clone());
        let list = List::new(
            handle.clone(),
            default,
            "values",
            Arc::new(parse),
            value::display(),
        );
        self.declare(name, alias, usage, Box::new(list));
        handle
    }

    pub fn string(
        &mut self,
        name: &str,
        alias: Option<char>,
        default: &str,
        usage: &str,
    ) -> Handle<String> {
        self.from_str_scalar(name, alias, default.to_string(), usage, "string")
    }

    pub fn int(&mut self, name: &str, alias: Option<char>, default: i64, usage: &str) -> Handle<i64> {
        self.from_str_scalar(name, alias, default, usage, "int")
    }

    pub fn uint(&mut self, name: &str, alias: Option<char>, default: u64, usage: &str) -> Handle<u64> {
        self.from_str_scalar(name, alias, default, usage, "uint")
    }

    pub fn float(&mut self, name: &str, alias: Option<char>, default: f64, usage: &str) -> Handle<f64> {
        self.from_str_scalar(name, alias, default, usage, "float")
    }

    /// Declare a boolean. A bare `--name` (or `-a`) occurrence means `true`.
    pub fn bool(&mut self, name: &str, alias: Option<char>, default: bool, usage: &str) -> Handle<bool> {
        let handle = Handle::new(default);
        let scalar = Scalar::new(
            handle.clone(),
            default,
            "bool",
            Arc::new(value::parse_bool),
            value::display(),
        )
        .presence();
        self.declare(name, alias, usage, Box::new(scalar));
        handle
    }

    /// Declare a duration, written like `90s`, `1h30m` or `250ms`.
    pub fn duration(
        &mut self,
        name: &str,
        alias: Option<char>,
        default: Duration,
        usage: &str,
    ) -> Handle<Duration> {
        let handle = Handle::new(default);
        let scalar = Scalar::new(
            handle.clone(),
            default,
            "duration",
            Arc::new(value::parse_duration),
            Arc::new(value::format_duration),
        );
        self.declare(name, alias, usage, Box::new(scalar));
        handle
    }

    /// Declare a repeatable string list. Occurrences accumulate; each one is
    /// also split on commas.
    pub fn string_list(
        &mut self,
        name: &str,
        alias: Option<char>,
        default: &[&str],
        usage: &str,
    ) -> Handle<Vec<String>> {
        let default = default.iter().map(|s| s.to_string()).collect();
        self.from_str_list(name, alias, default, usage, "strings")
    }

    pub fn int_list(
        &mut self,
        name: &str,
        alias: Option<char>,
        default: &[i64],
        usage: &str,
    ) -> Handle<Vec<i64>> {
        self.from_str_list(name, alias, default.to_vec(), usage, "ints")
    }

    fn from_str_scalar<T>(
        &mut self,
        name: &str,
        alias: Option<char>,
        default: T,
        usage: &str,
        type_name: &'static str,
    ) -> Handle<T>
    where
        T: Clone + Display + FromStr + Send + Sync + 'static,
        T::Err: Display,
    {
        let handle = Handle::new(default.clone());
        let scalar = Scalar::new(
            handle.clone(),
            default,
            type_name,
            value::from_str(),
            value::display(),
        );
        self.declare(name, alias, usage, Box::new(scalar));
        handle
    }

    fn from_str_list<T>(
        &mut self,
        name: &str,
        alias: Option<char>,
        default: Vec<T>,
        usage: &str,
        type_name: &'static str,
    ) -> Handle<Vec<T>>
    where
        T: Clone + Display + FromStr + Send + Sync + 'static,
        T::Err: Display,
    {
        let handle = Handle::new(default.clone());
        let list = List::new(
            handle.clone(),
            default,
            type_name,
            value::from_str(),
            value::display(),
        );
        self.declare(name, alias, usage, Box::new(list));
        handle
    }

    /// Apply one raw occurrence from `origin` to the variable at `idx`.
    pub(crate) fn apply(&mut self, idx: usize, raw: &str, origin: Source) -> Result<(), ResolveError> {
        let var = &mut self.vars[idx];
        var.value
            .set(raw)
            .map_err(|reason| ResolveError::InvalidValue {
                name: var.name.clone(),
                value: raw.to_string(),
                origin,
                reason,
            })?;
        var.source = Some(origin);
        Ok(())
    }

    /// Restore the default of the variable at `idx` ahead of a higher tier.
    pub(crate) fn reset(&mut self, idx: usize) {
        self.vars[idx].value.reset();
    }

    /// Forget provenance from any previous pass.
    pub(crate) fn clear_sources(&mut self) {
        for var in &mut self.vars {
            var.source = None;
            var.value.begin_pass();
        }
    }

    /// `(name, source)` for every variable set in the current pass.
    pub(crate) fn provenance(&self) -> Vec<(String, Source)> {
        self.vars
            .iter()
            .filter_map(|v| v.source.map(|s| (v.name.clone(), s)))
            .collect()
    }

    /// One help line per variable, in declaration order:
    /// `-p, --port int   listen port (default: 8080)`.
    pub fn flag_lines(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|v| {
                let mut spec = match v.alias {
                    Some(a) => format!("-{a}, --{}", v.name),
                    None => format!("    --{}", v.name),
                };
                if !v.is_presence() {
                    spec.push(' ');
                    spec.push_str(v.type_name());
                }
                let default = v.default_text();
                let help = if default.is_empty() || default == "[]" {
                    v.usage.clone()
                } else {
                    format!("{} (default: {default})", v.usage)
                };
                (spec, help)
            })
            .collect()
    }
}

/// Names must be usable as `--name` and as config keys.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.chars().any(|c| c.is_whitespace() || c == '=')
}
