//! Settable variable values.
//!
//! Every declared variable carries a boxed [`Value`]: the capability to parse
//! one raw textual occurrence and apply it to the variable's typed storage.
//! Scalars replace on every occurrence, lists accumulate. No runtime type
//! inspection is involved; the parse function is fixed at declaration time.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

/// Shared, typed read-back of a variable's storage.
///
/// Handles are returned when a variable is declared. They stay valid for the
/// lifetime of the registry and may be cloned freely, e.g. to let a
/// subcommand read a parent's `--config` value after the parent resolved.
#[derive(Debug, Default)]
pub struct Handle<T>(Arc<RwLock<T>>);

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Handle(Arc::clone(&self.0))
    }
}

impl<T> Handle<T> {
    /// A standalone handle, for building a custom [`Scalar`] or [`List`].
    pub fn new(value: T) -> Self {
        Handle(Arc::new(RwLock::new(value)))
    }

    /// Borrow the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.read())
    }

    pub(crate) fn replace(&self, value: T) {
        *self.0.write() = value;
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.0.write());
    }
}

impl<T: Clone> Handle<T> {
    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.0.read().clone()
    }
}

/// Parse function turning one raw occurrence into a typed value.
pub type ParseFn<T> = Arc<dyn Fn(&str) -> Result<T, String> + Send + Sync>;

/// Render function for help output and config-file-flag lookup.
pub type RenderFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// The settable capability behind every variable.
pub trait Value: Send + Sync {
    /// Parse one occurrence and apply it: scalars replace, lists append.
    fn set(&mut self, raw: &str) -> Result<(), String>;

    /// Restore the declared default and forget earlier occurrences.
    fn reset(&mut self);

    /// The current value as text.
    fn render(&self) -> String;

    /// The declared default as text, for usage output.
    fn default_text(&self) -> String;

    /// Short type name for usage output (`string`, `int`, `duration`, ...).
    fn type_name(&self) -> &'static str;

    /// Whether a flag occurrence without a value means `true`.
    fn is_presence(&self) -> bool {
        false
    }

    /// Called at the start of every resolution pass. The current value is
    /// kept; only per-pass bookkeeping is cleared.
    fn begin_pass(&mut self) {}
}

/// A single-valued variable. Every occurrence replaces the previous value.
pub struct Scalar<T> {
    target: Handle<T>,
    default: T,
    parse: ParseFn<T>,
    render: RenderFn<T>,
    type_name: &'static str,
    presence: bool,
}

impl<T: Clone + Send + Sync + 'static> Scalar<T> {
    pub fn new(
        target: Handle<T>,
        default: T,
        type_name: &'static str,
        parse: ParseFn<T>,
        render: RenderFn<T>,
    ) -> Self {
        Self {
            target,
            default,
            parse,
            render,
            type_name,
            presence: false,
        }
    }

    /// Let a bare flag occurrence stand for `true`.
    pub fn presence(mut self) -> Self {
        self.presence = true;
        self
    }
}

impl<T: Clone + Send + Sync + 'static> Value for Scalar<T> {
    fn set(&mut self, raw: &str) -> Result<(), String> {
        let parsed = (self.parse)(raw)?;
        self.target.replace(parsed);
        Ok(())
    }

    fn reset(&mut self) {
        self.target.replace(self.default.clone());
    }

    fn render(&self) -> String {
        self.target.with(|v| (self.render)(v))
    }

    fn default_text(&self) -> String {
        (self.render)(&self.default)
    }

    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn is_presence(&self) -> bool {
        self.presence
    }
}

/// A repeatable variable. The first occurrence in a pass replaces the
/// default; later ones append. Each occurrence is split on `,`.
pub struct List<T> {
    target: Handle<Vec<T>>,
    default: Vec<T>,
    parse: ParseFn<T>,
    render: RenderFn<T>,
    type_name: &'static str,
    changed: bool,
}

impl<T: Clone + Send + Sync + 'static> List<T> {
    pub fn new(
        target: Handle<Vec<T>>,
        default: Vec<T>,
        type_name: &'static str,
        parse: ParseFn<T>,
        render: RenderFn<T>,
    ) -> Self {
        Self {
            target,
            default,
            parse,
            render,
            type_name,
            changed: false,
        }
    }

    fn render_items(&self, items: &[T]) -> String {
        let parts: Vec<String> = items.iter().map(|v| (self.render)(v)).collect();
        format!("[{}]", parts.join(","))
    }
}

impl<T: Clone + Send + Sync + 'static> Value for List<T> {
    fn set(&mut self, raw: &str) -> Result<(), String> {
        let items = raw
            .split(',')
            .map(|part| (self.parse)(part))
            .collect::<Result<Vec<T>, String>>()?;
        if self.changed {
            self.target.update(|v| v.extend(items));
        } else {
            self.target.replace(items);
            self.changed = true;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.target.replace(self.default.clone());
        self.changed = false;
    }

    fn begin_pass(&mut self) {
        self.changed = false;
    }

    fn render(&self) -> String {
        self.target.with(|items| self.render_items(items))
    }

    fn default_text(&self) -> String {
        self.render_items(&self.default)
    }

    fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// `FromStr`-based parse function with the error rendered as text.
pub fn from_str<T>() -> ParseFn<T>
where
    T: FromStr + 'static,
    T::Err: Display,
{
    Arc::new(|raw: &str| raw.parse::<T>().map_err(|e| e.to_string()))
}

/// `Display`-based render function.
pub fn display<T: Display + 'static>() -> RenderFn<T> {
    Arc::new(|v: &T| v.to_string())
}

/// Accepts `1 t T TRUE true True 0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean '{raw}'")),
    }
}

/// Parse a duration such as `300ms`, `1.5h` or `2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is
/// accepted; any other number needs a unit. Negative durations are rejected.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    if raw == "0" {
        return Ok(Duration::ZERO);
    }
    let mut rest = raw.strip_prefix('+').unwrap_or(raw);
    if rest.is_empty() {
        return Err(format!("invalid duration '{raw}'"));
    }

    let mut nanos: f64 = 0.0;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration '{raw}'"))?;
        if num_end == 0 {
            return Err(format!("invalid duration '{raw}'"));
        }
        let number: f64 = rest[..num_end]
            .parse()
            .map_err(|_| format!("invalid duration '{raw}'"))?;

        let unit_len = rest[num_end..]
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len() - num_end);
        let unit = &rest[num_end..num_end + unit_len];
        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(format!("unknown unit '{unit}' in duration '{raw}'")),
        };
        nanos += number * scale;
        rest = &rest[num_end + unit_len..];
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(format!("duration '{raw}' out of range"));
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

/// Render a duration as `1h2m3s`, the inverse of [`parse_duration`] for
/// whole seconds.
pub fn format_duration(d: &Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    if d.subsec_nanos() != 0 {
        return format!("{d:?}");
    }
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (h, m) {
        (0, 0) => format!("{s}s"),
        (0, _) => format!("{m}m{s}s"),
        _ => format!("{h}h{m}m{s}s"),
    }
}
