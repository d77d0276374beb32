//! Subcommand delegation.
//!
//! A [`Command`] owns a registry, the options used to resolve it, an optional
//! action and any number of child commands. [`Command::parse`] resolves the
//! node's own variables, then hands the leftover tokens to the child named by
//! the first one. [`Command::run`] calls the action of the deepest node
//! selected by the last parse.
//!
//! ```ignore
//! let mut root = Command::new("app").options(Options::new().env_prefix("APP"));
//! let verbose = root.registry_mut().bool("verbose", Some('v'), false, "log more");
//!
//! let mut serve = Command::new("serve").short_help("run the server");
//! let port = serve.registry_mut().int("port", Some('p'), 8080, "listen port");
//! let serve = serve.exec(move |token, _args| {
//!     run_server(port.get(), verbose.get(), token.clone())
//! });
//!
//! let mut root = root.subcommand(serve);
//! root.parse_and_run(&CancellationToken::new(), std::env::args().skip(1))?;
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CommandError;
use crate::options::Options;
use crate::registry::Registry;
use crate::resolve::resolve;
use crate::types::Resolution;

type Action = Arc<dyn Fn(&CancellationToken, &[String]) -> anyhow::Result<()> + Send + Sync>;

/// Outcome of the last [`Command::parse`] at one node.
struct Parsed {
    resolution: Resolution,
    child: Option<usize>,
}

/// One node of a command tree.
pub struct Command {
    name: String,
    short_usage: Option<String>,
    short_help: Option<String>,
    long_help: Option<String>,
    registry: Registry,
    options: Options,
    exec: Option<Action>,
    children: Vec<Command>,
    parsed: Option<Parsed>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            short_usage: None,
            short_help: None,
            long_help: None,
            registry: Registry::new(name),
            options: Options::new(),
            exec: None,
            children: Vec::new(),
            parsed: None,
        }
    }

    /// One-line synopsis, e.g. `app serve [flags] <dir>`.
    pub fn short_usage(mut self, text: &str) -> Self {
        self.short_usage = Some(text.to_string());
        self
    }

    /// Shown next to this command in its parent's subcommand list.
    pub fn short_help(mut self, text: &str) -> Self {
        self.short_help = Some(text.to_string());
        self
    }

    pub fn long_help(mut self, text: &str) -> Self {
        self.long_help = Some(text.to_string());
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Action run when this node is the one selected by parsing. It gets the
    /// dispatch token and the positional arguments left after the flags.
    pub fn exec<F>(mut self, action: F) -> Self
    where
        F: Fn(&CancellationToken, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.exec = Some(Arc::new(action));
        self
    }

    pub fn subcommand(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Declare variables on this command.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn subcommands(&self) -> &[Command] {
        &self.children
    }

    /// Result of this node's own resolution in the last parse, if it was
    /// reached.
    pub fn resolution(&self) -> Option<&Resolution> {
        self.parsed.as_ref().map(|p| &p.resolution)
    }

    /// Resolve this node, then descend into the child named by the first
    /// leftover token (ASCII case-insensitive).
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.parse_args(args)
    }

    fn parse_args(&mut self, args: Vec<String>) -> Result<(), CommandError> {
        self.parsed = None;
        let resolution =
            resolve(&mut self.registry, args, &self.options).map_err(|source| CommandError::Resolve {
                command: self.name.clone(),
                source,
            })?;

        let child = resolution.args.first().and_then(|token| {
            self.children
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(token))
        });
        let rest = match child {
            Some(_) => resolution.args[1..].to_vec(),
            None => Vec::new(),
        };
        self.parsed = Some(Parsed { resolution, child });

        if let Some(idx) = child {
            debug!(command = %self.name, subcommand = %self.children[idx].name, "descending");
            self.children[idx].parse_args(rest)?;
        }
        Ok(())
    }

    /// Run the action of the node selected by the last [`parse`](Self::parse).
    ///
    /// The token is checked before each step down the tree and handed to the
    /// action unchanged.
    pub fn run(&self, token: &CancellationToken) -> Result<(), CommandError> {
        let parsed = self
            .parsed
            .as_ref()
            .ok_or_else(|| CommandError::NotParsed(self.name.clone()))?;
        if token.is_cancelled() {
            return Err(CommandError::Cancelled(self.name.clone()));
        }
        if let Some(idx) = parsed.child {
            return self.children[idx].run(token);
        }

        let args = &parsed.resolution.args;
        let Some(action) = &self.exec else {
            return Err(CommandError::NoSuchCommand {
                command: self.name.clone(),
                requested: args.first().cloned(),
            });
        };
        debug!(command = %self.name, args = args.len(), "running");
        action(token, args)?;
        Ok(())
    }

    pub fn parse_and_run<I, S>(&mut self, token: &CancellationToken, args: I) -> Result<(), CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse(args)?;
        self.run(token)
    }

    /// Help text: synopsis, help paragraph, subcommands, flags.
    pub fn usage(&self) -> String {
        let mut out = String::new();
        let synopsis = match &self.short_usage {
            Some(text) => text.clone(),
            None => format!("{} [flags]", self.name),
        };
        let _ = writeln!(out, "USAGE\n  {synopsis}\n");

        if let Some(help) = self.long_help.as_ref().or(self.short_help.as_ref()) {
            let _ = writeln!(out, "{help}\n");
        }

        if !self.children.is_empty() {
            let _ = writeln!(out, "SUBCOMMANDS");
            let rows: Vec<(String, String)> = self
                .children
                .iter()
                .map(|c| (c.name.clone(), c.short_help.clone().unwrap_or_default()))
                .collect();
            write_rows(&mut out, &rows);
            out.push('\n');
        }

        let flags = self.registry.flag_lines();
        if !flags.is_empty() {
            let _ = writeln!(out, "FLAGS");
            write_rows(&mut out, &flags);
            out.push('\n');
        }
        out
    }
}

fn write_rows(out: &mut String, rows: &[(String, String)]) {
    let width = rows.iter().map(|(left, _)| left.chars().count()).max().unwrap_or(0);
    for (left, right) in rows {
        if right.is_empty() {
            let _ = writeln!(out, "  {left}");
        } else {
            let _ = writeln!(out, "  {left:<width$}  {right}");
        }
    }
}
