//! Command-line flag tier.
//!
//! Builds a `clap::Command` from the registry so that clap handles the flag
//! syntax (`-x v`, `-xv`, `--name v`, `--name=v`, boolean presence, `--`).
//! Every occurrence is fed back through the variable's own parse function in
//! command-line order. Parsing stops at the first positional token; it and
//! everything after it are returned untouched for subcommand delegation.

use clap::{Arg, ArgAction, ColorChoice, Command};
use tracing::trace;

use crate::error::ResolveError;
use crate::registry::Registry;
use crate::types::Source;

/// Id of the catch-all positional; whitespace keeps it out of the variable namespace.
const REST: &str = "positional args";

/// Parse `args` against the registry's variables and apply every flag
/// occurrence. Returns the leftover positional tokens.
pub fn apply_flags(registry: &mut Registry, args: &[String]) -> Result<Vec<String>, ResolveError> {
    let matches = command_for(registry).try_get_matches_from(args)?;

    let mut occurrences: Vec<(usize, usize, String)> = Vec::new();
    for (idx, var) in registry.iter().enumerate() {
        let Some(raws) = matches.get_raw(var.name()) else {
            continue;
        };
        let indices: Vec<usize> = matches
            .indices_of(var.name())
            .map(|i| i.collect())
            .unwrap_or_default();
        for (n, raw) in raws.enumerate() {
            let at = indices.get(n).copied().unwrap_or(usize::MAX);
            occurrences.push((at, idx, raw.to_string_lossy().into_owned()));
        }
    }
    occurrences.sort_by_key(|(at, _, _)| *at);

    for (_, idx, raw) in &occurrences {
        trace!(name = registry.at(*idx).name(), value = %raw, "flag occurrence");
        registry.apply(*idx, raw, Source::Flag)?;
    }

    let rest = matches
        .get_raw(REST)
        .map(|vals| vals.map(|v| v.to_string_lossy().into_owned()).collect())
        .unwrap_or_default();
    Ok(rest)
}

fn command_for(registry: &Registry) -> Command {
    let mut cmd = Command::new(registry.name().to_string())
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .color(ColorChoice::Never);

    for var in registry.iter() {
        let mut arg = Arg::new(var.name().to_string())
            .long(var.name().to_string())
            .help(var.usage().to_string())
            .action(ArgAction::Append);
        if let Some(alias) = var.alias() {
            arg = arg.short(alias);
        }
        arg = if var.is_presence() {
            arg.num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
        } else {
            arg.num_args(1).allow_hyphen_values(true)
        };
        cmd = cmd.arg(arg);
    }

    cmd.arg(
        Arg::new(REST)
            .num_args(1..)
            .action(ArgAction::Append)
            .trailing_var_arg(true),
    )
}
