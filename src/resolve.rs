//! Core resolution pipeline: apply flags, the config file, and the
//! environment to a registry.
//!
//! Precedence is flags > environment > config file. The tiers run in the
//! order flags, file, env:
//!
//! 1. Flags apply every occurrence and mark the variable `Flag`.
//! 2. The config file sets any variable not marked `Flag`.
//! 3. The environment sets any variable not marked `Flag`. A variable the
//!    file already set is reset first, so env replaces file values instead of
//!    appending to them.
//!
//! The first fatal error stops the pass. Values applied before it stay in
//! place; callers must treat an error as "resolution did not complete".

use tracing::{debug, trace};

use crate::env::{env_var_name, split_value};
use crate::error::ResolveError;
use crate::file;
use crate::flags;
use crate::options::Options;
use crate::registry::Registry;
use crate::types::{Resolution, Source};

/// Resolve every variable in `registry` from `args`, the config file, and
/// the environment, as configured by `options`.
///
/// `args` excludes the program name. On success the returned
/// [`Resolution`] carries the positional arguments left after the flags.
pub fn resolve<I, S>(registry: &mut Registry, args: I, options: &Options) -> Result<Resolution, ResolveError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    registry.clear_sources();

    let rest = flags::apply_flags(registry, &args)?;
    let config_file = apply_config_file(registry, options)?;
    apply_env(registry, options)?;

    let resolution = Resolution {
        args: rest,
        config_file,
        provenance: registry.provenance(),
    };
    debug!(
        registry = registry.name(),
        set = resolution.provenance.len(),
        leftover = resolution.args.len(),
        "resolved"
    );
    Ok(resolution)
}

/// Tier 2. Returns the path of the file that was decoded, if any.
fn apply_config_file(
    registry: &mut Registry,
    options: &Options,
) -> Result<Option<std::path::PathBuf>, ResolveError> {
    let Some(path) = file::config_path(registry, options)? else {
        return Ok(None);
    };
    let Some(decoder) = options.config_decoder() else {
        debug!(path = %path.display(), "no config decoder set, skipping config file");
        return Ok(None);
    };
    let Some(bytes) = file::read_config_file(&path, options.allows_missing_config_file())? else {
        debug!(path = %path.display(), "config file missing, skipping");
        return Ok(None);
    };

    let pairs = decoder
        .decode(&bytes)
        .map_err(|source| ResolveError::Decode {
            path: path.clone(),
            source,
        })?;
    debug!(path = %path.display(), pairs = pairs.len(), "decoded config file");

    for (key, value) in pairs {
        let Some(idx) = registry.position(&key) else {
            if options.ignores_undefined() {
                trace!(key = %key, "ignoring undefined config key");
                continue;
            }
            return Err(ResolveError::UndefinedKey {
                key,
                origin: Source::ConfigFile,
            });
        };
        if registry.at(idx).source() == Some(Source::Flag) {
            continue;
        }
        registry.apply(idx, &value, Source::ConfigFile)?;
    }
    Ok(Some(path))
}

/// Tier 3.
fn apply_env(registry: &mut Registry, options: &Options) -> Result<(), ResolveError> {
    let Some(prefix) = options.env_mode() else {
        return Ok(());
    };
    let env = options.env_reader();

    if let Some(prefix) = prefix {
        if !options.ignores_undefined() {
            check_undefined_env(registry, prefix, &env.vars())?;
        }
    }

    for idx in 0..registry.len() {
        let var = registry.at(idx);
        if var.source() == Some(Source::Flag) {
            continue;
        }
        let key = env_var_name(prefix, var.name());
        let Some(raw) = env.get(&key).filter(|v| !v.is_empty()) else {
            continue;
        };
        trace!(name = var.name(), env = %key, "env value");
        if var.source() == Some(Source::ConfigFile) {
            registry.reset(idx);
        }
        for piece in split_value(&raw, options.env_split_delimiter()) {
            registry.apply(idx, piece, Source::Env)?;
        }
    }
    Ok(())
}

/// Every `{PREFIX}_*` variable must map to a declared variable.
fn check_undefined_env(
    registry: &Registry,
    prefix: &str,
    vars: &[(String, String)],
) -> Result<(), ResolveError> {
    let needle = format!("{}_", prefix.to_ascii_uppercase());
    let known: std::collections::HashSet<String> = registry
        .iter()
        .map(|v| env_var_name(Some(prefix), v.name()))
        .collect();
    let mut undefined: Vec<&str> = vars
        .iter()
        .map(|(k, _)| k.as_str())
        .filter(|k| k.starts_with(&needle) && !known.contains(*k))
        .collect();
    undefined.sort_unstable();
    match undefined.first() {
        Some(key) => Err(ResolveError::UndefinedKey {
            key: key.to_string(),
            origin: Source::Env,
        }),
        None => Ok(()),
    }
}
