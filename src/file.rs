//! Config file selection and loading.
//!
//! The path is chosen after flags are applied, from the first non-empty of:
//!
//! 1. the current value of the config-file flag (a variable of the same
//!    registry, see [`Options::config_file_flag`]),
//! 2. the current value of a handle, usually a parent command's `--config`
//!    variable (see [`Options::config_file_via`]),
//! 3. the static path (see [`Options::config_file`]).
//!
//! If none yields a path, the config file tier is skipped. The file is read
//! whole, once; there is no streaming and no retry.

use std::path::{Path, PathBuf};

use crate::error::ResolveError;
use crate::options::Options;
use crate::registry::Registry;

/// Pick the config file path for this pass, or `None` to skip the tier.
pub fn config_path(registry: &Registry, options: &Options) -> Result<Option<PathBuf>, ResolveError> {
    if let Some(name) = options.config_file_flag_name() {
        let var = registry
            .get(name)
            .ok_or_else(|| ResolveError::ConfigFileFlagNotDeclared(name.to_string()))?;
        let value = var.render();
        if !value.is_empty() {
            return Ok(Some(PathBuf::from(value)));
        }
    }

    if let Some(handle) = options.config_file_via_handle() {
        let value = handle.get();
        if !value.is_empty() {
            return Ok(Some(PathBuf::from(value)));
        }
    }

    Ok(options
        .static_config_file()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf))
}

/// Read the whole file. `Ok(None)` means missing and allowed to be.
pub fn read_config_file(path: &Path, allow_missing: bool) -> Result<Option<Vec<u8>>, ResolveError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if allow_missing {
                Ok(None)
            } else {
                Err(ResolveError::ConfigNotFound {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(e) => Err(ResolveError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
