//! Resolve command-line flags, environment variables, and config files into
//! one set of typed variables.
//!
//! Declare your variables once on a [`Registry`], describe where config can
//! come from with [`Options`], and call [`resolve`]:
//!
//! ```ignore
//! let mut registry = Registry::new("myapp");
//! let config = registry.string("config", Some('c'), "", "config file");
//! let port = registry.int("port", Some('p'), 8080, "listen port");
//! let peers = registry.string_list("peer", None, &[], "peer address (repeatable)");
//!
//! let options = Options::new()
//!     .config_file_flag("config")
//!     .decoder(TomlDecoder::new())
//!     .allow_missing_config_file(true)
//!     .env_prefix("MYAPP");
//!
//! let resolution = flagtier::resolve(&mut registry, std::env::args().skip(1), &options)?;
//! println!("port {} from {:?}", port.get(), resolution.source_of("port"));
//! ```
//!
//! Each declaration returns a [`Handle`]: a cheap, cloneable, thread-safe
//! view of the variable's current value. Resolution writes through the
//! registry; callers read through handles.
//!
//! # Precedence
//!
//! ```text
//! Declared defaults
//!        ↑ overridden by
//! Config file           key value pairs from a ConfigDecoder
//!        ↑ overridden by
//! Environment           MYAPP_PORT, MYAPP_PEER
//!        ↑ overridden by
//! Command-line flags    --port 9000, -p 9000, --port=9000
//! ```
//!
//! The tiers are applied flags first, then the file, then the environment. A
//! variable set by a flag is never touched by the lower tiers. A variable set
//! by the file and also present in the environment is reset before the
//! environment value is applied, so the environment replaces file values
//! rather than adding to them.
//!
//! # Repeats and lists
//!
//! Scalars keep the last value seen. List variables accumulate: the first
//! occurrence in a pass replaces the declared default and later ones append.
//! Each occurrence is also split on `,`, so `--peer a,b --peer c` yields
//! `["a", "b", "c"]`. [`Options::env_split`] additionally splits environment
//! values before they are applied, which matters for scalars (last piece
//! wins).
//!
//! # Config file
//!
//! The path comes from, in order: the current value of a variable named by
//! [`Options::config_file_flag`], a [`Handle<String>`] given to
//! [`Options::config_file_via`] (usually a parent command's `--config`), or a
//! static [`Options::config_file`]. Keys must match variable names exactly;
//! aliases are not keys. Unknown keys are an error unless
//! [`Options::ignore_undefined`] is set.
//!
//! Formats plug in through [`ConfigDecoder`]. Four ship with the crate:
//! [`PlainDecoder`], [`TomlDecoder`], [`JsonDecoder`], and [`YamlDecoder`]
//! (feature `yaml`, on by default). Nested tables flatten into dotted names:
//! `[db] url = "..."` sets the variable `db.url`.
//!
//! # Environment
//!
//! The environment tier is off until [`Options::env_prefix`] or
//! [`Options::env_no_prefix`] is set. Names are the variable name in upper
//! case with `-`, `.` and `/` mapped to `_`; see [`env_var_name`]. With a
//! prefix, every `PREFIX_*` variable must match a declared variable. Empty
//! values count as unset.
//!
//! # Subcommands
//!
//! [`Command`] builds a tree of named commands, each with its own registry
//! and options. Parsing resolves each level in turn and descends on the first
//! positional token; running calls the selected node's action with a
//! [`CancellationToken`](tokio_util::sync::CancellationToken).
//!
//! # Logging
//!
//! The crate emits `tracing` events at `debug` and `trace` level for tier
//! decisions (skipped files, ignored keys, subcommand selection). It never
//! installs a subscriber.

pub mod error;
pub mod types;

mod command;
pub mod decode;
mod env;
mod file;
mod flags;
mod flatten;
mod options;
mod registry;
mod resolve;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use command::Command;
#[cfg(feature = "yaml")]
pub use decode::YamlDecoder;
pub use decode::{ConfigDecoder, JsonDecoder, PlainDecoder, TomlDecoder};
pub use env::{Environment, ProcessEnv, env_var_name};
pub use error::{CommandError, DecodeError, ResolveError};
pub use options::Options;
pub use registry::{Registry, Variable};
pub use resolve::resolve;
pub use types::{Resolution, Source};
pub use value::{Handle, List, Scalar, Value};
