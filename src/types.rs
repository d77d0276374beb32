use std::fmt;
use std::path::PathBuf;

/// Which tier supplied a variable's value during a resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// A command-line flag occurrence.
    Flag,
    /// A key in the decoded config file.
    ConfigFile,
    /// An environment variable.
    Env,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Flag => write!(f, "command line"),
            Source::ConfigFile => write!(f, "config file"),
            Source::Env => write!(f, "environment"),
        }
    }
}

/// Outcome of one resolution pass.
///
/// Variable values themselves live behind their [`Handle`](crate::Handle)s;
/// this records what is not visible there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Positional tokens left over after flag parsing, starting with the
    /// first non-flag token.
    pub args: Vec<String>,
    /// The config file that was decoded, if any.
    pub config_file: Option<PathBuf>,
    /// Variables that received a value, in declaration order, with the tier
    /// that supplied the final value. Absent variables kept their defaults.
    pub provenance: Vec<(String, Source)>,
}

impl Resolution {
    /// The tier that supplied `name`, or `None` if the default was kept.
    pub fn source_of(&self, name: &str) -> Option<Source> {
        self.provenance
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, source)| *source)
    }
}
