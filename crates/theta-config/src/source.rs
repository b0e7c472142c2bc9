//! Configuration sources and their precedence.

use std::fmt;

/// Origin of a configuration value.
///
/// Variants are declared from lowest to highest precedence, so the derived
/// ordering is the precedence order: a value from a greater source replaces a
/// value from a lesser one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    /// Compiled-in defaults.
    Default,
    /// `config.json`.
    BaseFile,
    /// `config.<mode>.json`.
    EnvironmentFile,
    /// `config.local.json`.
    LocalFile,
    /// The dotenv file.
    DotenvFile,
    /// The live process environment.
    ProcessEnvironment,
}

impl Source {
    /// Short name used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::BaseFile => "base_file",
            Self::EnvironmentFile => "environment_file",
            Self::LocalFile => "local_file",
            Self::DotenvFile => "dotenv",
            Self::ProcessEnvironment => "env",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
