use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
///
/// All of these are fatal at startup: no pipeline stage runs with a partially
/// loaded configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid regex in rule '{rule}': {source}")]
    Regex {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
