//! Error types for the host controller

use std::path::PathBuf;

/// Host controller errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// `refresh` before any markup was loaded
    #[error("nothing has been loaded yet")]
    NothingLoaded,

    /// Configuration could not be read
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that was attempted
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse into a config
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but unusable
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(HostError::NothingLoaded.to_string(), "nothing has been loaded yet");
        let err = ConfigError::Invalid {
            field: "excerpt_limit",
            reason: "must be positive".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for `excerpt_limit`: must be positive");
    }
}
