//! Error types for render configuration and output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a render configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A `[params]` entry or `--set` names no parameter
    #[error("unknown parameter '{0}' (run 'analoga params' for the list)")]
    UnknownParameter(String),

    /// A `--set` or `--notes` value did not parse
    #[error("invalid value '{value}' for {what}")]
    InvalidValue {
        /// What the value was for.
        what: String,
        /// The offending text.
        value: String,
    },

    /// A setting is out of range
    #[error("invalid {field}: {reason}")]
    OutOfRange {
        /// Setting name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::OutOfRange {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised while writing rendered audio.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to write the WAV file
    #[error("failed to write WAV '{path}': {source}")]
    WriteWav {
        /// Output path.
        path: PathBuf,
        /// Underlying encoder error.
        #[source]
        source: hound::Error,
    },
}

impl RenderError {
    /// Create a WAV write error.
    pub fn write_wav(path: impl Into<PathBuf>, source: hound::Error) -> Self {
        RenderError::WriteWav {
            path: path.into(),
            source,
        }
    }
}
