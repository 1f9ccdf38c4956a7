//! Error types for OSW WebDriver

use thiserror::Error;

/// Result type alias using the common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building configuration or parsing schema paths
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {key} = {value:?} ({reason})")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported browser: {0:?}. Use 'chrome' or 'firefox'.")]
    UnsupportedBrowser(String),

    #[error("Invalid schema path {path:?}: {reason}")]
    InvalidSchemaPath { path: String, reason: String },
}

impl Error {
    pub(crate) fn invalid_config(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
