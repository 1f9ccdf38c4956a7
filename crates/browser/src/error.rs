//! Error types for page objects and workflows

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Element not found within {timeout:?}: {locator}")]
    NotFound { locator: String, timeout: Duration },

    #[error("Element still visible after {timeout:?}: {locator}")]
    Timeout { locator: String, timeout: Duration },

    #[error("Invalid editor state: {0}")]
    InvalidState(String),

    #[error("Expected field {path:?} to have value {expected:?}, got {actual:?}")]
    ValueMismatch {
        path: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("Expected field {path:?} NOT to have value {value:?}")]
    UnexpectedValue { path: String, value: String },

    #[error("Unexpected script result: {0}")]
    Script(String),

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("Failed to start WebDriver session at {url}: {reason}")]
    Session { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] osw_common::Error),

    #[error("Workflow parse error: {0}")]
    WorkflowParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<fantoccini::error::CmdError> for BrowserError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        BrowserError::WebDriver(e.to_string())
    }
}

pub type BrowserResult<T> = Result<T, BrowserError>;
