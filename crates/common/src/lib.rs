//! OSW WebDriver Common Library
//!
//! Shared pieces used by the page objects and the CLI:
//! - conversion between JSON-editor schema paths and HTML form field names
//! - the immutable test configuration, loaded from env / `.env` / TOML
//! - the common error type

pub mod config;
pub mod error;
pub mod schema_path;

pub use config::{BrowserKind, OswConfig};
pub use error::{Error, Result};
pub use schema_path::{
    name_to_schema_path, schema_path_to_name, schema_path_to_property_checkbox_id, SchemaPath,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
