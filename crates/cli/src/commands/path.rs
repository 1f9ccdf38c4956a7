//! Path Commands

use anyhow::Result;
use clap::Subcommand;

use osw_common::{
    name_to_schema_path, schema_path_to_name, schema_path_to_property_checkbox_id, SchemaPath,
};

use crate::output::{print_value, OutputFormat};

#[derive(Subcommand)]
pub enum PathCommands {
    /// Schema path to form field name (root.label.0.text -> root[label][0][text])
    ToName {
        path: String,

        /// Reject paths that are not well-formed
        #[arg(long)]
        strict: bool,
    },

    /// Form field name to schema path
    ToPath {
        name: String,

        /// Reject names that are not well-formed
        #[arg(long)]
        strict: bool,
    },

    /// Schema path to the id of its property checkbox (root.orderer -> root-orderer)
    CheckboxId { path: String },
}

/// Result of a conversion as `(key, value)`
pub fn convert(cmd: &PathCommands) -> Result<(&'static str, String)> {
    Ok(match cmd {
        PathCommands::ToName { path, strict } => {
            let name = if *strict {
                path.parse::<SchemaPath>()?.to_field_name()
            } else {
                schema_path_to_name(path)
            };
            ("name", name)
        }
        PathCommands::ToPath { name, strict } => {
            let path = if *strict {
                SchemaPath::from_field_name(name)?.to_string()
            } else {
                name_to_schema_path(name)
            };
            ("path", path)
        }
        PathCommands::CheckboxId { path } => ("checkbox_id", schema_path_to_property_checkbox_id(path)),
    })
}

pub fn execute(cmd: &PathCommands, format: OutputFormat) -> Result<()> {
    let (key, value) = convert(cmd)?;
    print_value(key, &value, format)
}
