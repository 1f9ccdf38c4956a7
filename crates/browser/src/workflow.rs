//! Declarative YAML form-fill workflows

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use osw_common::SchemaPath;

use crate::error::{BrowserError, BrowserResult};

/// Category of OSW ELN entries
pub const ELN_ENTRY_CATEGORY: &str = "Category:OSW0e7fab2262fb4427ad0fa454bc868a0d";

/// A workflow parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSpec {
    /// Unique name for this workflow
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Tags for filtering workflows
    #[serde(default)]
    pub tags: Vec<String>,

    /// How to log in before the first step
    #[serde(default)]
    pub login: LoginMode,

    /// Steps to execute in order
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMode {
    #[default]
    None,
    /// Visible login form
    Standard,
    /// Login form hidden behind an OIDC provider
    Hidden,
}

/// A single step in a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkflowStep {
    /// Navigate to a path relative to the base URL
    Navigate { path: String },

    /// Open the create-instance form of a category
    OpenCreateForm { category: String },

    /// Open the edit-data form of a page
    OpenEditForm { title: String },

    /// Fill a field of the current editor
    Fill { path: SchemaPath, value: String },

    /// Enable an optional property
    AddProperty { path: SchemaPath },

    /// Append an item to an array
    AddArrayElement { path: SchemaPath },

    /// Open an inline editor for a reference field
    CreateInline { path: SchemaPath },

    SelectAutocomplete {
        path: SchemaPath,
        #[serde(default)]
        index: usize,
        #[serde(default)]
        text: Option<String>,
    },

    /// Save the current editor
    Save,

    /// Close the current editor without saving
    Cancel,

    AssertValue { path: SchemaPath, expected: String },

    AssertNotValue { path: SchemaPath, value: String },

    /// Show a toast in the page
    Notify {
        text: String,
        #[serde(default = "default_notify_ms")]
        timeout_ms: u64,
    },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Log a message
    Log { message: String },
}

fn default_notify_ms() -> u64 {
    crate::pages::base::DEFAULT_NOTIFICATION_MS
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStep::Navigate { path } => write!(f, "navigate:{}", path),
            WorkflowStep::OpenCreateForm { category } => write!(f, "open_create_form:{}", category),
            WorkflowStep::OpenEditForm { title } => write!(f, "open_edit_form:{}", title),
            WorkflowStep::Fill { path, .. } => write!(f, "fill:{}", path),
            WorkflowStep::AddProperty { path } => write!(f, "add_property:{}", path),
            WorkflowStep::AddArrayElement { path } => write!(f, "add_array_element:{}", path),
            WorkflowStep::CreateInline { path } => write!(f, "create_inline:{}", path),
            WorkflowStep::SelectAutocomplete { path, index, .. } => {
                write!(f, "select_autocomplete:{}#{}", path, index)
            }
            WorkflowStep::Save => f.write_str("save"),
            WorkflowStep::Cancel => f.write_str("cancel"),
            WorkflowStep::AssertValue { path, .. } => write!(f, "assert_value:{}", path),
            WorkflowStep::AssertNotValue { path, .. } => write!(f, "assert_not_value:{}", path),
            WorkflowStep::Notify { .. } => f.write_str("notify"),
            WorkflowStep::Sleep { ms } => write!(f, "sleep:{}ms", ms),
            WorkflowStep::Log { .. } => f.write_str("log"),
        }
    }
}

impl WorkflowSpec {
    /// Parse a workflow from a YAML string
    pub fn from_yaml(yaml: &str) -> BrowserResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a workflow from a YAML file
    pub fn from_file(path: &Path) -> BrowserResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            BrowserError::WorkflowParse(format!("{}: {}", path.display(), e))
        })
    }

    /// Load one workflow file, or every `.yaml`/`.yml` file below a directory
    pub fn load_all(path: &Path) -> BrowserResult<Vec<Self>> {
        if path.is_file() {
            return Ok(vec![Self::from_file(path)?]);
        }

        let mut files: Vec<_> = walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        files.sort();

        files.iter().map(|file| Self::from_file(file)).collect()
    }

    /// Filter workflows by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs
            .iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }
}

/// Create an ELN entry with an inline organization as orderer and an
/// inline person as actionee
pub fn eln_entry_workflow(category: &str) -> BrowserResult<WorkflowSpec> {
    use WorkflowStep::*;

    let label = SchemaPath::parse("root.label.0.text")?;
    let orderer = SchemaPath::parse("root.orderer")?;
    let actionees = SchemaPath::parse("root.actionees")?;
    let actionee = actionees.child(0)?;
    let fill = |path: &SchemaPath, value: &str| Fill {
        path: path.clone(),
        value: value.to_string(),
    };

    Ok(WorkflowSpec {
        name: "eln-entry".to_string(),
        description: "Create an ELN entry with inline organization and person records"
            .to_string(),
        tags: vec!["eln".to_string()],
        login: LoginMode::Standard,
        steps: vec![
            OpenCreateForm {
                category: category.to_string(),
            },
            fill(&label, "Test label"),
            AddProperty {
                path: orderer.clone(),
            },
            fill(&orderer, ""),
            CreateInline {
                path: orderer.clone(),
            },
            fill(&label, "Test Org"),
            Save,
            AssertValue {
                path: orderer,
                expected: "Test Org".to_string(),
            },
            AddProperty {
                path: actionees.clone(),
            },
            AddArrayElement { path: actionees },
            fill(&actionee, ""),
            CreateInline {
                path: actionee.clone(),
            },
            fill(&SchemaPath::parse("root.first_name")?, "Jane"),
            fill(&SchemaPath::parse("root.surname")?, "Doe"),
            Save,
            AssertValue {
                path: actionee,
                expected: "Jane Doe".to_string(),
            },
            Save,
        ],
    })
}
