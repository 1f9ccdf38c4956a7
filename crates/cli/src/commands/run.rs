//! Workflow Commands

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use osw_browser::{
    eln_entry_workflow, Driver, SuiteResult, WorkflowResult, WorkflowRunner, WorkflowSpec,
    ELN_ENTRY_CATEGORY,
};
use osw_common::OswConfig;

use crate::output::{print_error, print_info, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct RunArgs {
    /// Workflow file or directory of `.yaml` / `.yml` workflows
    path: PathBuf,

    /// Run only workflows with this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Directory for workflow-results.json
    #[arg(short, long, default_value = "workflow-results")]
    output: PathBuf,
}

#[derive(Args)]
pub struct ElnEntryArgs {
    /// Category to create the entry in
    #[arg(long, default_value = ELN_ENTRY_CATEGORY)]
    category: String,
}

/// One line of the results table
#[derive(Serialize)]
pub struct WorkflowRow {
    pub name: String,
    pub success: bool,
    pub steps: usize,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl From<&WorkflowResult> for WorkflowRow {
    fn from(result: &WorkflowResult) -> Self {
        Self {
            name: result.name.clone(),
            success: result.success,
            steps: result.steps.len(),
            duration_ms: result.duration_ms,
            error: result.error.clone(),
        }
    }
}

impl TableDisplay for WorkflowRow {
    fn headers() -> Vec<&'static str> {
        vec!["Workflow", "Result", "Steps", "Duration", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            if self.success { "passed" } else { "FAILED" }.to_string(),
            self.steps.to_string(),
            format!("{} ms", self.duration_ms),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

/// Run the workflows below `args.path`; returns whether all passed
pub async fn execute(args: &RunArgs, config: OswConfig, format: OutputFormat) -> Result<bool> {
    let mut specs = WorkflowSpec::load_all(&args.path)?;
    if let Some(tag) = &args.tag {
        specs = WorkflowSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
    }
    if specs.is_empty() {
        bail!("No workflows found in {}", args.path.display());
    }
    info!("Loaded {} workflow(s) from {}", specs.len(), args.path.display());

    let suite = run_with_session(config, &specs).await?;
    report(&suite, format)?;

    let path = suite.write(&args.output)?;
    print_info(&format!("Results written to {}", path.display()));
    Ok(suite.success())
}

/// Run the built-in ELN entry workflow; returns whether it passed
pub async fn execute_eln_entry(
    args: &ElnEntryArgs,
    config: OswConfig,
    format: OutputFormat,
) -> Result<bool> {
    let spec = eln_entry_workflow(&args.category)?;
    let suite = run_with_session(config, std::slice::from_ref(&spec)).await?;
    report(&suite, format)?;
    Ok(suite.success())
}

async fn run_with_session(config: OswConfig, specs: &[WorkflowSpec]) -> Result<SuiteResult> {
    let config = Arc::new(config);
    let session = super::connect(&config).await?;

    let suite = WorkflowRunner::new(session.clone(), config).run_suite(specs).await;
    session.quit().await?;
    Ok(suite)
}

fn report(suite: &SuiteResult, format: OutputFormat) -> Result<()> {
    let rows: Vec<WorkflowRow> = suite.results.iter().map(WorkflowRow::from).collect();
    print_list(&rows, format)?;

    if suite.success() {
        print_success(&format!("{} workflow(s) passed", suite.passed));
    } else {
        print_error(&format!(
            "{} of {} workflow(s) failed",
            suite.failed, suite.total
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_row_shows_error() {
        let result = WorkflowResult {
            name: "eln-entry".to_string(),
            success: false,
            duration_ms: 1200,
            steps: vec![],
            error: Some("Invalid editor state: exit_editor: no editor is open".to_string()),
        };
        let row = WorkflowRow::from(&result).row();
        assert_eq!(row[0], "eln-entry");
        assert_eq!(row[1], "FAILED");
        assert_eq!(row[3], "1200 ms");
        assert!(row[4].contains("no editor is open"));
    }
}
