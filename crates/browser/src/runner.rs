//! Executes workflows against a browser session

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use osw_common::OswConfig;

use crate::driver::Driver;
use crate::error::BrowserResult;
use crate::pages::{JsonEditorPage, LoginPage, Pacing};
use crate::workflow::{LoginMode, WorkflowSpec, WorkflowStep};

/// File name of the suite report inside the output directory
pub const RESULTS_FILE: &str = "workflow-results.json";

/// Outcome of one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub success: bool,
    pub duration_ms: u64,
    /// Editor nesting level after the step ran
    pub editor_level: i32,
    pub error: Option<String>,
}

/// Outcome of one workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
}

/// Outcome of a list of workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<WorkflowResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// Write the suite report as `workflow-results.json` under `output_dir`
    pub fn write(&self, output_dir: &Path) -> BrowserResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;

        let path = output_dir.join(RESULTS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Runs workflows one after another on a single session
pub struct WorkflowRunner<D: Driver> {
    driver: Arc<D>,
    config: Arc<OswConfig>,
    pacing: Pacing,
}

impl<D: Driver> WorkflowRunner<D> {
    pub fn new(driver: Arc<D>, config: Arc<OswConfig>) -> Self {
        Self {
            driver,
            config,
            pacing: Pacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run workflows in order; a failed workflow does not stop the suite
    pub async fn run_suite(&self, specs: &[WorkflowSpec]) -> SuiteResult {
        let start = Instant::now();
        let mut results = Vec::with_capacity(specs.len());
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} workflow(s)...", specs.len());

        for spec in specs {
            let result = self.run_workflow(spec).await;
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Workflow results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        SuiteResult {
            total: specs.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Run one workflow with a fresh editor state, stopping at the first
    /// failing step
    pub async fn run_workflow(&self, spec: &WorkflowSpec) -> WorkflowResult {
        let start = Instant::now();
        debug!("Running workflow: {}", spec.name);

        let mut editor = JsonEditorPage::new(self.driver.clone(), self.config.clone())
            .with_pacing(self.pacing.clone());
        let mut steps = Vec::with_capacity(spec.steps.len() + 1);
        let mut workflow_error = None;

        if spec.login != LoginMode::None {
            let started = Instant::now();
            let outcome = self.login(spec.login).await;
            let result = step_result("login".to_string(), started, &editor, outcome);
            workflow_error = result.error.clone();
            steps.push(result);
        }

        if workflow_error.is_none() {
            for step in &spec.steps {
                let started = Instant::now();
                let outcome = execute_step(&mut editor, step).await;
                let result = step_result(step.to_string(), started, &editor, outcome);

                if !result.success {
                    workflow_error = result.error.clone();
                    steps.push(result);
                    break;
                }
                steps.push(result);
            }
        }

        WorkflowResult {
            name: spec.name.clone(),
            success: workflow_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps,
            error: workflow_error,
        }
    }

    async fn login(&self, mode: LoginMode) -> BrowserResult<()> {
        let page = LoginPage::new(self.driver.clone(), self.config.clone());
        match mode {
            LoginMode::None => Ok(()),
            LoginMode::Standard => page.login(None, None).await,
            LoginMode::Hidden => page.login_hidden(None, None).await,
        }
    }
}

fn step_result<D: Driver>(
    step: String,
    started: Instant,
    editor: &JsonEditorPage<D>,
    outcome: BrowserResult<()>,
) -> StepResult {
    let duration_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(()) => StepResult {
            step,
            success: true,
            duration_ms,
            editor_level: editor.editor_level(),
            error: None,
        },
        Err(e) => StepResult {
            step,
            success: false,
            duration_ms,
            editor_level: editor.editor_level(),
            error: Some(e.to_string()),
        },
    }
}

async fn execute_step<D: Driver>(
    editor: &mut JsonEditorPage<D>,
    step: &WorkflowStep,
) -> BrowserResult<()> {
    debug!("Executing step: {}", step);

    match step {
        WorkflowStep::Navigate { path } => editor.page().navigate_to(path).await,
        WorkflowStep::OpenCreateForm { category } => {
            editor.open_create_instance_form(category).await
        }
        WorkflowStep::OpenEditForm { title } => editor.open_edit_instance_form(title).await,
        WorkflowStep::Fill { path, value } => {
            editor.fill_editor_field(path.as_str(), value).await
        }
        WorkflowStep::AddProperty { path } => editor.add_additional_property(path.as_str()).await,
        WorkflowStep::AddArrayElement { path } => editor.add_array_element(path.as_str()).await,
        WorkflowStep::CreateInline { path } => editor.create_inline(path.as_str()).await,
        WorkflowStep::SelectAutocomplete { path, index, text } => {
            editor
                .select_autocomplete_result(path.as_str(), *index, text.as_deref())
                .await
        }
        WorkflowStep::Save => editor.save_editor().await,
        WorkflowStep::Cancel => editor.cancel_editor().await,
        WorkflowStep::AssertValue { path, expected } => {
            editor.assert_field_has_value(path.as_str(), expected).await
        }
        WorkflowStep::AssertNotValue { path, value } => {
            editor.assert_field_not_has_value(path.as_str(), value).await
        }
        WorkflowStep::Notify { text, timeout_ms } => {
            editor.page().add_notification(text, *timeout_ms).await
        }
        WorkflowStep::Sleep { ms } => {
            editor.page().pause(Duration::from_millis(*ms)).await;
            Ok(())
        }
        WorkflowStep::Log { message } => {
            info!("[WORKFLOW LOG] {}", message);
            Ok(())
        }
    }
}
