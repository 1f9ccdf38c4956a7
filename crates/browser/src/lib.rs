//! OSW browser automation
//!
//! Page objects for an OpenSemanticLab wiki driven over WebDriver:
//! - a [`Driver`] trait for the browser capability, with a fantoccini-backed
//!   [`WebDriverSession`] for real browsers
//! - page objects for login and the nested JSON editor
//! - declarative YAML workflows and a runner that reports per-step results
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 WorkflowRunner<D: Driver>                   │
//! │    ├── run_suite(&[WorkflowSpec]) -> SuiteResult            │
//! │    └── run_workflow(&WorkflowSpec) -> WorkflowResult        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page objects                                               │
//! │    ├── LoginPage      login / login_hidden                  │
//! │    └── JsonEditorPage                                       │
//! │          ├── open_create_instance_form / open_edit_...      │
//! │          ├── fill_editor_field(schema path, value)          │
//! │          ├── create_inline(path)      push panel            │
//! │          ├── save_editor / cancel_editor   pop panel        │
//! │          └── EditorStack [PanelId, ...]                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BasePage: waits, scroll + click/fill/check, scripts        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Driver trait  ──  WebDriverSession (fantoccini)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod driver;
pub mod error;
pub mod pages;
pub mod runner;
pub mod webdriver;
pub mod workflow;

pub use driver::{Driver, Locator, WaitCondition};
pub use error::{BrowserError, BrowserResult};
pub use pages::{BasePage, EditorStack, ExitMode, FormAction, JsonEditorPage, LoginPage, Pacing, PanelId};
pub use runner::{StepResult, SuiteResult, WorkflowResult, WorkflowRunner};
pub use webdriver::WebDriverSession;
pub use workflow::{eln_entry_workflow, LoginMode, WorkflowSpec, WorkflowStep, ELN_ENTRY_CATEGORY};
