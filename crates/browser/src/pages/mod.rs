//! Page objects for the OSW wiki

pub mod base;
pub mod editor_stack;
pub mod json_editor;
pub mod login;

pub use base::BasePage;
pub use editor_stack::{EditorStack, PanelId};
pub use json_editor::{ExitMode, FormAction, JsonEditorPage, Pacing};
pub use login::LoginPage;
