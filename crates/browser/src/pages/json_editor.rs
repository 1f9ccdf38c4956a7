//! Page object for OpenSemanticLab's JSON editor forms
//!
//! Fields are addressed by schema path (`root.label.0.text`) and translated
//! to the bracket-style names the editor renders. Forms can nest: creating a
//! referenced record inline opens a second editor on top of the first, and
//! field operations always go to the innermost open editor. See
//! [`EditorStack`] for how the open editors are tracked.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info};

use osw_common::{schema_path_to_name, schema_path_to_property_checkbox_id, OswConfig};

use crate::driver::{Driver, Locator};
use crate::error::{BrowserError, BrowserResult};
use crate::pages::base::{expect_string, BasePage, DEFAULT_NOTIFICATION_MS};
use crate::pages::editor_stack::{EditorStack, PanelId};

/// Wait for the first editor after clicking a form tab
const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait for an inline editor to render
const INLINE_TIMEOUT: Duration = Duration::from_secs(10);

/// Wait for a saved or cancelled editor to close
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// arguments: [ordinal]; DOM id of the n-th ready panel in document order
const PANEL_ID_AT_JS: &str = r#"
var panel = document.querySelectorAll('.je-ready')[arguments[0]];
return panel ? panel.id : null;
"#;

/// arguments: [css selector]
const FIELD_VALUE_JS: &str = r#"
var el = document.querySelector(arguments[0]);
return el ? el.value : null;
"#;

/// Locators for the editor markup
pub mod locators {
    use crate::driver::Locator;

    pub const CREATE_INSTANCE_TAB: &str = "ca-create-instance";
    pub const EDIT_DATA_TAB: &str = "ca-edit-data";
    pub const READY_PANEL: &str = ".je-ready";
    pub const READY_PANEL_TITLE: &str = ".je-ready .card-title";
    pub const PROPERTIES_BUTTON: &str = ".json-editor-btntype-properties";
    pub const MESSAGE_DIALOG: &str = ".oo-ui-messageDialog-content";
    pub const CONFIRM_BUTTON: &str =
        r#"(//*[contains(@class,"oo-ui-messageDialog-content")]//*[@class="oo-ui-buttonElement-button"])[2]"#;

    /// The ready panel at a 0-based position in document order
    pub fn nth_ready_panel(ordinal: usize) -> Locator {
        Locator::xpath(format!(r#"(//*[@class="je-ready"])[{}]"#, ordinal + 1))
    }

    /// Input named `name` inside a panel
    pub fn field_in_panel(panel: &str, name: &str) -> Locator {
        Locator::css(format!(r#"#{} [name="{}"]"#, panel, name))
    }

    /// First input named `name` anywhere in the page
    pub fn field_anywhere(name: &str) -> String {
        format!(r#"[name="{}"]"#, name)
    }

    /// Editor row for a schema path inside a panel
    pub fn schema_row(panel: &str, path: &str) -> Locator {
        Locator::css(format!(r#"#{} [data-schemapath="{}"]"#, panel, path))
    }

    pub fn add_item_button(panel: &str, path: &str) -> Locator {
        Locator::css(format!(
            r#"#{} [data-schemapath="{}"] .json-editor-btn-add"#,
            panel, path
        ))
    }

    pub fn inline_edit_button(path: &str) -> Locator {
        Locator::css(format!(r#"[data-schemapath="{}"] .inline-edit-btn"#, path))
    }

    pub fn autocomplete_result(panel: &str, path: &str, index: usize) -> Locator {
        Locator::css(format!(
            r#"#{} [data-schemapath="{}"] #autocomplete-result-{}"#,
            panel, path, index
        ))
    }

    /// Top-level card title; clicking it collapses the editor
    pub fn collapse_title(panel: &str) -> Locator {
        Locator::css(format!("#{} .card-title.level-1", panel))
    }

    /// Primary (save) button of the dialog window holding a panel
    pub fn primary_action(panel: &str) -> Locator {
        dialog_action(panel, "primary")
    }

    /// Safe (cancel) button of the dialog window holding a panel
    pub fn safe_action(panel: &str) -> Locator {
        dialog_action(panel, "safe")
    }

    fn dialog_action(panel: &str, flag: &str) -> Locator {
        Locator::xpath(format!(
            concat!(
                r#"//*[@id="{}"]"#,
                r#"/ancestor::*[contains(@class,"oo-ui-window-content")]"#,
                r#"//*[contains(@class,"oo-ui-processDialog-actions-{}")]"#,
                r#"//*[contains(@class,"oo-ui-buttonElement-button")]"#,
            ),
            panel, flag
        ))
    }
}

/// Which wiki action opens a top-level form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    /// "Create Instance" on a category page
    CreateInstance,
    /// "Edit Data" on an item page
    EditData,
}

impl FormAction {
    fn tab(&self) -> Locator {
        match self {
            FormAction::CreateInstance => Locator::id(locators::CREATE_INSTANCE_TAB),
            FormAction::EditData => Locator::id(locators::EDIT_DATA_TAB),
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            FormAction::CreateInstance => "Navigate to the Category and click 'Create Instance'",
            FormAction::EditData => "Navigate to the Item and click 'Edit Data'",
        }
    }
}

/// How to leave the innermost editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitMode {
    Save,
    Cancel,
}

/// Fixed delays between steps that the editor needs to settle
#[derive(Debug, Clone)]
pub struct Pacing {
    /// Before clicking the create/edit tab
    pub before_form_tab: Duration,
    /// After an editor closed
    pub after_close: Duration,
    /// After typing into an autocomplete field
    pub autocomplete_search: Duration,
    /// After picking an autocomplete result
    pub autocomplete_select: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            before_form_tab: Duration::from_secs(3),
            after_close: Duration::from_secs(1),
            autocomplete_search: Duration::from_secs(5),
            autocomplete_select: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    /// No fixed delays
    pub fn immediate() -> Self {
        Self {
            before_form_tab: Duration::ZERO,
            after_close: Duration::ZERO,
            autocomplete_search: Duration::ZERO,
            autocomplete_select: Duration::ZERO,
        }
    }
}

/// Page object for OSL JSON editor forms
pub struct JsonEditorPage<D: Driver> {
    page: BasePage<D>,
    stack: EditorStack,
    pacing: Pacing,
}

impl<D: Driver> JsonEditorPage<D> {
    pub fn new(driver: Arc<D>, config: Arc<OswConfig>) -> Self {
        Self::from_page(BasePage::new(driver, config))
    }

    pub fn from_page(page: BasePage<D>) -> Self {
        Self {
            page,
            stack: EditorStack::new(),
            pacing: Pacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn page(&self) -> &BasePage<D> {
        &self.page
    }

    // --- Editor level management ---

    /// Current nesting level, -1 when no editor is open
    pub fn editor_level(&self) -> i32 {
        self.stack.level()
    }

    /// DOM id of the innermost open editor
    pub fn editor_id(&self) -> Option<&str> {
        self.stack.current().map(PanelId::as_str)
    }

    pub fn stack(&self) -> &EditorStack {
        &self.stack
    }

    async fn panel_id_at(&self, ordinal: usize) -> BrowserResult<PanelId> {
        let id = self
            .page
            .execute_js(PANEL_ID_AT_JS, vec![json!(ordinal)])
            .await?;
        let id = expect_string(id, &format!("id of ready panel {}", ordinal))?;
        debug!("Ready panel {} has id {}", ordinal, id);
        Ok(PanelId::new(id))
    }

    // --- Form navigation ---

    /// Open the create-instance editor of a category, e.g.
    /// `Category:OSW0e7fab2262fb4427ad0fa454bc868a0d`
    pub async fn open_create_instance_form(&mut self, category: &str) -> BrowserResult<()> {
        self.open_top_level_form(FormAction::CreateInstance, category)
            .await
    }

    /// Open the edit-data editor of a page
    pub async fn open_edit_instance_form(&mut self, title: &str) -> BrowserResult<()> {
        self.open_top_level_form(FormAction::EditData, title).await
    }

    /// Navigate to `/wiki/<target>` and open a fresh level-0 editor.
    ///
    /// Any previous nesting is discarded first, so on failure the level
    /// stays at -1.
    pub async fn open_top_level_form(
        &mut self,
        action: FormAction,
        target: &str,
    ) -> BrowserResult<()> {
        info!("Opening {:?} form for {}", action, target);
        self.page.navigate_to(&format!("/wiki/{}", target)).await?;
        self.stack.reset();

        self.page
            .add_notification(action.hint(), DEFAULT_NOTIFICATION_MS)
            .await?;
        self.page.enable_cursor().await?;

        let tab = action.tab();
        self.page.scroll_and_move(&tab).await?;
        self.page.pause(self.pacing.before_form_tab).await;
        self.page.scroll_and_click(&tab).await?;

        self.page
            .wait_for_element(&Locator::css(locators::READY_PANEL), Some(READY_TIMEOUT))
            .await?;
        self.page
            .scroll_and_move(&Locator::css(locators::READY_PANEL_TITLE))
            .await?;

        let panel = self.panel_id_at(0).await?;
        self.stack.push(panel);
        Ok(())
    }

    // --- Field interaction ---

    /// Fill a field of the innermost editor
    pub async fn fill_editor_field(&self, path: &str, value: &str) -> BrowserResult<()> {
        let panel = self.stack.require_current("fill_editor_field")?;
        let name = schema_path_to_name(path);
        debug!("Filling {} in {} with {:?}", name, panel, value);
        self.page
            .scroll_and_fill(&locators::field_in_panel(panel.as_str(), &name), value)
            .await
    }

    /// Enable an optional property through the properties menu
    pub async fn add_additional_property(&self, path: &str) -> BrowserResult<()> {
        info!("Adding property {}", path);
        self.page
            .add_notification("Select the property from the list", DEFAULT_NOTIFICATION_MS)
            .await?;
        let menu = Locator::css(locators::PROPERTIES_BUTTON);
        self.page.scroll_and_click(&menu).await?;
        self.page
            .scroll_and_check(&Locator::id(schema_path_to_property_checkbox_id(path)))
            .await?;
        self.page.scroll_and_click(&menu).await
    }

    /// Append an item to an array field
    pub async fn add_array_element(&self, path: &str) -> BrowserResult<()> {
        let panel = self.stack.require_current("add_array_element")?;
        self.page
            .scroll_and_click(&locators::add_item_button(panel.as_str(), path))
            .await
    }

    /// Open an inline editor for a reference field and make it current
    pub async fn create_inline(&mut self, path: &str) -> BrowserResult<()> {
        self.stack.require_current("create_inline")?;
        info!("Creating inline record for {}", path);

        let button = locators::inline_edit_button(path);
        let element = self.page.scroll_and_move(&button).await?;
        self.page.driver().click(&element).await?;

        // Panels render in open order, so the new one is next in line
        let ordinal = self.stack.depth();
        self.page
            .wait_for_visible(&locators::nth_ready_panel(ordinal), Some(INLINE_TIMEOUT))
            .await?;

        let panel = self.panel_id_at(ordinal).await?;
        let level = self.stack.push(panel);
        debug!("Editor level is now {}", level);
        Ok(())
    }

    /// Type into an autocomplete field and pick the `index`-th suggestion
    pub async fn select_autocomplete_result(
        &self,
        path: &str,
        index: usize,
        input_text: Option<&str>,
    ) -> BrowserResult<()> {
        let panel = self.stack.require_current("select_autocomplete_result")?;
        let row = locators::schema_row(panel.as_str(), path);
        self.page.scroll_and_click(&row).await?;

        if let Some(text) = input_text {
            let element = self.page.find_element(&row).await?;
            self.page.driver().send_keys(&element, text).await?;
        }
        self.page.pause(self.pacing.autocomplete_search).await;

        self.page
            .scroll_and_click(&locators::autocomplete_result(panel.as_str(), path, index))
            .await?;
        self.page.pause(self.pacing.autocomplete_select).await;
        Ok(())
    }

    // --- Save / Cancel ---

    /// Save the innermost editor
    pub async fn save_editor(&mut self) -> BrowserResult<()> {
        self.exit_editor(ExitMode::Save).await
    }

    /// Close the innermost editor without saving
    pub async fn cancel_editor(&mut self) -> BrowserResult<()> {
        self.exit_editor(ExitMode::Cancel).await
    }

    /// Close the innermost editor and return to its parent.
    ///
    /// Fails with `InvalidState` before touching the page when no editor
    /// is open, and with `Timeout` when the panel does not disappear.
    pub async fn exit_editor(&mut self, mode: ExitMode) -> BrowserResult<()> {
        let panel = self.stack.require_current("exit_editor")?.clone();
        info!("Leaving editor {} ({:?})", panel, mode);

        match mode {
            ExitMode::Save => {
                self.page
                    .add_notification("Save your changes", DEFAULT_NOTIFICATION_MS)
                    .await?;

                let title = self
                    .page
                    .find_element(&locators::collapse_title(panel.as_str()))
                    .await?;
                self.page.driver().click(&title).await?;

                self.page
                    .scroll_and_click(&locators::primary_action(panel.as_str()))
                    .await?;

                if self
                    .page
                    .count_visible_elements(locators::MESSAGE_DIALOG)
                    .await?
                    > 0
                {
                    debug!("Confirming save dialog");
                    self.page
                        .scroll_and_click(&Locator::xpath(locators::CONFIRM_BUTTON))
                        .await?;
                }
            }
            ExitMode::Cancel => {
                self.page
                    .scroll_and_click(&locators::safe_action(panel.as_str()))
                    .await?;
            }
        }

        self.page
            .wait_for_invisible(&Locator::id(panel.as_str()), Some(CLOSE_TIMEOUT))
            .await?;
        self.stack.pop()?;
        self.page.pause(self.pacing.after_close).await;

        if mode == ExitMode::Save {
            self.page.dismiss_notifications().await?;
        }
        Ok(())
    }

    // --- Assertions ---

    /// Current value of the first field with this path anywhere in the page.
    ///
    /// Not scoped to the current editor: values are usually checked after
    /// the editor that set them has closed.
    pub async fn field_value(&self, path: &str) -> BrowserResult<Option<String>> {
        let selector = locators::field_anywhere(&schema_path_to_name(path));
        let value = self.page.execute_js(FIELD_VALUE_JS, vec![json!(selector)]).await?;
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    pub async fn assert_field_has_value(&self, path: &str, expected: &str) -> BrowserResult<()> {
        let actual = self.field_value(path).await?;
        if actual.as_deref() != Some(expected) {
            return Err(BrowserError::ValueMismatch {
                path: path.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }

    pub async fn assert_field_not_has_value(&self, path: &str, value: &str) -> BrowserResult<()> {
        if self.field_value(path).await?.as_deref() == Some(value) {
            return Err(BrowserError::UnexpectedValue {
                path: path.to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::locators;
    use crate::driver::Locator;
    use test_case::test_case;

    #[test_case(locators::nth_ready_panel(0), r#"(//*[@class="je-ready"])[1]"# ; "first ready panel")]
    #[test_case(locators::nth_ready_panel(1), r#"(//*[@class="je-ready"])[2]"# ; "ordinal is one based")]
    #[test_case(
        locators::field_in_panel("editor-1", "root[label][0][text]"),
        r#"#editor-1 [name="root[label][0][text]"]"#
        ; "field in panel"
    )]
    #[test_case(
        locators::add_item_button("editor-1", "root.actionees"),
        r#"#editor-1 [data-schemapath="root.actionees"] .json-editor-btn-add"#
        ; "add item button"
    )]
    #[test_case(
        locators::inline_edit_button("root.orderer"),
        r#"[data-schemapath="root.orderer"] .inline-edit-btn"#
        ; "inline button is page wide"
    )]
    #[test_case(
        locators::autocomplete_result("editor-3", "root.orderer", 2),
        r#"#editor-3 [data-schemapath="root.orderer"] #autocomplete-result-2"#
        ; "autocomplete result"
    )]
    #[test_case(locators::collapse_title("editor-1"), "#editor-1 .card-title.level-1" ; "collapse title")]
    fn test_locator(locator: Locator, expected: &str) {
        assert_eq!(locator.value(), expected);
    }

    #[test_case(locators::primary_action("editor-2"), "oo-ui-processDialog-actions-primary" ; "save")]
    #[test_case(locators::safe_action("editor-2"), "oo-ui-processDialog-actions-safe" ; "cancel")]
    fn test_dialog_actions_address_panel_by_id(locator: Locator, flag: &str) {
        assert!(locator.value().starts_with(r#"//*[@id="editor-2"]/ancestor::"#));
        assert!(locator.value().contains(flag));
    }
}
