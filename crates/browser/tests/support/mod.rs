//! In-memory stand-in for a wiki page with JSON editor panels

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use osw_browser::{BrowserError, BrowserResult, Driver, Locator, WaitCondition};
use osw_common::{schema_path_to_name, OswConfig};

const LOGIN_IDS: [&str; 4] = ["wpName1", "wpPassword1", "wpRemember", "wpLoginAttempt"];

/// What a locator resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    FormTab,
    ReadyPanel(usize),
    PanelById(String),
    Field { panel: String, name: String },
    InlineButton { path: String },
    AddButton { panel: String, path: String },
    Row { panel: String, path: String },
    AutocompleteResult { panel: String, path: String, index: usize },
    CollapseTitle(String),
    PrimaryAction(String),
    SafeAction(String),
    PropertiesButton,
    Checkbox(String),
    MessageDialog,
    ConfirmButton,
    Notification(usize),
    LoginField(String),
    Unknown(String),
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub target: Target,
    pub locator: Locator,
}

/// Behaviour switches for the simulated site
#[derive(Debug, Clone)]
pub struct FakeOptions {
    /// Clicking a form tab renders a panel
    pub render_forms: bool,
    /// Clicking an inline-edit button renders a nested panel
    pub render_inline: bool,
    /// Saved or cancelled panels disappear
    pub close_panels: bool,
    /// Saving asks for confirmation first
    pub confirm_dialog: bool,
    /// The local login form is hidden until forced visible
    pub hidden_login_form: bool,
}

impl Default for FakeOptions {
    fn default() -> Self {
        Self {
            render_forms: true,
            render_inline: true,
            close_panels: true,
            confirm_dialog: false,
            hidden_login_form: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Panel {
    pub id: String,
    pub fields: BTreeMap<String, String>,
    /// Parent panel id and field name an inline record reports back to
    origin: Option<(String, String)>,
}

#[derive(Debug, Default)]
pub struct PageState {
    pub url: Option<String>,
    pub panels: Vec<Panel>,
    pub known_panel_ids: HashSet<String>,
    pub next_panel: usize,
    pub pending_confirm: Option<String>,
    pub checked: HashSet<String>,
    pub array_items: Vec<String>,
    pub login_fields: BTreeMap<String, String>,
    pub remember_me: bool,
    pub login_submitted: bool,
    pub forced_visible: HashSet<String>,
    pub toasts: Vec<String>,
    pub mw_notifications: usize,
    pub autocomplete_queries: Vec<String>,
    pub saved: Vec<Panel>,
    pub events: Vec<String>,
    pub quit: bool,
}

pub struct FakeDriver {
    options: FakeOptions,
    state: Mutex<PageState>,
}

impl FakeDriver {
    pub fn new() -> Arc<Self> {
        Self::with_options(FakeOptions::default())
    }

    pub fn with_options(options: FakeOptions) -> Arc<Self> {
        Arc::new(Self {
            options,
            state: Mutex::new(PageState::default()),
        })
    }

    pub fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap()
    }

    pub fn open_panel_ids(&self) -> Vec<String> {
        self.state().panels.iter().map(|p| p.id.clone()).collect()
    }

    pub fn field(&self, panel: &str, name: &str) -> Option<String> {
        self.state()
            .panels
            .iter()
            .find(|p| p.id == panel)
            .and_then(|p| p.fields.get(name).cloned())
    }

    pub fn events(&self) -> Vec<String> {
        self.state().events.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with("click "))
            .collect()
    }

    fn resolve(&self, locator: &Locator) -> Target {
        let state = self.state();
        match locator {
            Locator::Id(id) => {
                if id == "ca-create-instance" || id == "ca-edit-data" {
                    Target::FormTab
                } else if LOGIN_IDS.contains(&id.as_str()) {
                    Target::LoginField(id.clone())
                } else if state.known_panel_ids.contains(id) {
                    Target::PanelById(id.clone())
                } else {
                    Target::Checkbox(id.clone())
                }
            }
            Locator::XPath(xpath) => parse_xpath(xpath),
            Locator::Css(css) => parse_css(css),
        }
    }

    fn exists(&self, target: &Target) -> bool {
        let state = self.state();
        let open = |id: &str| state.panels.iter().any(|p| p.id == id);
        match target {
            Target::FormTab => state.url.is_some(),
            Target::ReadyPanel(ordinal) => *ordinal < state.panels.len(),
            Target::PanelById(id) | Target::CollapseTitle(id) => open(id.as_str()),
            Target::PrimaryAction(id) | Target::SafeAction(id) => open(id.as_str()),
            Target::Field { panel, .. }
            | Target::AddButton { panel, .. }
            | Target::Row { panel, .. }
            | Target::AutocompleteResult { panel, .. } => open(panel.as_str()),
            Target::InlineButton { .. } | Target::PropertiesButton | Target::Checkbox(_) => {
                !state.panels.is_empty()
            }
            Target::MessageDialog | Target::ConfirmButton => state.pending_confirm.is_some(),
            Target::Notification(_) => state.mw_notifications > 0,
            Target::LoginField(_) => state
                .url
                .as_deref()
                .map(|u| u.ends_with("/wiki/Special:UserLogin"))
                .unwrap_or(false),
            Target::Unknown(_) => false,
        }
    }

    fn displayed(&self, target: &Target) -> bool {
        if !self.exists(target) {
            return false;
        }
        match target {
            Target::LoginField(id) => {
                !self.options.hidden_login_form || self.state().forced_visible.contains(id)
            }
            _ => true,
        }
    }

    fn element(&self, locator: &Locator) -> FakeElement {
        FakeElement {
            target: self.resolve(locator),
            locator: locator.clone(),
        }
    }

    fn open_panel(&self, state: &mut PageState, origin: Option<(String, String)>) {
        state.next_panel += 1;
        let id = format!("json-editor-{}", state.next_panel);
        state.known_panel_ids.insert(id.clone());
        state.panels.push(Panel {
            id,
            fields: BTreeMap::new(),
            origin,
        });
    }

    fn close_panel(&self, state: &mut PageState, id: &str, save: bool) {
        if !self.options.close_panels {
            return;
        }
        let Some(pos) = state.panels.iter().position(|p| p.id == id) else {
            return;
        };
        let panel = state.panels.remove(pos);
        if !save {
            return;
        }
        if let Some((parent, field)) = &panel.origin {
            let display = display_value(&panel.fields);
            if let Some(parent) = state.panels.iter_mut().find(|p| &p.id == parent) {
                parent.fields.insert(field.clone(), display);
            }
        }
        state.mw_notifications += 1;
        state.saved.push(panel);
    }
}

/// What a saved inline record shows in its parent's reference field
fn display_value(fields: &BTreeMap<String, String>) -> String {
    if let Some(label) = fields.get("root[label][0][text]") {
        return label.clone();
    }
    ["root[first_name]", "root[surname]"]
        .iter()
        .filter_map(|name| fields.get(*name))
        .filter(|v| !v.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}

fn between<'a>(s: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = s.find(start)? + start.len();
    let len = s[from..].find(end)?;
    Some(&s[from..from + len])
}

fn panel_prefix(css: &str) -> Option<String> {
    css.strip_prefix('#')
        .and_then(|rest| rest.split(' ').next())
        .map(str::to_string)
}

fn parse_css(css: &str) -> Target {
    let panel = panel_prefix(css);
    let path = between(css, r#"[data-schemapath=""#, r#""]"#).map(str::to_string);

    match (panel, path) {
        (Some(panel), Some(path)) => {
            if css.ends_with(".json-editor-btn-add") {
                Target::AddButton { panel, path }
            } else if let Some(index) = css.split("#autocomplete-result-").nth(1) {
                Target::AutocompleteResult {
                    panel,
                    path,
                    index: index.parse().unwrap_or(usize::MAX),
                }
            } else {
                Target::Row { panel, path }
            }
        }
        (None, Some(path)) if css.ends_with(".inline-edit-btn") => Target::InlineButton { path },
        (Some(panel), None) => {
            if let Some(name) = between(css, r#"[name=""#, r#""]"#) {
                Target::Field {
                    panel,
                    name: name.to_string(),
                }
            } else if css.ends_with(".card-title.level-1") {
                Target::CollapseTitle(panel)
            } else {
                Target::Unknown(css.to_string())
            }
        }
        _ => match css {
            ".je-ready" | ".je-ready .card-title" => Target::ReadyPanel(0),
            ".json-editor-btntype-properties" => Target::PropertiesButton,
            ".oo-ui-messageDialog-content" => Target::MessageDialog,
            _ => Target::Unknown(css.to_string()),
        },
    }
}

fn parse_xpath(xpath: &str) -> Target {
    if let Some(n) = between(xpath, r#"(//*[@class="je-ready"])["#, "]") {
        return match n.parse::<usize>() {
            Ok(n) if n > 0 => Target::ReadyPanel(n - 1),
            _ => Target::Unknown(xpath.to_string()),
        };
    }
    if xpath.contains("oo-ui-messageDialog-content") {
        return Target::ConfirmButton;
    }
    if let Some(panel) = between(xpath, r#"//*[@id=""#, r#""]"#) {
        if xpath.contains("oo-ui-processDialog-actions-primary") {
            return Target::PrimaryAction(panel.to_string());
        }
        if xpath.contains("oo-ui-processDialog-actions-safe") {
            return Target::SafeAction(panel.to_string());
        }
    }
    Target::Unknown(xpath.to_string())
}

#[async_trait]
impl Driver for FakeDriver {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> BrowserResult<()> {
        let mut state = self.state();
        state.events.push(format!("goto {}", url));
        state.url = Some(url.to_string());
        state.panels.clear();
        state.pending_confirm = None;
        Ok(())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        condition: WaitCondition,
        timeout: Duration,
    ) -> BrowserResult<FakeElement> {
        let element = self.element(locator);
        let ready = match condition {
            WaitCondition::Present => self.exists(&element.target),
            WaitCondition::Visible | WaitCondition::Clickable => self.displayed(&element.target),
        };
        if ready {
            Ok(element)
        } else {
            Err(BrowserError::NotFound {
                locator: locator.to_string(),
                timeout,
            })
        }
    }

    async fn wait_until_hidden(&self, locator: &Locator, timeout: Duration) -> BrowserResult<()> {
        let element = self.element(locator);
        if self.displayed(&element.target) {
            return Err(BrowserError::Timeout {
                locator: locator.to_string(),
                timeout,
            });
        }
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> BrowserResult<FakeElement> {
        let element = self.element(locator);
        if self.exists(&element.target) {
            Ok(element)
        } else {
            Err(BrowserError::NotFound {
                locator: locator.to_string(),
                timeout: Duration::ZERO,
            })
        }
    }

    async fn find_all(&self, locator: &Locator) -> BrowserResult<Vec<FakeElement>> {
        if let Locator::Css(css) = locator {
            if css.starts_with(".mw-notification-") {
                let count = if css.ends_with("title") {
                    self.state().mw_notifications
                } else {
                    0
                };
                return Ok((0..count)
                    .map(|i| FakeElement {
                        target: Target::Notification(i),
                        locator: locator.clone(),
                    })
                    .collect());
            }
        }
        let element = self.element(locator);
        if self.exists(&element.target) {
            Ok(vec![element])
        } else {
            Ok(vec![])
        }
    }

    async fn click(&self, element: &FakeElement) -> BrowserResult<()> {
        let mut state = self.state();
        state.events.push(format!("click {}", element.locator));

        match &element.target {
            Target::FormTab => {
                if self.options.render_forms {
                    state.panels.clear();
                    self.open_panel(&mut state, None);
                }
            }
            Target::InlineButton { path } => {
                let parent = state.panels.last().map(|p| p.id.clone());
                if let Some(parent) = parent.filter(|_| self.options.render_inline) {
                    self.open_panel(&mut state, Some((parent, schema_path_to_name(path))));
                }
            }
            Target::PrimaryAction(id) => {
                if self.options.confirm_dialog {
                    state.pending_confirm = Some(id.clone());
                } else {
                    self.close_panel(&mut state, id, true);
                }
            }
            Target::ConfirmButton => {
                if let Some(id) = state.pending_confirm.take() {
                    self.close_panel(&mut state, &id, true);
                }
            }
            Target::SafeAction(id) => self.close_panel(&mut state, id, false),
            Target::AddButton { path, .. } => state.array_items.push(path.clone()),
            Target::AutocompleteResult { panel, path, index } => {
                let name = schema_path_to_name(path);
                if let Some(p) = state.panels.iter_mut().find(|p| &p.id == panel) {
                    p.fields.insert(name, format!("Result {}", index));
                }
            }
            Target::Checkbox(id) => {
                if !state.checked.remove(id) {
                    state.checked.insert(id.clone());
                }
            }
            Target::LoginField(id) if id == "wpRemember" => {
                state.remember_me = !state.remember_me;
            }
            Target::LoginField(id) if id == "wpLoginAttempt" => state.login_submitted = true,
            Target::Notification(_) => {
                state.mw_notifications = state.mw_notifications.saturating_sub(1);
            }
            _ => {}
        }
        Ok(())
    }

    async fn clear(&self, element: &FakeElement) -> BrowserResult<()> {
        self.set_text(element, None);
        Ok(())
    }

    async fn send_keys(&self, element: &FakeElement, text: &str) -> BrowserResult<()> {
        self.set_text(element, Some(text));
        Ok(())
    }

    async fn is_selected(&self, element: &FakeElement) -> BrowserResult<bool> {
        let state = self.state();
        Ok(match &element.target {
            Target::Checkbox(id) => state.checked.contains(id),
            Target::LoginField(id) if id == "wpRemember" => state.remember_me,
            _ => false,
        })
    }

    async fn is_displayed(&self, element: &FakeElement) -> BrowserResult<bool> {
        Ok(self.displayed(&element.target))
    }

    async fn hover(&self, element: &FakeElement) -> BrowserResult<()> {
        self.state()
            .events
            .push(format!("hover {}", element.locator));
        Ok(())
    }

    async fn page_source(&self) -> BrowserResult<String> {
        let state = self.state();
        let main_page = state
            .url
            .as_deref()
            .map(|u| u.ends_with("/wiki/Main_Page"))
            .unwrap_or(false);
        Ok(if main_page && state.login_submitted {
            "<html><h1>Main Page</h1></html>".to_string()
        } else {
            "<html><h1>Login required</h1></html>".to_string()
        })
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> BrowserResult<Value> {
        let mut state = self.state();
        if script.contains("querySelectorAll('.je-ready')") {
            let ordinal = args.first().and_then(Value::as_u64).unwrap_or(0) as usize;
            return Ok(state
                .panels
                .get(ordinal)
                .map(|p| json!(p.id))
                .unwrap_or(Value::Null));
        }
        if script.contains("el.value") {
            let selector = args.first().and_then(Value::as_str).unwrap_or_default();
            let value = between(selector, r#"[name=""#, r#""]"#).and_then(|name| {
                state
                    .panels
                    .iter()
                    .find_map(|p| p.fields.get(name).cloned())
            });
            return Ok(value.map(Value::String).unwrap_or(Value::Null));
        }
        if script.contains("osw-toast") {
            let text = args.first().and_then(Value::as_str).unwrap_or_default();
            state.toasts.push(text.to_string());
        } else if script.contains("style.display = 'block'") {
            if let Some(id) = args.first().and_then(Value::as_str) {
                state.forced_visible.insert(id.to_string());
            }
        } else if script.contains("osw-cursor") {
            state.events.push("cursor".to_string());
        }
        Ok(Value::Null)
    }

    async fn execute_on(&self, script: &str, _element: &FakeElement) -> BrowserResult<Value> {
        if script.contains("getBoundingClientRect") {
            return Ok(json!(true));
        }
        Ok(Value::Null)
    }

    async fn quit(&self) -> BrowserResult<()> {
        self.state().quit = true;
        Ok(())
    }
}

impl FakeDriver {
    fn set_text(&self, element: &FakeElement, text: Option<&str>) {
        let mut state = self.state();
        match &element.target {
            Target::Field { panel, name } => {
                if let Some(p) = state.panels.iter_mut().find(|p| &p.id == panel) {
                    let value = p.fields.entry(name.clone()).or_default();
                    match text {
                        Some(text) => value.push_str(text),
                        None => value.clear(),
                    }
                }
            }
            Target::LoginField(id) => {
                let value = state.login_fields.entry(id.clone()).or_default();
                match text {
                    Some(text) => value.push_str(text),
                    None => value.clear(),
                }
            }
            Target::Row { .. } => {
                if let Some(text) = text {
                    state.autocomplete_queries.push(text.to_string());
                }
            }
            _ => {}
        }
    }
}

pub fn test_config() -> Arc<OswConfig> {
    Arc::new(OswConfig {
        base_url: "http://wiki.test/".to_string(),
        admin_username: "Admin".to_string(),
        admin_password: "secret".to_string(),
        ..Default::default()
    })
}
