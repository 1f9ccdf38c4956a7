//! Nesting state of JSON-editor panels
//!
//! A top-level create/edit form is level 0; every inline editor opened from
//! inside it adds one level. Each level keeps the DOM id its panel had when
//! it opened, so later operations address the panel by that handle instead
//! of by its position among the rendered panels.

use std::fmt;

use crate::error::{BrowserError, BrowserResult};

/// DOM id of a ready editor panel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        PanelId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stack of open editor panels, innermost last
#[derive(Debug, Default, Clone)]
pub struct EditorStack {
    panels: Vec<PanelId>,
}

impl EditorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting level, -1 when no editor is open
    pub fn level(&self) -> i32 {
        self.panels.len() as i32 - 1
    }

    /// Number of open panels
    pub fn depth(&self) -> usize {
        self.panels.len()
    }

    /// Panel the next field operation applies to
    pub fn current(&self) -> Option<&PanelId> {
        self.panels.last()
    }

    /// Like [`current`](Self::current), failing when nothing is open
    pub fn require_current(&self, operation: &str) -> BrowserResult<&PanelId> {
        self.current().ok_or_else(|| {
            BrowserError::InvalidState(format!("{}: no editor is open", operation))
        })
    }

    pub fn panels(&self) -> &[PanelId] {
        &self.panels
    }

    /// Record a newly opened panel, returning the new level
    pub fn push(&mut self, panel: PanelId) -> i32 {
        self.panels.push(panel);
        self.level()
    }

    /// Remove the innermost panel
    pub fn pop(&mut self) -> BrowserResult<PanelId> {
        self.panels
            .pop()
            .ok_or_else(|| BrowserError::InvalidState("no editor is open".to_string()))
    }

    /// Forget all panels (a new top-level form replaces any prior nesting)
    pub fn reset(&mut self) {
        self.panels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack() {
        let stack = EditorStack::new();
        assert_eq!(stack.level(), -1);
        assert!(stack.current().is_none());
        assert!(matches!(
            stack.require_current("fill"),
            Err(BrowserError::InvalidState(_))
        ));
    }

    #[test]
    fn test_push_pop_tracks_level_and_current() {
        let mut stack = EditorStack::new();
        assert_eq!(stack.push(PanelId::new("editor-a")), 0);
        assert_eq!(stack.push(PanelId::new("editor-b")), 1);
        assert_eq!(stack.current().unwrap().as_str(), "editor-b");

        assert_eq!(stack.pop().unwrap().as_str(), "editor-b");
        assert_eq!(stack.level(), 0);
        assert_eq!(stack.current().unwrap().as_str(), "editor-a");

        stack.pop().unwrap();
        assert_eq!(stack.level(), -1);
        assert!(matches!(stack.pop(), Err(BrowserError::InvalidState(_))));
    }

    #[test]
    fn test_reset_discards_nesting() {
        let mut stack = EditorStack::new();
        stack.push(PanelId::new("a"));
        stack.push(PanelId::new("b"));
        stack.reset();
        assert_eq!(stack.level(), -1);
        assert_eq!(stack.depth(), 0);
    }
}
