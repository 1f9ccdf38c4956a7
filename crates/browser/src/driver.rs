//! The browser capability consumed by the page objects
//!
//! Page objects never talk to WebDriver directly; they go through [`Driver`],
//! which the fantoccini-backed [`WebDriverSession`](crate::webdriver::WebDriverSession)
//! implements for real browsers and which tests implement in memory.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BrowserResult;

/// How to find an element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    Id(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Locator::XPath(xpath.into())
    }

    /// Locator strategy name, as understood by the visibility probe script
    pub fn kind(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css",
            Locator::Id(_) => "id",
            Locator::XPath(_) => "xpath",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Locator::Css(v) | Locator::Id(v) | Locator::XPath(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind(), self.value())
    }
}

/// State an element must reach before a wait succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// Attached to the DOM
    Present,
    /// Attached and displayed
    Visible,
    /// Displayed and enabled
    Clickable,
}

/// Browser session operations used by the page objects.
///
/// Waits are bounded: a wait that runs out of time fails with
/// [`BrowserError::NotFound`](crate::error::BrowserError::NotFound), or
/// [`BrowserError::Timeout`](crate::error::BrowserError::Timeout) when
/// waiting for something to disappear. Implementations do not retry.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Handle to an element found in the current page
    type Element: Clone + Send + Sync;

    /// Load a URL
    async fn goto(&self, url: &str) -> BrowserResult<()>;

    /// Wait until an element matching `locator` satisfies `condition`
    async fn wait_for(
        &self,
        locator: &Locator,
        condition: WaitCondition,
        timeout: Duration,
    ) -> BrowserResult<Self::Element>;

    /// Wait until no element matching `locator` is visible
    async fn wait_until_hidden(&self, locator: &Locator, timeout: Duration) -> BrowserResult<()>;

    /// Find one element without an explicit wait
    async fn find(&self, locator: &Locator) -> BrowserResult<Self::Element>;

    /// Find all matching elements (possibly none)
    async fn find_all(&self, locator: &Locator) -> BrowserResult<Vec<Self::Element>>;

    async fn click(&self, element: &Self::Element) -> BrowserResult<()>;

    async fn clear(&self, element: &Self::Element) -> BrowserResult<()>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> BrowserResult<()>;

    async fn is_selected(&self, element: &Self::Element) -> BrowserResult<bool>;

    async fn is_displayed(&self, element: &Self::Element) -> BrowserResult<bool>;

    /// Move the pointer over an element
    async fn hover(&self, element: &Self::Element) -> BrowserResult<()>;

    /// HTML of the current page
    async fn page_source(&self) -> BrowserResult<String>;

    /// Run a script; `args` are available as `arguments[i]`
    async fn execute(&self, script: &str, args: Vec<Value>) -> BrowserResult<Value>;

    /// Run a script with `element` bound to `arguments[0]`
    async fn execute_on(&self, script: &str, element: &Self::Element) -> BrowserResult<Value>;

    /// End the browser session
    async fn quit(&self) -> BrowserResult<()>;
}
