//! Shared browser interaction helpers for all pages

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use osw_common::OswConfig;

use crate::driver::{Driver, Locator, WaitCondition};
use crate::error::{BrowserError, BrowserResult};

/// Explicit wait used when a call does not override it
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long toasts stay on screen
pub const DEFAULT_NOTIFICATION_MS: u64 = 3000;

const NOTIFICATION_SELECTORS: [&str; 2] = [".mw-notification-title", ".mw-notification-content"];

/// Adds a pointer overlay that follows mousemove events, for screen recordings
const ENABLE_CURSOR_JS: &str = r#"
if (document.getElementById('osw-cursor')) return;
var dot = document.createElement('div');
dot.id = 'osw-cursor';
dot.style.cssText = 'position:absolute; z-index:2147483647; pointer-events:none; left:0; top:0;'
    + ' width:16px; height:16px; margin:-8px 0 0 -8px; border-radius:50%;'
    + ' background:rgba(220,40,40,0.6); border:2px solid #fff;';
document.body.appendChild(dot);
document.addEventListener('mousemove', function (e) {
    dot.style.left = e.pageX + 'px';
    dot.style.top = e.pageY + 'px';
});
"#;

/// arguments: [text, timeout_ms]
const NOTIFICATION_JS: &str = r#"
var text = arguments[0], timeout = arguments[1];
var toast = document.getElementById('osw-toast');
if (!toast) {
    toast = document.createElement('div');
    toast.id = 'osw-toast';
    toast.style.cssText = 'min-width:300px; background-color:#333; color:#fff; text-align:center;'
        + ' border-radius:2px; padding:8px; position:fixed; z-index:1000; left:50%;'
        + ' bottom:15px; margin-left:-150px;';
    document.body.appendChild(toast);
}
toast.style.visibility = 'visible';
toast.textContent = text;
setTimeout(function () { toast.style.visibility = 'hidden'; }, timeout);
"#;

const IN_VIEWPORT_JS: &str = r#"
var rect = arguments[0].getBoundingClientRect();
return rect.top >= 0
    && rect.left >= 0
    && rect.bottom <= (window.innerHeight || document.documentElement.clientHeight)
    && rect.right <= (window.innerWidth || document.documentElement.clientWidth);
"#;

const SCROLL_INTO_VIEW_JS: &str = "arguments[0].scrollIntoView({block: 'center'});";

/// Page object base: a driver, the site config and a default timeout
pub struct BasePage<D: Driver> {
    driver: Arc<D>,
    config: Arc<OswConfig>,
    timeout: Duration,
}

impl<D: Driver> BasePage<D> {
    pub fn new(driver: Arc<D>, config: Arc<OswConfig>) -> Self {
        Self::with_timeout(driver, config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(driver: Arc<D>, config: Arc<OswConfig>, timeout: Duration) -> Self {
        Self {
            driver,
            config,
            timeout,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &OswConfig {
        &self.config
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // --- Navigation ---

    /// Navigate to a path relative to the base URL, e.g. `/wiki/Main_Page`
    pub async fn navigate_to(&self, path: &str) -> BrowserResult<()> {
        self.driver.goto(&self.config.url_for(path)).await
    }

    // --- Waiting ---

    pub async fn wait_for_element(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> BrowserResult<D::Element> {
        self.wait(locator, WaitCondition::Present, timeout).await
    }

    pub async fn wait_for_visible(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> BrowserResult<D::Element> {
        self.wait(locator, WaitCondition::Visible, timeout).await
    }

    pub async fn wait_for_clickable(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> BrowserResult<D::Element> {
        self.wait(locator, WaitCondition::Clickable, timeout).await
    }

    /// Wait for an element to become invisible or absent
    pub async fn wait_for_invisible(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> BrowserResult<()> {
        self.driver
            .wait_until_hidden(locator, timeout.unwrap_or(self.timeout))
            .await
    }

    async fn wait(
        &self,
        locator: &Locator,
        condition: WaitCondition,
        timeout: Option<Duration>,
    ) -> BrowserResult<D::Element> {
        self.driver
            .wait_for(locator, condition, timeout.unwrap_or(self.timeout))
            .await
    }

    // --- Element queries ---

    pub async fn find_element(&self, locator: &Locator) -> BrowserResult<D::Element> {
        self.driver.find(locator).await
    }

    pub async fn find_elements(&self, locator: &Locator) -> BrowserResult<Vec<D::Element>> {
        self.driver.find_all(locator).await
    }

    /// Number of displayed elements matching a CSS selector
    pub async fn count_visible_elements(&self, css: &str) -> BrowserResult<usize> {
        let mut count = 0;
        for element in self.find_elements(&Locator::css(css)).await? {
            if self.driver.is_displayed(&element).await? {
                count += 1;
            }
        }
        Ok(count)
    }

    // --- Interaction ---

    pub async fn click(&self, locator: &Locator) -> BrowserResult<()> {
        let element = self.wait_for_clickable(locator, None).await?;
        self.driver.click(&element).await
    }

    /// Clear a text field and type `value`
    pub async fn fill_field(&self, locator: &Locator, value: &str) -> BrowserResult<()> {
        let element = self.wait_for_visible(locator, None).await?;
        self.driver.clear(&element).await?;
        self.driver.send_keys(&element, value).await
    }

    /// Check a checkbox unless it is already checked
    pub async fn check_option(&self, locator: &Locator) -> BrowserResult<()> {
        let element = self.wait_for_clickable(locator, None).await?;
        if !self.driver.is_selected(&element).await? {
            self.driver.click(&element).await?;
        }
        Ok(())
    }

    // --- Scroll + interaction combos ---

    pub async fn is_element_in_viewport(&self, element: &D::Element) -> BrowserResult<bool> {
        let inside = self.driver.execute_on(IN_VIEWPORT_JS, element).await?;
        Ok(inside.as_bool().unwrap_or(false))
    }

    pub async fn scroll_into_view(&self, element: &D::Element) -> BrowserResult<()> {
        self.driver.execute_on(SCROLL_INTO_VIEW_JS, element).await?;
        Ok(())
    }

    pub async fn move_to_element(&self, element: &D::Element) -> BrowserResult<()> {
        self.driver.hover(element).await
    }

    /// Wait for an element, bring it into view and move the pointer onto it
    pub async fn scroll_and_move(&self, locator: &Locator) -> BrowserResult<D::Element> {
        debug!("Scrolling to {}", locator);
        let element = self.wait_for_element(locator, None).await?;
        if !self.is_element_in_viewport(&element).await? {
            self.scroll_into_view(&element).await?;
        }
        self.move_to_element(&element).await?;
        Ok(element)
    }

    pub async fn scroll_and_click(&self, locator: &Locator) -> BrowserResult<()> {
        let element = self.scroll_and_move(locator).await?;
        self.driver.click(&element).await
    }

    pub async fn scroll_and_fill(&self, locator: &Locator, value: &str) -> BrowserResult<()> {
        let element = self.scroll_and_move(locator).await?;
        self.driver.clear(&element).await?;
        self.driver.send_keys(&element, value).await
    }

    pub async fn scroll_and_check(&self, locator: &Locator) -> BrowserResult<()> {
        let element = self.scroll_and_move(locator).await?;
        if !self.driver.is_selected(&element).await? {
            self.driver.click(&element).await?;
        }
        Ok(())
    }

    pub async fn page_source(&self) -> BrowserResult<String> {
        self.driver.page_source().await
    }

    // --- JavaScript execution ---

    pub async fn execute_js(&self, script: &str, args: Vec<Value>) -> BrowserResult<Value> {
        self.driver.execute(script, args).await
    }

    /// Show a pointer overlay, useful when recording a session
    pub async fn enable_cursor(&self) -> BrowserResult<()> {
        self.driver.execute(ENABLE_CURSOR_JS, vec![]).await?;
        Ok(())
    }

    /// Show a toast message at the bottom of the page
    pub async fn add_notification(&self, text: &str, timeout_ms: u64) -> BrowserResult<()> {
        self.driver
            .execute(NOTIFICATION_JS, vec![json!(text), json!(timeout_ms)])
            .await?;
        Ok(())
    }

    /// Click away any visible MediaWiki notifications
    pub async fn dismiss_notifications(&self) -> BrowserResult<()> {
        for selector in NOTIFICATION_SELECTORS {
            for element in self.find_elements(&Locator::css(selector)).await? {
                if !self.driver.is_displayed(&element).await.unwrap_or(false) {
                    continue;
                }
                if let Err(e) = self.driver.click(&element).await {
                    warn!("Could not dismiss notification {}: {}", selector, e);
                }
            }
        }
        Ok(())
    }

    /// Fixed sleep; prefer explicit waits
    pub async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Read a script result as a non-empty string
pub(crate) fn expect_string(value: Value, what: &str) -> BrowserResult<String> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(s),
        other => Err(BrowserError::Script(format!(
            "expected {} to be a string, got {}",
            what, other
        ))),
    }
}
