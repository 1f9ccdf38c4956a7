//! WebDriver browser automation via fantoccini

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use osw_common::{BrowserKind, OswConfig};

use crate::driver::{Driver, Locator, WaitCondition};
use crate::error::{BrowserError, BrowserResult};

/// Interval between polls while waiting on an element
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Reports whether the element matched by (kind, value) is displayed
const ELEMENT_VISIBLE_JS: &str = r#"
var kind = arguments[0], value = arguments[1], el = null;
if (kind === 'id') {
    el = document.getElementById(value);
} else if (kind === 'xpath') {
    el = document.evaluate(value, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
} else {
    el = document.querySelector(value);
}
if (!el) return false;
var style = window.getComputedStyle(el);
return style.display !== 'none' && style.visibility !== 'hidden' && el.getClientRects().length > 0;
"#;

/// Fires a mousemove at the element centre so pointer overlays follow it
const HOVER_JS: &str = r#"
var el = arguments[0];
var rect = el.getBoundingClientRect();
el.dispatchEvent(new MouseEvent('mousemove', {
    bubbles: true,
    clientX: rect.left + rect.width / 2,
    clientY: rect.top + rect.height / 2
}));
"#;

/// Live browser session
pub struct WebDriverSession {
    client: Client,
    implicit_wait: Duration,
}

impl WebDriverSession {
    /// Connect to the configured WebDriver endpoint and start a browser
    pub async fn connect(config: &OswConfig) -> BrowserResult<Self> {
        let url = config.webdriver_url();
        info!("Connecting to {} WebDriver at {}", config.browser, url);

        let client = ClientBuilder::rustls()
            .capabilities(capabilities(config))
            .connect(url)
            .await
            .map_err(|e| BrowserError::Session {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        // Chrome gets its size from --window-size
        if config.browser == BrowserKind::Firefox {
            debug!(
                "Setting window size to {}x{}",
                config.window_width, config.window_height
            );
            client
                .set_window_size(config.window_width, config.window_height)
                .await?;
        }

        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                None,
                Some(config.implicit_wait),
            ))
            .await?;

        Ok(Self {
            client,
            implicit_wait: config.implicit_wait,
        })
    }

    /// Underlying fantoccini client
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn is_visible(&self, locator: &Locator) -> BrowserResult<bool> {
        let visible = self
            .client
            .execute(
                ELEMENT_VISIBLE_JS,
                vec![json!(locator.kind()), json!(locator.value())],
            )
            .await?;
        Ok(visible.as_bool().unwrap_or(false))
    }
}

/// Build the W3C capabilities for the configured browser
pub fn capabilities(config: &OswConfig) -> Map<String, Value> {
    let mut caps = Map::new();

    match config.browser {
        BrowserKind::Chrome => {
            let mut args = Vec::new();
            if config.headless {
                args.push("--headless=new".to_string());
                args.push("--no-sandbox".to_string());
                args.push("--disable-dev-shm-usage".to_string());
            }
            args.push(format!(
                "--window-size={},{}",
                config.window_width, config.window_height
            ));
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            let mut args = Vec::new();
            if config.headless {
                args.push("--headless".to_string());
            }
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }

    caps.insert(
        "acceptInsecureCerts".to_string(),
        json!(config.accept_insecure_certs),
    );
    caps
}

fn to_fantoccini(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator {
        Locator::Css(v) => fantoccini::Locator::Css(v),
        Locator::Id(v) => fantoccini::Locator::Id(v),
        Locator::XPath(v) => fantoccini::Locator::XPath(v),
    }
}

/// Poll `probe` until it yields `Some` or `timeout` elapses
async fn poll_until<T, F, Fut>(timeout: Duration, mut probe: F) -> BrowserResult<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BrowserResult<Option<T>>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[async_trait]
impl Driver for WebDriverSession {
    type Element = Element;

    async fn goto(&self, url: &str) -> BrowserResult<()> {
        info!("Navigating to {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        condition: WaitCondition,
        timeout: Duration,
    ) -> BrowserResult<Element> {
        debug!("Waiting up to {:?} for {} ({:?})", timeout, locator, condition);
        let start = Instant::now();
        let not_found = || BrowserError::NotFound {
            locator: locator.to_string(),
            timeout,
        };

        let element = match self
            .client
            .wait()
            .at_most(timeout)
            .every(POLL_INTERVAL)
            .for_element(to_fantoccini(locator))
            .await
        {
            Ok(element) => element,
            Err(CmdError::WaitTimeout) => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        if condition == WaitCondition::Present {
            return Ok(element);
        }

        let remaining = timeout.saturating_sub(start.elapsed());
        let ready = poll_until(remaining, move || {
            let element = element.clone();
            async move {
                let mut ready = element.is_displayed().await?;
                if ready && condition == WaitCondition::Clickable {
                    ready = element.is_enabled().await?;
                }
                Ok::<_, BrowserError>(ready.then_some(element))
            }
        })
        .await?;

        ready.ok_or_else(not_found)
    }

    async fn wait_until_hidden(&self, locator: &Locator, timeout: Duration) -> BrowserResult<()> {
        debug!("Waiting up to {:?} for {} to disappear", timeout, locator);
        let hidden = poll_until(timeout, move || async move {
            let visible = self.is_visible(locator).await?;
            Ok::<_, BrowserError>((!visible).then_some(()))
        })
        .await?;

        hidden.ok_or_else(|| BrowserError::Timeout {
            locator: locator.to_string(),
            timeout,
        })
    }

    async fn find(&self, locator: &Locator) -> BrowserResult<Element> {
        match self.client.find(to_fantoccini(locator)).await {
            Ok(element) => Ok(element),
            Err(e) if e.is_no_such_element() => Err(BrowserError::NotFound {
                locator: locator.to_string(),
                timeout: self.implicit_wait,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&self, locator: &Locator) -> BrowserResult<Vec<Element>> {
        Ok(self.client.find_all(to_fantoccini(locator)).await?)
    }

    async fn click(&self, element: &Element) -> BrowserResult<()> {
        element.click().await?;
        Ok(())
    }

    async fn clear(&self, element: &Element) -> BrowserResult<()> {
        element.clear().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &Element, text: &str) -> BrowserResult<()> {
        element.send_keys(text).await?;
        Ok(())
    }

    async fn is_selected(&self, element: &Element) -> BrowserResult<bool> {
        Ok(element.is_selected().await?)
    }

    async fn is_displayed(&self, element: &Element) -> BrowserResult<bool> {
        Ok(element.is_displayed().await?)
    }

    async fn hover(&self, element: &Element) -> BrowserResult<()> {
        self.execute_on(HOVER_JS, element).await?;
        Ok(())
    }

    async fn page_source(&self) -> BrowserResult<String> {
        Ok(self.client.source().await?)
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> BrowserResult<Value> {
        Ok(self.client.execute(script, args).await?)
    }

    async fn execute_on(&self, script: &str, element: &Element) -> BrowserResult<Value> {
        let arg = serde_json::to_value(element)?;
        Ok(self.client.execute(script, vec![arg]).await?)
    }

    async fn quit(&self) -> BrowserResult<()> {
        info!("Closing browser session");
        self.client.clone().close().await?;
        Ok(())
    }
}
