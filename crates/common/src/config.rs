//! Test configuration
//!
//! [`OswConfig`] is built once at startup and then only read. Values come
//! from, in increasing precedence: built-in defaults, an optional TOML file,
//! and an environment mapping (`MW_SITE_SERVER`, `MW_ADMIN_PASS`,
//! `OSW_BROWSER`, `OSW_HEADLESS`, ...).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

pub const ENV_SITE_SERVER: &str = "MW_SITE_SERVER";
pub const ENV_ADMIN_PASS: &str = "MW_ADMIN_PASS";
pub const ENV_ADMIN_USER: &str = "OSW_ADMIN_USER";
pub const ENV_BROWSER: &str = "OSW_BROWSER";
pub const ENV_HEADLESS: &str = "OSW_HEADLESS";
pub const ENV_IMPLICIT_WAIT: &str = "OSW_IMPLICIT_WAIT";
pub const ENV_WINDOW_WIDTH: &str = "OSW_WINDOW_WIDTH";
pub const ENV_WINDOW_HEIGHT: &str = "OSW_WINDOW_HEIGHT";
pub const ENV_ACCEPT_INSECURE_CERTS: &str = "OSW_ACCEPT_INSECURE_CERTS";
pub const ENV_WEBDRIVER_URL: &str = "OSW_WEBDRIVER_URL";

/// Browser to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }

    /// Where chromedriver / geckodriver listen by default
    pub fn default_webdriver_url(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "http://localhost:9515",
            BrowserKind::Firefox => "http://localhost:4444",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            _ => Err(Error::UnsupportedBrowser(s.to_string())),
        }
    }
}

impl TryFrom<String> for BrowserKind {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Configuration for driving an OSW instance
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OswConfig {
    /// MediaWiki site URL
    pub base_url: String,

    /// Admin account name
    pub admin_username: String,

    /// Admin password, never written back out
    #[serde(skip_serializing)]
    pub admin_password: String,

    /// Browser to launch
    pub browser: BrowserKind,

    /// Run without a visible window
    pub headless: bool,

    /// WebDriver implicit wait
    #[serde(with = "duration_secs")]
    pub implicit_wait: Duration,

    /// Browser window size
    pub window_width: u32,
    pub window_height: u32,

    /// Accept self-signed TLS certificates
    pub accept_insecure_certs: bool,

    /// WebDriver endpoint; `None` uses the browser's default port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webdriver_url: Option<String>,
}

impl Default for OswConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            admin_username: "Admin".to_string(),
            admin_password: String::new(),
            browser: BrowserKind::Chrome,
            headless: false,
            implicit_wait: Duration::from_secs(10),
            window_width: 1280,
            window_height: 1024,
            accept_insecure_certs: true,
            webdriver_url: None,
        }
    }
}

impl fmt::Debug for OswConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OswConfig")
            .field("base_url", &self.base_url)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("browser", &self.browser)
            .field("headless", &self.headless)
            .field("implicit_wait", &self.implicit_wait)
            .field("window_width", &self.window_width)
            .field("window_height", &self.window_height)
            .field("accept_insecure_certs", &self.accept_insecure_certs)
            .field("webdriver_url", &self.webdriver_url)
            .finish()
    }
}

impl OswConfig {
    /// Build a config from defaults plus an explicit environment mapping
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self> {
        Self::default().with_env(env)
    }

    /// Build a config from the process environment, loading `.env` first
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Load a TOML file (if it exists) and apply the process environment on top
    pub fn load(path: &Path) -> Result<Self> {
        let base = Self::from_file(path)?;
        if let Ok(env_path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", env_path.display());
        }
        base.with_env(&std::env::vars().collect())
    }

    /// Load variables from a dotenv file into the process environment.
    /// Variables that are already set are kept.
    pub fn load_env_file(path: &Path) -> Result<()> {
        dotenvy::from_path(path).map_err(|e| {
            Error::invalid_config("env_file", &path.display().to_string(), e.to_string())
        })?;
        debug!("Loaded environment from {}", path.display());
        Ok(())
    }

    /// Load a TOML file, falling back to defaults when it does not exist
    pub fn from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Reading config file {}", path.display());
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Override fields that are present in `env`
    pub fn with_env(mut self, env: &HashMap<String, String>) -> Result<Self> {
        if let Some(url) = env.get(ENV_SITE_SERVER) {
            self.base_url = url.clone();
        }
        if let Some(pass) = env.get(ENV_ADMIN_PASS) {
            self.admin_password = pass.clone();
        }
        if let Some(user) = env.get(ENV_ADMIN_USER) {
            self.admin_username = user.clone();
        }
        if let Some(browser) = env.get(ENV_BROWSER) {
            self.browser = browser.parse()?;
        }
        if let Some(headless) = env.get(ENV_HEADLESS) {
            self.headless = headless.trim().eq_ignore_ascii_case("true");
        }
        if let Some(secs) = env.get(ENV_IMPLICIT_WAIT) {
            self.implicit_wait = Duration::from_secs(parse_number(ENV_IMPLICIT_WAIT, secs)?);
        }
        if let Some(width) = env.get(ENV_WINDOW_WIDTH) {
            self.window_width = parse_number(ENV_WINDOW_WIDTH, width)?;
        }
        if let Some(height) = env.get(ENV_WINDOW_HEIGHT) {
            self.window_height = parse_number(ENV_WINDOW_HEIGHT, height)?;
        }
        if let Some(accept) = env.get(ENV_ACCEPT_INSECURE_CERTS) {
            self.accept_insecure_certs = parse_bool(ENV_ACCEPT_INSECURE_CERTS, accept)?;
        }
        if let Some(url) = env.get(ENV_WEBDRIVER_URL) {
            self.webdriver_url = Some(url.clone());
        }
        Ok(self)
    }

    /// Absolute URL for a site path such as `/wiki/Main_Page`
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Effective WebDriver endpoint
    pub fn webdriver_url(&self) -> &str {
        self.webdriver_url
            .as_deref()
            .unwrap_or_else(|| self.browser.default_webdriver_url())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_config(key, value, "expected a non-negative integer"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::invalid_config(key, value, "expected true or false")),
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
