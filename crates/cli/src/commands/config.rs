//! Config Command

use anyhow::Result;
use serde::Serialize;

use osw_common::OswConfig;

use crate::output::{print_item, OutputFormat, TableDisplay};

/// Effective configuration, with the password reduced to set / not set
#[derive(Serialize)]
pub struct ConfigDisplay {
    pub base_url: String,
    pub admin_username: String,
    pub admin_password_set: bool,
    pub browser: String,
    pub headless: bool,
    pub implicit_wait_secs: u64,
    pub window: String,
    pub accept_insecure_certs: bool,
    pub webdriver_url: String,
}

impl From<&OswConfig> for ConfigDisplay {
    fn from(config: &OswConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            admin_username: config.admin_username.clone(),
            admin_password_set: !config.admin_password.is_empty(),
            browser: config.browser.to_string(),
            headless: config.headless,
            implicit_wait_secs: config.implicit_wait.as_secs(),
            window: format!("{}x{}", config.window_width, config.window_height),
            accept_insecure_certs: config.accept_insecure_certs,
            webdriver_url: config.webdriver_url().to_string(),
        }
    }
}

impl TableDisplay for ConfigDisplay {
    fn headers() -> Vec<&'static str> {
        vec![
            "Base URL",
            "User",
            "Password",
            "Browser",
            "Headless",
            "Implicit Wait",
            "Window",
            "Insecure Certs",
            "WebDriver",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.base_url.clone(),
            self.admin_username.clone(),
            if self.admin_password_set { "set" } else { "not set" }.to_string(),
            self.browser.clone(),
            self.headless.to_string(),
            format!("{}s", self.implicit_wait_secs),
            self.window.clone(),
            self.accept_insecure_certs.to_string(),
            self.webdriver_url.clone(),
        ]
    }
}

pub fn execute(config: &OswConfig, format: OutputFormat) -> Result<()> {
    print_item(&ConfigDisplay::from(config), format)
}
