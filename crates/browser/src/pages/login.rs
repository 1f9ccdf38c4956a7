//! MediaWiki login page

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use osw_common::OswConfig;

use crate::driver::{Driver, Locator};
use crate::error::BrowserResult;
use crate::pages::base::BasePage;

pub const URL_PATH: &str = "/wiki/Special:UserLogin";

/// Page checked after logging in
pub const MAIN_PAGE_PATH: &str = "/wiki/Main_Page";
const MAIN_PAGE_MARKER: &str = "Main Page";

pub const USERNAME_FIELD: &str = "wpName1";
pub const PASSWORD_FIELD: &str = "wpPassword1";
pub const REMEMBER_ME: &str = "wpRemember";
pub const LOGIN_BUTTON: &str = "wpLoginAttempt";

/// arguments: [element id]
const FORCE_VISIBLE_JS: &str = "var el = document.getElementById(arguments[0]); \
     if (el) { el.style.display = 'block'; }";

/// Standard and hidden-form (OIDC) login
pub struct LoginPage<D: Driver> {
    page: BasePage<D>,
}

impl<D: Driver> LoginPage<D> {
    pub fn new(driver: Arc<D>, config: Arc<OswConfig>) -> Self {
        Self {
            page: BasePage::new(driver, config),
        }
    }

    pub fn page(&self) -> &BasePage<D> {
        &self.page
    }

    fn credentials<'a>(
        &'a self,
        username: Option<&'a str>,
        password: Option<&'a str>,
    ) -> (&'a str, &'a str) {
        let config = self.page.config();
        (
            username.unwrap_or(&config.admin_username),
            password.unwrap_or(&config.admin_password),
        )
    }

    /// Log in through the visible login form. Credentials default to the
    /// configured admin account.
    pub async fn login(&self, username: Option<&str>, password: Option<&str>) -> BrowserResult<()> {
        let (username, password) = self.credentials(username, password);
        info!("Logging in as {}", username);

        self.page.navigate_to(URL_PATH).await?;
        self.page.enable_cursor().await?;
        self.page
            .scroll_and_fill(&Locator::id(USERNAME_FIELD), username)
            .await?;
        self.page
            .scroll_and_fill(&Locator::id(PASSWORD_FIELD), password)
            .await?;
        self.page.scroll_and_check(&Locator::id(REMEMBER_ME)).await?;
        self.page.scroll_and_click(&Locator::id(LOGIN_BUTTON)).await
    }

    /// Log in on sites where the local login form is hidden (OIDC setups)
    pub async fn login_hidden(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> BrowserResult<()> {
        let (username, password) = self.credentials(username, password);
        info!("Logging in as {} through the hidden form", username);

        self.page.navigate_to(URL_PATH).await?;
        for id in [USERNAME_FIELD, PASSWORD_FIELD, REMEMBER_ME, LOGIN_BUTTON] {
            self.page.execute_js(FORCE_VISIBLE_JS, vec![json!(id)]).await?;
        }

        self.page
            .fill_field(&Locator::id(USERNAME_FIELD), username)
            .await?;
        self.page
            .fill_field(&Locator::id(PASSWORD_FIELD), password)
            .await?;
        self.page.check_option(&Locator::id(REMEMBER_ME)).await?;
        self.page.click(&Locator::id(LOGIN_BUTTON)).await
    }

    /// Load the main page and report whether it rendered
    pub async fn verify_main_page(&self) -> BrowserResult<bool> {
        self.page.navigate_to(MAIN_PAGE_PATH).await?;
        let found = self.page.page_source().await?.contains(MAIN_PAGE_MARKER);
        info!("Main page {}", if found { "loaded" } else { "not found" });
        Ok(found)
    }
}
