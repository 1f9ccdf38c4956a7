//! CLI Commands

pub mod config;
pub mod login;
pub mod path;
pub mod run;

use std::sync::Arc;

use anyhow::Result;
use osw_browser::WebDriverSession;
use osw_common::OswConfig;

/// Start a browser for a command
pub(crate) async fn connect(config: &OswConfig) -> Result<Arc<WebDriverSession>> {
    let session = WebDriverSession::connect(config).await?;
    Ok(Arc::new(session))
}
