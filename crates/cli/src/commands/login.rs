//! Login Command

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;

use osw_browser::{Driver, LoginPage};
use osw_common::OswConfig;

use crate::output::print_success;

#[derive(Args)]
pub struct LoginArgs {
    /// Use the hidden login form (OIDC setups)
    #[arg(long)]
    hidden: bool,

    /// Load the main page afterwards and check that it rendered
    #[arg(long)]
    verify: bool,

    /// Username (defaults to the configured admin)
    #[arg(long)]
    username: Option<String>,
}

pub async fn execute(args: &LoginArgs, config: OswConfig) -> Result<()> {
    let config = Arc::new(config);
    let session = super::connect(&config).await?;

    let outcome = login(args, LoginPage::new(session.clone(), config.clone())).await;
    session.quit().await?;
    outcome
}

async fn login<D: Driver>(args: &LoginArgs, page: LoginPage<D>) -> Result<()> {
    let username = args.username.as_deref();
    if args.hidden {
        page.login_hidden(username, None).await?;
    } else {
        page.login(username, None).await?;
    }

    if args.verify {
        if !page.verify_main_page().await? {
            bail!("Main Page not found after login");
        }
        print_success("Login successful, Main Page loaded");
    } else {
        print_success("Login submitted");
    }
    Ok(())
}
