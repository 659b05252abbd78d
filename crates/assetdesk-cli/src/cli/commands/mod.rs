//! CLI command handlers.

use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use assetdesk_core::api::ApiClient;
use assetdesk_core::auth::{AuthController, Page};
use assetdesk_core::config::Config;
use assetdesk_core::controllers::{Controller, FieldEdits};
use assetdesk_core::runtime::Runtime;
use assetdesk_core::session::{FileSessionStore, SharedSession};

use crate::terminal::TerminalUi;

pub mod assets;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod departments;
pub mod employees;
pub mod locations;
pub mod reports;
pub mod transfers;

/// Everything a command needs to talk to the API.
pub struct Context {
    pub config: Config,
    pub api: ApiClient,
    pub auth: AuthController,
    assume_yes: bool,
}

impl Context {
    pub fn new(config: Config, base_url: Option<&str>, assume_yes: bool) -> Result<Self> {
        let session: SharedSession = Arc::new(FileSessionStore::new());
        let mut api = ApiClient::from_config(&config, Arc::clone(&session))?;
        if let Some(url) = base_url {
            api = api.with_base_url(url)?;
        }
        let auth = AuthController::new(session, &config);
        tracing::debug!(base_url = api.base_url(), "api client ready");

        Ok(Self {
            config,
            api,
            auth,
            assume_yes,
        })
    }

    pub fn currency(&self) -> String {
        self.config.currency_symbol.clone()
    }

    /// Checks the page guard and hands over a runtime for the page.
    pub fn open(self, page: Page) -> Result<Runtime<TerminalUi>> {
        if let Some(Page::Login) = self.auth.guard(page).context("read session")? {
            bail!("Not logged in. Run `assetdesk login` first.");
        }
        Ok(Runtime::new(
            self.api,
            self.auth,
            TerminalUi::new(self.assume_yes),
        ))
    }
}

/// Runs one action and turns collected alerts into the command result.
pub async fn run<C: Controller>(
    mut rt: Runtime<TerminalUi>,
    controller: &mut C,
    action: C::Action,
) -> Result<()> {
    rt.dispatch(controller, action).await?;
    rt.into_ui().finish()
}

/// Opens a form, then submits `edits` over it.
///
/// With no edits the form is only printed, so the user can see the fields
/// and choices.
pub async fn run_form<C: Controller>(
    mut rt: Runtime<TerminalUi>,
    controller: &mut C,
    open: C::Action,
    edits: FieldEdits,
    submit: fn(FieldEdits) -> C::Action,
    form_open: fn(&C) -> bool,
) -> Result<()> {
    rt.ui_mut().set_show_forms(edits.is_empty());
    rt.dispatch(controller, open).await?;
    if !edits.is_empty() && form_open(controller) {
        rt.dispatch(controller, submit(edits)).await?;
    }
    rt.into_ui().finish()
}

/// Collects the options that were given into form edits.
pub fn edits(fields: &[(&str, Option<&String>)]) -> FieldEdits {
    fields
        .iter()
        .filter_map(|(name, value)| value.map(|v| ((*name).to_string(), v.clone())))
        .collect()
}

/// Reads one line from stdin without the trailing newline.
pub fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_skip_missing_options() {
        let name = "Laptop".to_string();
        let department = String::new();
        let result = edits(&[
            ("name", Some(&name)),
            ("category", None),
            ("department_id", Some(&department)),
        ]);
        assert_eq!(
            result,
            vec![
                ("name".to_string(), "Laptop".to_string()),
                ("department_id".to_string(), String::new()),
            ]
        );
    }
}
