//! Login, logout, registration and session status.

use std::io::{self, Write};

use anyhow::{Context as _, Result, bail};
use assetdesk_core::auth::Page;
use assetdesk_core::config::paths;
use assetdesk_core::models::{EmployeeDraft, Id};
use assetdesk_core::session::mask_token;

use super::{Context, read_stdin_line};

/// Registration values taken from the command line.
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub position: String,
    pub role: String,
    pub department_id: Option<Id>,
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{label}: ");
    io::stderr().flush().context("flush stderr")?;
    read_stdin_line()
}

pub async fn login(
    ctx: &Context,
    email: Option<String>,
    password_stdin: bool,
    force: bool,
) -> Result<()> {
    if !force && ctx.auth.guard(Page::Login)?.is_some() {
        println!("Already logged in. Use --force to log in again.");
        return Ok(());
    }

    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = if password_stdin {
        read_stdin_line()?
    } else {
        prompt("Password")?
    };

    let outcome = ctx.auth.login(&ctx.api, &email, &password).await?;
    match outcome.employee {
        Some(employee) => println!("Logged in as {} ({})", employee.full_name, employee.role),
        None => println!("Logged in as {}", email.trim()),
    }
    if let Some(expires_at) = outcome.expires_at {
        println!("Session expires at {expires_at}");
    }
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    let was_logged_in = ctx.auth.is_authenticated()?;
    ctx.auth.logout()?;
    if was_logged_in {
        println!("Logged out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}

pub async fn register(ctx: &Context, registration: Registration) -> Result<()> {
    if ctx.auth.guard(Page::Register)?.is_some() {
        bail!("Already logged in. Run `assetdesk logout` before registering a new account.");
    }

    let password = prompt("Password")?;
    let draft = EmployeeDraft {
        full_name: registration.full_name,
        position: registration.position,
        email: registration.email,
        role: registration.role,
        department_id: registration.department_id,
        password: Some(password),
    };

    ctx.auth.register(&ctx.api, &draft).await?;
    println!("Registered {}. Run `assetdesk login` to sign in.", draft.email);
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    match ctx.auth.session().get()? {
        Some(token) => println!("Logged in (token {})", mask_token(&token)),
        None => println!("Not logged in"),
    }
    println!("API: {}", ctx.api.base_url());
    println!("Auth scheme: {}", ctx.config.auth_scheme.display_name());
    println!("Session file: {}", paths::session_path().display());
    Ok(())
}
