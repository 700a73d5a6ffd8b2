//! Interactive credential prompts
//!
//! Anything not given on the command line is asked for on the terminal.
//! The password is read without echo and never leaves this module except
//! inside `ClusterCredentials`, whose `Debug` output is redacted.

use crate::cluster::ClusterCredentials;
use anyhow::{Context, Result};
use dialoguer::{Input, Password};

/// Credential inputs gathered from flags
#[derive(Debug, Default, Clone)]
pub struct LoginArgs {
    pub server: Option<String>,
    pub username: Option<String>,
    /// Read a bearer token instead of a password
    pub token: bool,
}

fn ask(prompt: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}

fn ask_secret(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}

/// Fill in whatever the flags left out
pub fn prompt_credentials(args: &LoginArgs) -> Result<ClusterCredentials> {
    let server = match &args.server {
        Some(server) => server.clone(),
        None => ask("Cluster URL")?,
    };
    // Fail before asking for secrets
    crate::cluster::parse_server_url(&server)?;

    if args.token {
        let token = ask_secret("Token")?;
        return Ok(ClusterCredentials::token(server, token));
    }

    let username = match &args.username {
        Some(username) => username.clone(),
        None => ask("Username")?,
    };
    let password = ask_secret("Password")?;
    Ok(ClusterCredentials::basic(server, username, password))
}
