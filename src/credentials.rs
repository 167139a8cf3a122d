//! Resolution of connection parameters.
//!
//! Each value comes from the command line first, then the configuration
//! file, and is otherwise asked for at the terminal. The password is never
//! stored and is read without echo.

use crate::config::{ConnectionConfig, DEFAULT_PORT};
use crate::core::db::ConnectParams;
use crate::core::{MscliError, Result};
use std::io::{self, BufRead, Write};

/// Connection values given on the command line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Asks the user for missing values.
pub trait Prompter {
    fn ask(&mut self, label: &str) -> Result<String>;
    fn ask_secret(&mut self, label: &str) -> Result<String>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, label: &str) -> Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| MscliError::Input(format!("Failed to read {}: {}", label, e)))?;
        Ok(input.trim().to_string())
    }

    fn ask_secret(&mut self, label: &str) -> Result<String> {
        rpassword::prompt_password(format!("{}: ", label))
            .map_err(|e| MscliError::Input(format!("Failed to read {}: {}", label, e)))
    }
}

/// Fills in every connection parameter, prompting for what is missing.
pub fn resolve_params<P: Prompter>(
    overrides: ConnectOverrides,
    config: &ConnectionConfig,
    prompter: &mut P,
) -> Result<ConnectParams> {
    let host = match overrides.host.or_else(|| config.host.clone()) {
        Some(host) => host,
        None => prompter.ask("Host")?,
    };
    let port = match overrides.port.or(config.port) {
        Some(port) => port,
        None => parse_port(&prompter.ask(&format!("Port [{}]", DEFAULT_PORT))?)?,
    };
    let username = match overrides.username.or_else(|| config.username.clone()) {
        Some(username) => username,
        None => prompter.ask("Username")?,
    };
    let password = match overrides.password {
        Some(password) => password,
        None => prompter.ask_secret("Password")?,
    };

    Ok(ConnectParams {
        host,
        port,
        username,
        password,
        trust_cert: config.trust_cert,
    })
}

/// An empty answer selects the default port.
fn parse_port(answer: &str) -> Result<u16> {
    if answer.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    answer
        .parse()
        .map_err(|_| MscliError::Input(format!("Invalid port: {}", answer)))
}
