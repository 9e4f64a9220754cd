// src/fetcher/session.rs

use crate::fetcher::FetchError;
use std::process::Command;
use tracing::{info, warn};

/// Authenticated upstream session owned by a fetcher.
pub trait Session: Send {
    /// Cookie header value (`name=value`), if the session is open.
    fn cookie(&self) -> Option<&str>;

    /// Obtains a fresh session after the upstream rejected the current one.
    fn refresh(&mut self) -> Result<(), FetchError>;

    fn close(&mut self) {}
}

/// A cookie copied out of a browser by hand. It cannot be renewed.
pub struct StaticCookie {
    cookie: Option<String>,
}

impl StaticCookie {
    pub fn new(cookie: impl Into<String>) -> Self {
        Self {
            cookie: Some(cookie.into()),
        }
    }
}

impl Session for StaticCookie {
    fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    fn refresh(&mut self) -> Result<(), FetchError> {
        Err(FetchError::AuthenticationFailed(
            "session cookie expired and cannot be refreshed; set a new SESSION_COOKIE".into(),
        ))
    }

    fn close(&mut self) {
        self.cookie = None;
    }
}

/// Runs an external login helper (typically a scripted browser) that prints
/// a `name=value` session cookie on stdout.
pub struct LoginCommand {
    command: String,
    cookie: Option<String>,
}

impl LoginCommand {
    /// Logs in immediately so a broken helper is caught at startup.
    pub fn start(command: impl Into<String>) -> Result<Self, FetchError> {
        let mut session = Self {
            command: command.into(),
            cookie: None,
        };
        session.refresh()?;
        Ok(session)
    }

    fn run(&self) -> Result<String, FetchError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()
            .map_err(|e| FetchError::Config(format!("could not run login command: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::AuthenticationFailed(format!(
                "login command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_cookie_line(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Session for LoginCommand {
    fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    fn refresh(&mut self) -> Result<(), FetchError> {
        info!("running login command for a new session");
        match self.run() {
            Ok(cookie) => {
                self.cookie = Some(cookie);
                info!("session refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "session refresh failed");
                self.cookie = None;
                Err(e)
            }
        }
    }

    fn close(&mut self) {
        self.cookie = None;
    }
}

/// Takes the last non-empty line of helper output; it must look like `name=value`.
fn parse_cookie_line(stdout: &str) -> Result<String, FetchError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| FetchError::AuthenticationFailed("login command printed no cookie".into()))?;

    match line.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => Ok(line.to_string()),
        _ => Err(FetchError::AuthenticationFailed(format!(
            "login command output is not a name=value cookie: {line}"
        ))),
    }
}
