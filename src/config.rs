// src/config.rs

use crate::errors::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const DEFAULT_API_URL: &str = "https://my.uscis.gov/account/case-service/api/cases";
const DEFAULT_PAGE_URL: &str =
    "https://egov.uscis.gov/casestatus/mycasestatus.do?appReceiptNum={case_id}";

pub struct Config {
    pub case_ids: Vec<String>,
    pub recipient_email: String,
    pub poll_interval: Duration,
    pub fetch: FetchSettings,
    pub mail: MailSettings,
    pub store: StoreSettings,
    /// 0 disables the health server.
    pub port: u16,
}

pub enum FetchSettings {
    Api { base_url: String, auth: ApiAuth },
    Page { url_template: String },
}

pub enum ApiAuth {
    Cookie(String),
    LoginCommand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailProvider {
    Resend,
    Brevo,
}

pub struct MailSettings {
    pub provider: MailProvider,
    pub api_key: String,
    pub from: String,
    pub from_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    File { dir: PathBuf },
    Sqlite { path: String },
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let raw_ids = get("CASE_IDS")
            .or_else(|| get("CASE_ID"))
            .ok_or(ConfigError::Missing("CASE_IDS"))?;
        let case_ids = parse_case_ids(&raw_ids);
        if case_ids.is_empty() {
            return Err(ConfigError::Invalid {
                key: "CASE_IDS",
                reason: "no case identifiers listed".into(),
            });
        }

        let recipient_email = require("RECIPIENT_EMAIL")?;
        if !recipient_email.contains('@') {
            return Err(ConfigError::Invalid {
                key: "RECIPIENT_EMAIL",
                reason: format!("not an email address: {recipient_email}"),
            });
        }

        let poll_interval = match get("POLL_INTERVAL") {
            Some(raw) => parse_duration(&raw).map_err(|reason| ConfigError::Invalid {
                key: "POLL_INTERVAL",
                reason,
            })?,
            None => Duration::from_secs(60 * 60),
        };

        let fetch = match get("FETCH_MODE").as_deref().unwrap_or("api") {
            "api" => {
                let auth = match (get("LOGIN_COMMAND"), get("SESSION_COOKIE")) {
                    (Some(command), _) => ApiAuth::LoginCommand(command),
                    (None, Some(cookie)) => ApiAuth::Cookie(cookie),
                    (None, None) => return Err(ConfigError::Missing("SESSION_COOKIE or LOGIN_COMMAND")),
                };
                FetchSettings::Api {
                    base_url: get("CASE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                    auth,
                }
            }
            "page" => FetchSettings::Page {
                url_template: get("CASE_PAGE_URL").unwrap_or_else(|| DEFAULT_PAGE_URL.to_string()),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "FETCH_MODE",
                    reason: format!("expected api or page, got {other}"),
                })
            }
        };

        let provider = match get("MAIL_PROVIDER").as_deref().unwrap_or("resend") {
            "resend" => MailProvider::Resend,
            "brevo" => MailProvider::Brevo,
            other => {
                return Err(ConfigError::Invalid {
                    key: "MAIL_PROVIDER",
                    reason: format!("expected resend or brevo, got {other}"),
                })
            }
        };
        let mail = MailSettings {
            provider,
            api_key: require("MAIL_API_KEY")?,
            from: get("MAIL_FROM").unwrap_or_else(|| "onboarding@resend.dev".to_string()),
            from_name: get("MAIL_FROM_NAME").unwrap_or_else(|| "Case Tracker".to_string()),
        };

        let store = match get("STORE_BACKEND").as_deref().unwrap_or("file") {
            "file" => StoreSettings::File {
                dir: PathBuf::from(get("STATE_DIR").unwrap_or_else(|| "./state".to_string())),
            },
            "sqlite" => {
                let path = get("DATABASE_PATH").unwrap_or_else(|| "case_tracker.sqlite3".to_string());
                // Connections are opened per worker thread; an in-memory database
                // would give each thread its own empty copy.
                if is_in_memory_db(&path) {
                    return Err(ConfigError::Invalid {
                        key: "DATABASE_PATH",
                        reason: format!("in-memory databases are not supported: {path}"),
                    });
                }
                StoreSettings::Sqlite { path }
            }
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    reason: format!("expected file or sqlite, got {other}"),
                })
            }
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                reason: format!("not a port number: {raw}"),
            })?,
            None => 8080,
        };

        Ok(Self {
            case_ids,
            recipient_email,
            poll_interval,
            fetch,
            mail,
            store,
            port,
        })
    }

    /// Logs the effective settings without secrets.
    pub fn log_summary(&self) {
        info!(cases = ?self.case_ids, recipient = %self.recipient_email, "configuration loaded");
        info!(interval_secs = self.poll_interval.as_secs(), port = self.port, "schedule");
        match &self.fetch {
            FetchSettings::Api { base_url, auth: ApiAuth::Cookie(_) } => {
                info!(%base_url, "fetch mode: case API with manual cookie")
            }
            FetchSettings::Api { base_url, auth: ApiAuth::LoginCommand(_) } => {
                info!(%base_url, "fetch mode: case API with login command")
            }
            FetchSettings::Page { url_template } => info!(%url_template, "fetch mode: status page"),
        }
        info!(provider = ?self.mail.provider, from = %self.mail.from, "mail");
        info!(store = ?self.store, "snapshot store");
    }
}

fn is_in_memory_db(path: &str) -> bool {
    path == ":memory:" || path.starts_with("file::memory:") || path.contains("mode=memory")
}

/// Splits a comma-separated list, dropping blanks and repeats.
pub fn parse_case_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Parses durations like `45s`, `30m`, `1h30m` or `1d`.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let mut total: u64 = 0;
    let mut digits = String::new();

    for c in raw.trim().chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return Err(format!("unknown unit {c:?} in {raw:?}")),
        };
        let n: u64 = digits
            .parse()
            .map_err(|_| format!("missing number before {c:?} in {raw:?}"))?;
        total = n
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| format!("duration too large: {raw:?}"))?;
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(format!("missing unit after {digits} in {raw:?}"));
    }
    if total == 0 {
        return Err(format!("duration must be positive: {raw:?}"));
    }
    Ok(Duration::from_secs(total))
}
