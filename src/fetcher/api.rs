// src/fetcher/api.rs

use crate::domain::StatusDocument;
use crate::fetcher::{with_retry, FetchError, Fetcher, Session, USER_AGENT};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const MAX_ATTEMPTS: u64 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Reads case status from the JSON case API using a cookie session.
pub struct CaseApiClient {
    client: Client,
    base_url: Url,
    session: Mutex<Box<dyn Session>>,
}

impl CaseApiClient {
    pub fn new(base_url: &str, session: Box<dyn Session>) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::Config(format!("invalid case API URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Config(format!("case API URL cannot take a path: {base_url}")));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            session: Mutex::new(session),
        })
    }

    pub fn case_url(&self, case_id: &str) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(case_id);
        }
        url
    }

    fn session(&self) -> MutexGuard<'_, Box<dyn Session>> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get_status(&self, url: &Url, cookie: Option<&str>) -> Result<StatusDocument, FetchError> {
        with_retry(url.as_str(), MAX_ATTEMPTS, RETRY_DELAY, || {
            let mut req = self
                .client
                .get(url.clone())
                .header(ACCEPT, "application/json, text/plain, */*")
                .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9");
            if let Some(cookie) = cookie {
                req = req.header(COOKIE, cookie);
            }

            let resp = req.send()?;
            let status = resp.status();
            let text = resp.text()?;
            parse_response(status, &text)
        })
    }
}

impl Fetcher for CaseApiClient {
    fn fetch(&self, case_id: &str) -> Result<StatusDocument, FetchError> {
        let url = self.case_url(case_id);
        let mut session = self.session();

        match self.get_status(&url, session.cookie()) {
            Err(FetchError::AuthenticationFailed(reason)) => {
                warn!(case_id, %reason, "session rejected, attempting refresh");
                session.refresh()?;
                info!(case_id, "session refreshed, retrying request");
                self.get_status(&url, session.cookie())
            }
            other => other,
        }
    }

    fn close(&self) {
        debug!("closing case API session");
        self.session().close();
    }
}

/// Maps one HTTP response from the case API to a snapshot.
pub(crate) fn parse_response(status: StatusCode, body: &str) -> Result<StatusDocument, FetchError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::AuthenticationFailed(format!(
            "received status code {} (cookie may have expired)",
            status.as_u16()
        )));
    }

    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        });
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(format!("case API response: {e}")))?;

    StatusDocument::from_value(value).map_err(|other| {
        FetchError::UnexpectedShape(format!("expected a JSON object, got {}", json_kind(&other)))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
