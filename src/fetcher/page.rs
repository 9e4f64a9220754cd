// src/fetcher/page.rs

use crate::domain::StatusDocument;
use crate::fetcher::{with_retry, FetchError, Fetcher, USER_AGENT};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use url::Url;

const MAX_ATTEMPTS: u64 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

const STATUS_HEADING: &str = "div.rows.text-center h1";
const STATUS_DETAILS: &str = "div.rows.text-center p";
const SIGN_IN_FORM: &str = "#email-address";

/// Reads case status out of the public case status HTML page.
pub struct CaseStatusPage {
    client: Client,
    url_template: String,
    // Serializes page loads so concurrent callers never interleave requests.
    in_use: Mutex<()>,
}

impl CaseStatusPage {
    /// `url_template` must contain `{case_id}`.
    pub fn new(url_template: impl Into<String>) -> Result<Self, FetchError> {
        let url_template = url_template.into();
        if !url_template.contains("{case_id}") {
            return Err(FetchError::Config(format!(
                "page URL template has no {{case_id}} placeholder: {url_template}"
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self {
            client,
            url_template,
            in_use: Mutex::new(()),
        })
    }

    pub fn page_url(&self, case_id: &str) -> Result<Url, FetchError> {
        let encoded: String = url::form_urlencoded::byte_serialize(case_id.as_bytes()).collect();
        let raw = self.url_template.replace("{case_id}", &encoded);
        Url::parse(&raw).map_err(|e| FetchError::Config(format!("invalid page URL {raw}: {e}")))
    }
}

impl Fetcher for CaseStatusPage {
    fn fetch(&self, case_id: &str) -> Result<StatusDocument, FetchError> {
        let url = self.page_url(case_id)?;
        let _guard = self.in_use.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let (final_url, status, html) = with_retry(url.as_str(), MAX_ATTEMPTS, RETRY_DELAY, || {
            let resp = self.client.get(url.clone()).send()?;
            let final_url = resp.url().clone();
            let status = resp.status();
            let html = resp.text()?;
            Ok((final_url, status, html))
        })?;

        debug!(case_id, %final_url, status = status.as_u16(), bytes = html.len(), "case page loaded");

        if final_url.path().contains("sign-in")
            || status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
        {
            return Err(FetchError::AuthenticationFailed(format!(
                "case page redirected to sign-in or was refused ({})",
                status.as_u16()
            )));
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body: html.chars().take(500).collect(),
            });
        }

        extract_case_status(case_id, &html)
    }
}

/// Pulls the status heading and detail text out of a case status page.
pub fn extract_case_status(case_id: &str, html: &str) -> Result<StatusDocument, FetchError> {
    let document = Html::parse_document(html);

    if document.select(&selector(SIGN_IN_FORM)?).next().is_some() {
        return Err(FetchError::AuthenticationFailed(
            "case page served a sign-in form".into(),
        ));
    }

    let status = document
        .select(&selector(STATUS_HEADING)?)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
        .ok_or_else(|| FetchError::UnexpectedShape("status heading not found".into()))?;

    let details = document
        .select(&selector(STATUS_DETAILS)?)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|text| !text.is_empty());

    let mut fields = Map::new();
    fields.insert("receipt_number".into(), Value::String(case_id.to_string()));
    fields.insert("status".into(), Value::String(status));
    if let Some(details) = details {
        fields.insert("details".into(), Value::String(details));
    }

    Ok(StatusDocument::new(fields))
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parse(format!("selector {css}: {e}")))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
