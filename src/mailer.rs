// src/mailer.rs

use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

mod resend;

pub use resend::ResendMailer;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },
}

/// Delivers a rendered message to a human.
pub trait Notifier: Send + Sync {
    fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), MailerError>;
}

pub(crate) fn http_client() -> Result<Client, MailerError> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| MailerError::RequestFailed(e.to_string()))
}

/// Turns a non-2xx provider response into an `ApiError`.
pub(crate) fn check_response(resp: reqwest::blocking::Response) -> Result<(), MailerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
    Err(MailerError::ApiError {
        status: status.as_u16(),
        body,
    })
}

pub struct BrevoMailer {
    api_key: String,
    sender_email: String,
    sender_name: String,
    endpoint: String,
    client: Client,
}

#[derive(Serialize)]
struct BrevoSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoSender<'a>,
    to: Vec<BrevoRecipient<'a>>,
    subject: &'a str,
    html_content: &'a str,
}

impl BrevoMailer {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Result<Self, MailerError> {
        Ok(Self {
            api_key,
            sender_email,
            sender_name,
            endpoint: "https://api.brevo.com/v3/smtp/email".to_string(),
            client: http_client()?,
        })
    }
}

impl Notifier for BrevoMailer {
    fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), MailerError> {
        let payload = BrevoPayload {
            sender: BrevoSender {
                name: &self.sender_name,
                email: &self.sender_email,
            },
            to: vec![BrevoRecipient { email: recipient }],
            subject,
            html_content: html_body,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        check_response(resp)
    }
}
