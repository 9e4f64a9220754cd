use crate::mailer::{check_response, http_client, MailerError, Notifier};
use reqwest::blocking::Client;
use serde::Serialize;

/// Sends email through the Resend HTTP API.
pub struct ResendMailer {
    api_key: String,
    from: String,
    endpoint: String,
    client: Client,
}

#[derive(Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendMailer {
    /// `from` is either a bare address or `Name <address>`.
    pub fn new(api_key: String, from: String) -> Result<Self, MailerError> {
        Ok(Self {
            api_key,
            from,
            endpoint: "https://api.resend.com/emails".to_string(),
            client: http_client()?,
        })
    }
}

impl Notifier for ResendMailer {
    fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), MailerError> {
        let payload = ResendPayload {
            from: &self.from,
            to: [recipient],
            subject,
            html: html_body,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        check_response(resp)
    }
}
