//! Azure Communication Services email client.
//!
//! Sending is a long-running operation: `POST /emails:send` answers
//! `202 Accepted` with an `Operation-Location`, which is polled until the
//! operation reaches a terminal status.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, Response, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::auth::ConnectionString;
use super::MailSender;
use crate::config::MailConfig;
use crate::error::MailError;

/// Email REST API version.
pub const ACS_EMAIL_API_VERSION: &str = "2023-03-31";

const OPERATION_LOCATION: &str = "operation-location";

/// Upper bound on a service-supplied `Retry-After`.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    sender_address: &'a str,
    content: EmailContent<'a>,
    recipients: Recipients<'a>,
}

#[derive(Debug, Serialize)]
struct EmailContent<'a> {
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Serialize)]
struct Recipients<'a> {
    to: Vec<EmailAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    address: &'a str,
}

/// Body of both the send response and the operation status response.
#[derive(Debug, Deserialize)]
struct OperationStatus {
    id: String,
    status: String,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl OperationError {
    fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "no error detail".to_string(),
        }
    }
}

enum Progress {
    Done(String),
    Pending,
}

/// Email sender backed by Azure Communication Services.
pub struct AcsEmailClient {
    client: Client,
    config: MailConfig,
}

impl AcsEmailClient {
    /// Create a client. Settings are validated on send, not here.
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn execute(
        &self,
        credentials: &ConnectionString,
        method: Method,
        url: Url,
        body: Vec<u8>,
    ) -> Result<Response, MailError> {
        let signed = credentials.sign(method.as_str(), &url, &body, Utc::now())?;

        let mut request = self
            .client
            .request(method, url)
            .header("x-ms-date", signed.date)
            .header("x-ms-content-sha256", signed.content_hash)
            .header(AUTHORIZATION, signed.authorization);

        if !body.is_empty() {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status, body });
        }

        Ok(response)
    }

    fn check(operation: OperationStatus) -> Result<Progress, MailError> {
        match operation.status.as_str() {
            "Succeeded" => Ok(Progress::Done(operation.id)),
            "Failed" | "Canceled" => Err(MailError::OperationFailed {
                detail: operation
                    .error
                    .as_ref()
                    .map_or_else(|| "no error detail".to_string(), OperationError::describe),
                operation_id: operation.id,
                status: operation.status,
            }),
            _ => Ok(Progress::Pending),
        }
    }

    /// Wait before the next poll: `Retry-After` seconds capped at
    /// [`MAX_RETRY_AFTER`], else the configured interval.
    fn next_delay(&self, headers: &HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map_or(self.config.poll_interval, |secs| {
                Duration::from_secs(secs).min(MAX_RETRY_AFTER)
            })
    }
}

fn required<'a>(value: Option<&'a String>, name: &'static str) -> Result<&'a str, MailError> {
    value
        .map(String::as_str)
        .ok_or(MailError::NotConfigured(name))
}

#[async_trait]
impl MailSender for AcsEmailClient {
    fn name(&self) -> &'static str {
        "azure-communication-services"
    }

    async fn send(&self, subject: &str, html: &str) -> Result<String, MailError> {
        let raw = required(
            self.config.connection_string.as_ref(),
            "MAIL_CONNECTION_STRING",
        )?;
        let sender = required(self.config.sender.as_ref(), "SENDER_ADDRESS")?;
        let recipient = required(self.config.recipient.as_ref(), "RECIPIENT_ADDRESS")?;
        let credentials = ConnectionString::parse(raw)?;

        let send_url = Url::parse(&format!(
            "{}/emails:send?api-version={ACS_EMAIL_API_VERSION}",
            credentials.endpoint
        ))
        .map_err(|e| MailError::Other(format!("invalid send URL: {e}")))?;

        let body = serde_json::to_vec(&SendRequest {
            sender_address: sender,
            content: EmailContent { subject, html },
            recipients: Recipients {
                to: vec![EmailAddress { address: recipient }],
            },
        })
        .map_err(|e| MailError::Other(format!("failed to encode message: {e}")))?;

        debug!(to = recipient, subject, "Submitting email");
        let response = self
            .execute(&credentials, Method::POST, send_url, body)
            .await?;

        let location = response
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let mut delay = self.next_delay(response.headers());
        let accepted: OperationStatus = response.json().await?;

        let status_url = match location {
            Some(location) => Url::parse(&location),
            None => Url::parse(&format!(
                "{}/emails/operations/{}?api-version={ACS_EMAIL_API_VERSION}",
                credentials.endpoint, accepted.id
            )),
        }
        .map_err(|e| MailError::Other(format!("invalid operation location: {e}")))?;

        let operation_id = accepted.id.clone();
        if let Progress::Done(id) = Self::check(accepted)? {
            return Ok(id);
        }

        for attempt in 1..=self.config.max_polls {
            tokio::time::sleep(delay).await;

            let response = self
                .execute(&credentials, Method::GET, status_url.clone(), Vec::new())
                .await?;
            delay = self.next_delay(response.headers());

            let operation: OperationStatus = response.json().await?;
            debug!(attempt, status = %operation.status, "Polled email operation");

            if let Progress::Done(id) = Self::check(operation)? {
                return Ok(id);
            }
        }

        Err(MailError::PollExhausted {
            operation_id,
            polls: self.config.max_polls,
        })
    }
}
