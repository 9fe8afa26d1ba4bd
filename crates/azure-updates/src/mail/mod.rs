//! Digest delivery by email.
//!
//! Delivery is the last stage, so its failures are logged and swallowed:
//! [`deliver`] always returns a [`DeliveryOutcome`], never an error.

mod acs;
mod auth;

pub use acs::{AcsEmailClient, ACS_EMAIL_API_VERSION};
pub use auth::{ConnectionString, SignedHeaders};

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::MailError;

/// Something that can send one HTML email to a preconfigured recipient.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Sender name for logs.
    fn name(&self) -> &'static str;

    /// Send `html` with `subject` and wait until the service reports completion.
    ///
    /// Returns the service's operation id.
    async fn send(&self, subject: &str, html: &str) -> Result<String, MailError>;
}

/// Result of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The service accepted and completed the send
    Sent { operation_id: String },
    /// The send failed; the reason has already been logged
    Failed(String),
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Send the digest, logging instead of propagating any failure.
pub async fn deliver(sender: &dyn MailSender, subject: &str, html: &str) -> DeliveryOutcome {
    match sender.send(subject, html).await {
        Ok(operation_id) => {
            info!(
                sender = sender.name(),
                operation_id = %operation_id,
                subject,
                "Digest email sent"
            );
            DeliveryOutcome::Sent { operation_id }
        }
        Err(e) => {
            error!(sender = sender.name(), error = %e, "Failed to send digest email");
            DeliveryOutcome::Failed(e.to_string())
        }
    }
}
