//! Configuration for the digest job.
//!
//! Everything is read from environment variables once at startup and then
//! passed explicitly to the stages that need it.

use std::time::Duration;

use crate::error::ConfigError;

/// Default update feed endpoint.
pub const DEFAULT_FEED_URL: &str = "https://www.microsoft.com/releasecommunications/api/v2/azure";

/// Default feed request timeout in seconds.
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 120;

/// Default Azure OpenAI API version.
pub const DEFAULT_API_VERSION: &str = "2025-04-01-preview";

/// Default interval between send-status polls when the service gives no hint.
pub const DEFAULT_MAIL_POLL_INTERVAL_SECS: u64 = 5;

/// Default number of send-status polls before giving up.
pub const DEFAULT_MAIL_MAX_POLLS: u32 = 60;

const ENV_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";
const ENV_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
const ENV_OPENAI_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
const ENV_MODEL_DEPLOYMENT: &str = "MODEL_DEPLOYMENT_NAME";
const ENV_MAIL_CONNECTION_STRING: &str = "MAIL_CONNECTION_STRING";
const ENV_SENDER_ADDRESS: &str = "SENDER_ADDRESS";
const ENV_RECIPIENT_ADDRESS: &str = "RECIPIENT_ADDRESS";
const ENV_FEED_URL: &str = "AZURE_UPDATES_FEED_URL";
const ENV_FEED_TIMEOUT: &str = "FEED_TIMEOUT_SECS";
const ENV_MAIL_POLL_INTERVAL: &str = "MAIL_POLL_INTERVAL_SECS";
const ENV_MAIL_MAX_POLLS: &str = "MAIL_MAX_POLLS";

/// Update feed settings.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the update API.
    pub url: String,
    /// Timeout for the single fetch request.
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
        }
    }
}

/// Azure OpenAI settings used by the translator.
#[derive(Clone)]
pub struct TranslatorConfig {
    /// API key sent as `api-key`.
    pub api_key: String,
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: String,
    /// REST API version.
    pub api_version: String,
    /// Model deployment name.
    pub deployment: String,
}

impl std::fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("deployment", &self.deployment)
            .finish()
    }
}

/// Azure Communication Services email settings.
///
/// These are optional at load time; a missing value only matters when a
/// real send is attempted, where it turns into a failed delivery.
#[derive(Clone)]
pub struct MailConfig {
    /// `endpoint=https://...;accesskey=...`
    pub connection_string: Option<String>,
    /// Verified sender address.
    pub sender: Option<String>,
    /// Digest recipient.
    pub recipient: Option<String>,
    /// Fallback interval between status polls.
    pub poll_interval: Duration,
    /// Maximum number of status polls.
    pub max_polls: u32,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("poll_interval", &self.poll_interval)
            .field("max_polls", &self.max_polls)
            .finish()
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            sender: None,
            recipient: None,
            poll_interval: Duration::from_secs(DEFAULT_MAIL_POLL_INTERVAL_SECS),
            max_polls: DEFAULT_MAIL_MAX_POLLS,
        }
    }
}

/// Complete job configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub translator: TranslatorConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Required Environment Variables
    /// - `AZURE_OPENAI_API_KEY`
    /// - `AZURE_OPENAI_ENDPOINT`
    /// - `MODEL_DEPLOYMENT_NAME`
    ///
    /// # Optional Environment Variables
    /// - `AZURE_OPENAI_API_VERSION` (default: 2025-04-01-preview)
    /// - `MAIL_CONNECTION_STRING`, `SENDER_ADDRESS`, `RECIPIENT_ADDRESS`
    /// - `AZURE_UPDATES_FEED_URL`, `FEED_TIMEOUT_SECS` (default: 120)
    /// - `MAIL_POLL_INTERVAL_SECS` (default: 5), `MAIL_MAX_POLLS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        // Translator settings are checked first so a misconfigured job
        // never reaches the network.
        let api_key = require(ENV_OPENAI_API_KEY)?;
        let endpoint = require(ENV_OPENAI_ENDPOINT)?;
        let deployment = require(ENV_MODEL_DEPLOYMENT)?;
        let api_version =
            get(ENV_OPENAI_API_VERSION).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let feed = FeedConfig {
            url: get(ENV_FEED_URL).unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            timeout: Duration::from_secs(parse_or(
                ENV_FEED_TIMEOUT,
                get(ENV_FEED_TIMEOUT),
                DEFAULT_FEED_TIMEOUT_SECS,
            )?),
        };

        let mail = MailConfig {
            connection_string: get(ENV_MAIL_CONNECTION_STRING),
            sender: get(ENV_SENDER_ADDRESS),
            recipient: get(ENV_RECIPIENT_ADDRESS),
            poll_interval: Duration::from_secs(parse_or(
                ENV_MAIL_POLL_INTERVAL,
                get(ENV_MAIL_POLL_INTERVAL),
                DEFAULT_MAIL_POLL_INTERVAL_SECS,
            )?),
            max_polls: parse_or(
                ENV_MAIL_MAX_POLLS,
                get(ENV_MAIL_MAX_POLLS),
                DEFAULT_MAIL_MAX_POLLS,
            )?,
        };

        Ok(Self {
            feed,
            translator: TranslatorConfig {
                api_key,
                endpoint,
                api_version,
                deployment,
            },
            mail,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
