//! Azure Communication Services connection strings and HMAC request signing.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::error::MailError;

type HmacSha256 = Hmac<Sha256>;

/// Header names covered by the signature, in signing order.
const SIGNED_HEADERS: &str = "x-ms-date;host;x-ms-content-sha256";

/// Parsed `endpoint=...;accesskey=...` connection string.
#[derive(Clone)]
pub struct ConnectionString {
    /// Resource endpoint without trailing slash
    pub endpoint: String,
    key: Vec<u8>,
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl ConnectionString {
    /// Parse a connection string. Keys are case-insensitive and may come in any order.
    pub fn parse(raw: &str) -> Result<Self, MailError> {
        let mut endpoint = None;
        let mut access_key = None;

        for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((name, value)) = part.split_once('=') else {
                return Err(MailError::ConnectionString(format!(
                    "segment without '=': {part}"
                )));
            };
            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim().to_string()),
                "accesskey" => access_key = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| MailError::ConnectionString("missing endpoint".to_string()))?;
        let access_key = access_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| MailError::ConnectionString("missing accesskey".to_string()))?;

        Url::parse(&endpoint)
            .map_err(|e| MailError::ConnectionString(format!("invalid endpoint: {e}")))?;

        // Base64 padding is '=', so the split above only cut at the first one.
        let key = BASE64
            .decode(access_key.as_bytes())
            .map_err(|e| MailError::ConnectionString(format!("accesskey is not base64: {e}")))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
        })
    }

    /// Compute the signing headers for a request.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<SignedHeaders, MailError> {
        let date = now.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let content_hash = BASE64.encode(Sha256::digest(body));

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(MailError::Other(format!("URL has no host: {url}"))),
        };

        let path_and_query = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        let string_to_sign = format!("{method}\n{path_and_query}\n{date};{host};{content_hash}");

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| MailError::Other(format!("invalid signing key: {e}")))?;
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(SignedHeaders {
            date,
            content_hash,
            authorization: format!(
                "HMAC-SHA256 SignedHeaders={SIGNED_HEADERS}&Signature={signature}"
            ),
        })
    }
}

/// Header values produced by [`ConnectionString::sign`].
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    /// `x-ms-date`
    pub date: String,
    /// `x-ms-content-sha256`
    pub content_hash: String,
    /// `Authorization`
    pub authorization: String,
}
