//! Feed timestamp normalisation.

use chrono::{NaiveDateTime, SecondsFormat};

/// `YYYY-MM-DDTHH:MM:SS`
const SECONDS_PREFIX_LEN: usize = 19;

/// Truncate a feed timestamp to whole seconds, as UTC with a `Z` suffix.
///
/// Only the first 19 characters are parsed, so fractional seconds and any
/// offset suffix are dropped. Input that does not parse is returned as-is.
#[must_use]
pub fn truncate_to_seconds(raw: &str) -> String {
    let prefix = raw.get(..SECONDS_PREFIX_LEN).unwrap_or(raw);

    match NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S") {
        Ok(naive) => naive
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        Err(_) => raw.to_string(),
    }
}
