//! Update feed record types.

use serde::{Deserialize, Deserializer};

/// Product names attached to an update.
///
/// The feed sends either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Products {
    /// A single product name
    One(String),
    /// Several product names in feed order
    Many(Vec<String>),
}

impl Products {
    /// Display label: the raw string, or the list joined with `", "`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::One(name) => name.clone(),
            Self::Many(names) => names.join(", "),
        }
    }
}

/// One announcement entry from the update feed.
///
/// Text fields that are missing or `null` read as empty strings so one
/// incomplete entry does not reject the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRecord {
    /// English title, may start with a status label like `Retirement:`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// English description as an HTML fragment
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Affected products
    #[serde(default)]
    pub products: Option<Products>,
    /// Creation timestamp as sent by the feed
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created: String,
    /// Last modification timestamp as sent by the feed
    #[serde(default, deserialize_with = "null_as_empty")]
    pub modified: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl UpdateRecord {
    /// Products label for display, empty when the feed sent none.
    #[must_use]
    pub fn products_label(&self) -> String {
        self.products.as_ref().map(Products::label).unwrap_or_default()
    }
}

/// Top-level feed response body.
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    /// Records matching the query, in server order
    pub value: Vec<UpdateRecord>,
    /// Total number of matches when `$count=true` was requested
    #[serde(rename = "@odata.count", default)]
    pub total_count: Option<u64>,
}
