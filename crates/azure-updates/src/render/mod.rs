//! HTML digest rendering.
//!
//! Translated text is inserted without escaping: descriptions are HTML
//! fragments from the feed and must keep their markup.

mod template;
mod timestamp;

pub use template::{fill_page, CONTENTS_PLACEHOLDER, DIGEST_TITLE, PAGE_TEMPLATE};
pub use timestamp::truncate_to_seconds;

use crate::feed::UpdateRecord;

/// An update record with Japanese title and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedRecord {
    pub title: String,
    /// Products joined for display
    pub products: String,
    pub description: String,
    pub created: String,
    pub modified: String,
}

impl TranslatedRecord {
    /// Combine a feed record with its translated title and description.
    #[must_use]
    pub fn from_update(record: &UpdateRecord, title: String, description: String) -> Self {
        Self {
            title,
            products: record.products_label(),
            description,
            created: record.created.clone(),
            modified: record.modified.clone(),
        }
    }
}

/// Render one record as a `content` block.
#[must_use]
pub fn render_fragment(record: &TranslatedRecord) -> String {
    format!(
        r#"
    <div class="content">
      <div class="title">
        {title}
      </div>
      <div class="label">
        {products}
      </div>
      <div class="description">
        {description}
      </div>
      <div class="footer">
        作成日時: {created} &nbsp; | &nbsp; 更新日時: {modified}
      </div>
    </div>
"#,
        title = record.title,
        products = record.products,
        description = record.description,
        created = truncate_to_seconds(&record.created),
        modified = truncate_to_seconds(&record.modified),
    )
}

/// Render the full digest page, fragments in input order.
#[must_use]
pub fn render_digest(records: &[TranslatedRecord]) -> String {
    let contents: String = records.iter().map(render_fragment).collect();
    fill_page(&contents)
}
