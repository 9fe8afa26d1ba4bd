//! Digest pipeline - orchestrates the fetch-translate-render-mail flow.

use std::sync::Arc;

use crate::error::PipelineError;
use crate::feed::{FeedClient, UpdateFeed};
use crate::mail::{deliver, AcsEmailClient, DeliveryOutcome, MailSender};
use crate::render::{render_digest, TranslatedRecord, DIGEST_TITLE};
use crate::translate::{AzureOpenAiClient, TextKind, Translator};
use crate::AppConfig;

/// A rendered digest, ready to mail.
#[derive(Debug, Clone)]
pub struct Digest {
    /// Complete HTML document
    pub html: String,
    /// Number of records rendered
    pub records: usize,
    /// Number of title/description translations that fell back to a placeholder
    pub translation_failures: usize,
}

/// Result of a single invocation.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Lower bound the feed was queried with.
    pub since: String,
    /// Number of records fetched.
    pub fetched: usize,
    /// Translations that fell back to a placeholder.
    pub translation_failures: usize,
    /// `None` when nothing was fetched and no mail was attempted.
    pub delivery: Option<DeliveryOutcome>,
}

/// Digest pipeline orchestrator.
pub struct Pipeline {
    feed: Arc<dyn UpdateFeed>,
    translator: Translator,
    mailer: Arc<dyn MailSender>,
}

impl Pipeline {
    /// Create a pipeline from explicit stages.
    #[must_use]
    pub fn new(
        feed: Arc<dyn UpdateFeed>,
        translator: Translator,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            feed,
            translator,
            mailer,
        }
    }

    /// Wire the production stages from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let feed = FeedClient::new(config.feed.clone())?;
        let backend = AzureOpenAiClient::new(config.translator.clone());
        let mailer = AcsEmailClient::new(config.mail.clone());

        Ok(Self::new(
            Arc::new(feed),
            Translator::new(Arc::new(backend)),
            Arc::new(mailer),
        ))
    }

    /// Fetch, translate and render, without sending.
    ///
    /// Returns `Ok(None)` when the feed has no updates since `since`.
    pub async fn build_digest(&self, since: &str) -> Result<Option<Digest>, PipelineError> {
        let records = self.feed.fetch(since).await?;

        if records.is_empty() {
            tracing::info!(since, "No updates found");
            return Ok(None);
        }

        let total = records.len();
        let mut translation_failures = 0;
        let mut translated = Vec::with_capacity(total);

        for (index, record) in records.iter().enumerate() {
            tracing::info!(
                position = index + 1,
                total,
                title = %record.title,
                "Translating update"
            );

            let title = self.translator.translate(TextKind::Title, &record.title).await;
            let description = self
                .translator
                .translate(TextKind::Description, &record.description)
                .await;

            translation_failures +=
                usize::from(title.is_failed()) + usize::from(description.is_failed());

            translated.push(TranslatedRecord::from_update(
                record,
                title.into_text(),
                description.into_text(),
            ));
        }

        Ok(Some(Digest {
            html: render_digest(&translated),
            records: translated.len(),
            translation_failures,
        }))
    }

    /// Run one full invocation.
    ///
    /// Fetch errors abort the run. Translation and mail failures do not.
    pub async fn run(&self, since: &str) -> Result<RunSummary, PipelineError> {
        tracing::info!(since, "Starting digest run");

        let Some(digest) = self.build_digest(since).await? else {
            return Ok(RunSummary {
                since: since.to_string(),
                fetched: 0,
                translation_failures: 0,
                delivery: None,
            });
        };

        let delivery = deliver(self.mailer.as_ref(), DIGEST_TITLE, &digest.html).await;

        let summary = RunSummary {
            since: since.to_string(),
            fetched: digest.records,
            translation_failures: digest.translation_failures,
            delivery: Some(delivery),
        };

        tracing::info!(
            fetched = summary.fetched,
            translation_failures = summary.translation_failures,
            sent = summary.delivery.as_ref().is_some_and(DeliveryOutcome::is_sent),
            "Digest run complete"
        );

        Ok(summary)
    }
}
