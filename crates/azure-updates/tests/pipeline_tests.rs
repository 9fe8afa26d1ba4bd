//! Integration tests for the digest pipeline.
//!
//! The stages are replaced with in-memory fakes so each failure policy can
//! be checked without any network access.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use azure_updates::feed::UpdateFeed;
use azure_updates::mail::MailSender;
use azure_updates::schedule::run_daily_with;
use azure_updates::translate::{ChatCompletion, ChatMessage, Translator};
use azure_updates::{
    DeliveryOutcome, FetchError, MailError, Pipeline, PipelineError, Products, TranslateError,
    UpdateRecord,
};

struct FakeFeed {
    records: Result<Vec<UpdateRecord>, u16>,
    requested: Mutex<Vec<String>>,
}

impl FakeFeed {
    fn with(records: Vec<UpdateRecord>) -> Arc<Self> {
        Arc::new(Self {
            records: Ok(records),
            requested: Mutex::new(vec![]),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            records: Err(status),
            requested: Mutex::new(vec![]),
        })
    }
}

#[async_trait]
impl UpdateFeed for FakeFeed {
    async fn fetch(&self, since: &str) -> Result<Vec<UpdateRecord>, FetchError> {
        self.requested.lock().unwrap().push(since.to_string());
        match &self.records {
            Ok(records) => Ok(records.clone()),
            Err(status) => Err(FetchError::Status {
                status: reqwest::StatusCode::from_u16(*status).unwrap(),
                body: "unavailable".to_string(),
            }),
        }
    }
}

/// Prefixes every input with `JA:`; fails on inputs containing `FAIL`.
#[derive(Default)]
struct FakeChat {
    calls: AtomicUsize,
}

#[async_trait]
impl ChatCompletion for FakeChat {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let user = &messages.last().unwrap().content;
        if user.contains("FAIL") {
            Err(TranslateError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                message: "model overloaded".to_string(),
            })
        } else {
            Ok(format!("JA:{user}"))
        }
    }
}

#[derive(Default)]
struct FakeMail {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

#[async_trait]
impl MailSender for FakeMail {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn send(&self, subject: &str, html: &str) -> Result<String, MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), html.to_string()));
        if self.fail {
            Err(MailError::NotConfigured("RECIPIENT_ADDRESS"))
        } else {
            Ok("op-42".to_string())
        }
    }
}

fn record(n: usize) -> UpdateRecord {
    UpdateRecord {
        title: format!("Launched: Feature {n}"),
        description: format!("<div lang='EN-US'>Description {n}</div>"),
        products: Some(Products::Many(vec![format!("Product {n}"), "Shared".to_string()])),
        created: "2025-06-09T08:15:30.1234567Z".to_string(),
        modified: "2025-06-09T09:00:00.0000000Z".to_string(),
    }
}

struct Harness {
    feed: Arc<FakeFeed>,
    chat: Arc<FakeChat>,
    mail: Arc<FakeMail>,
    pipeline: Pipeline,
}

fn harness(feed: Arc<FakeFeed>, mail: FakeMail) -> Harness {
    let chat = Arc::new(FakeChat::default());
    let mail = Arc::new(mail);
    let pipeline = Pipeline::new(feed.clone(), Translator::new(chat.clone()), mail.clone());
    Harness {
        feed,
        chat,
        mail,
        pipeline,
    }
}

mod empty_feed {
    use super::*;

    #[tokio::test]
    async fn test_no_translation_no_mail() {
        let h = harness(FakeFeed::with(vec![]), FakeMail::default());

        let summary = h.pipeline.run("2025-06-09T00:00:00Z").await.unwrap();

        assert_eq!(summary.fetched, 0);
        assert!(summary.delivery.is_none());
        assert_eq!(h.chat.calls.load(Ordering::SeqCst), 0);
        assert!(h.mail.sent.lock().unwrap().is_empty());
        assert_eq!(
            *h.feed.requested.lock().unwrap(),
            vec!["2025-06-09T00:00:00Z".to_string()]
        );
    }

    #[tokio::test]
    async fn test_build_digest_returns_none() {
        let h = harness(FakeFeed::with(vec![]), FakeMail::default());
        let digest = h.pipeline.build_digest("2025-06-09T00:00:00Z").await.unwrap();
        assert!(digest.is_none());
    }
}

mod full_run {
    use super::*;

    #[tokio::test]
    async fn test_fragments_match_records_in_order() {
        let records: Vec<_> = (1..=4).map(record).collect();
        let h = harness(FakeFeed::with(records), FakeMail::default());

        let summary = h.pipeline.run("2025-06-09T00:00:00Z").await.unwrap();

        assert_eq!(summary.fetched, 4);
        assert_eq!(summary.translation_failures, 0);
        assert_eq!(
            summary.delivery,
            Some(DeliveryOutcome::Sent {
                operation_id: "op-42".to_string()
            })
        );
        // Title and description per record.
        assert_eq!(h.chat.calls.load(Ordering::SeqCst), 8);

        let sent = h.mail.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (subject, html) = &sent[0];
        assert_eq!(subject, "Azure 更新情報");

        assert_eq!(html.matches(r#"<div class="content">"#).count(), 4);
        assert_eq!(html.matches(r#"<div class="title">"#).count(), 4);
        assert_eq!(html.matches(r#"<div class="label">"#).count(), 4);
        assert_eq!(html.matches(r#"<div class="description">"#).count(), 4);
        assert_eq!(html.matches(r#"<div class="footer">"#).count(), 4);

        let positions: Vec<usize> = (1..=4)
            .map(|n| html.find(&format!("JA:Launched: Feature {n}")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(html.contains("Product 2, Shared"));
        assert!(html.contains("JA:<div lang='EN-US'>Description 3</div>"));
        assert!(html.contains("作成日時: 2025-06-09T08:15:30Z"));
        assert!(html.contains("更新日時: 2025-06-09T09:00:00Z"));
    }

    #[tokio::test]
    async fn test_plain_string_products() {
        let mut single = record(1);
        single.products = Some(Products::One("Azure Kubernetes Service".to_string()));
        let h = harness(FakeFeed::with(vec![single]), FakeMail::default());

        let digest = h
            .pipeline
            .build_digest("2025-06-09T00:00:00Z")
            .await
            .unwrap()
            .unwrap();

        assert!(digest
            .html
            .contains("<div class=\"label\">\n        Azure Kubernetes Service\n      </div>"));
    }
}

mod failure_policies {
    use super::*;

    #[tokio::test]
    async fn test_one_failed_description_still_sends() {
        let mut broken = record(2);
        broken.description = "<div>FAIL me</div>".to_string();
        let records = vec![record(1), broken, record(3)];
        let h = harness(FakeFeed::with(records), FakeMail::default());

        let summary = h.pipeline.run("2025-06-09T00:00:00Z").await.unwrap();

        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.translation_failures, 1);
        assert!(summary.delivery.as_ref().unwrap().is_sent());

        let sent = h.mail.sent.lock().unwrap();
        let html = &sent[0].1;
        assert_eq!(html.matches(r#"<div class="content">"#).count(), 3);
        assert!(html.contains(
            "(翻訳エラー: translation API error (500 Internal Server Error): model overloaded)"
        ));
        assert!(html.contains("JA:Launched: Feature 2"));
        assert!(html.contains("JA:<div lang='EN-US'>Description 1</div>"));
        assert!(html.contains("JA:<div lang='EN-US'>Description 3</div>"));
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_before_anything_else() {
        let h = harness(FakeFeed::failing(502), FakeMail::default());

        let err = h.pipeline.run("2025-06-09T00:00:00Z").await.unwrap_err();

        assert!(matches!(err, PipelineError::Fetch(FetchError::Status { .. })));
        assert_eq!(h.chat.calls.load(Ordering::SeqCst), 0);
        assert!(h.mail.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mail_failure_is_swallowed() {
        let h = harness(
            FakeFeed::with(vec![record(1)]),
            FakeMail {
                fail: true,
                ..FakeMail::default()
            },
        );

        let summary = h.pipeline.run("2025-06-09T00:00:00Z").await.unwrap();

        assert_eq!(
            summary.delivery,
            Some(DeliveryOutcome::Failed(
                "mail not configured: RECIPIENT_ADDRESS is not set".to_string()
            ))
        );
        assert_eq!(h.mail.sent.lock().unwrap().len(), 1);
    }
}

mod scheduled_runs {
    use super::*;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    fn clock_from(start: DateTime<Utc>) -> impl Fn() -> DateTime<Utc> {
        let base = tokio::time::Instant::now();
        move || start + TimeDelta::from_std(base.elapsed()).unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_does_not_stop_scheduler() {
        let h = harness(FakeFeed::failing(503), FakeMail::default());
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let mut stop_tx = Some(stop_tx);
        let mut runs = 0;
        let pipeline = &h.pipeline;

        run_daily_with(
            clock_from(Utc.with_ymd_and_hms(2025, 6, 9, 23, 0, 0).unwrap()),
            async {
                let _ = stop_rx.await;
            },
            |since| {
                runs += 1;
                if runs == 2 {
                    if let Some(tx) = stop_tx.take() {
                        let _ = tx.send(());
                    }
                }
                async move { pipeline.run(&since).await }
            },
        )
        .await;

        assert_eq!(runs, 2);
        assert_eq!(
            *h.feed.requested.lock().unwrap(),
            vec![
                "2025-06-09T00:00:00Z".to_string(),
                "2025-06-10T00:00:00Z".to_string()
            ]
        );
        assert_eq!(h.chat.calls.load(Ordering::SeqCst), 0);
        assert!(h.mail.sent.lock().unwrap().is_empty());
    }
}
