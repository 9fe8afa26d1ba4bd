//! Daily Azure update digest in Japanese.
//!
//! This crate provides:
//! - Fetching the Azure update feed for everything modified since a lower bound
//! - Japanese translation of titles and HTML descriptions via Azure OpenAI
//! - HTML digest rendering
//! - Delivery through Azure Communication Services email
//! - A daily scheduler that runs the whole pipeline shortly after midnight UTC
//!
//! # Failure policy
//!
//! - Feed errors and missing translator credentials abort the run.
//! - A failed translation becomes a visible `(翻訳エラー: ...)` placeholder.
//! - A failed send is logged and otherwise ignored.

pub mod config;
pub mod error;
pub mod feed;
pub mod mail;
pub mod pipeline;
pub mod render;
pub mod schedule;
pub mod translate;

// Re-export main types
pub use config::AppConfig;
pub use error::{ConfigError, FetchError, MailError, PipelineError, TranslateError};
pub use feed::{Products, UpdateFeed, UpdateRecord};
pub use mail::{DeliveryOutcome, MailSender};
pub use pipeline::{Digest, Pipeline, RunSummary};
pub use render::TranslatedRecord;
pub use translate::{ChatCompletion, ChatMessage, Translator};
