//! Japanese translation through a chat-completion model.
//!
//! [`Translator`] never fails: a broken call is rendered as a visible
//! `(翻訳エラー: ...)` placeholder so one bad record cannot sink the digest.

mod azure_openai;
pub mod prompts;

pub use azure_openai::AzureOpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::TranslateError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A chat-completion backend.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Run one stateless completion and return the reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, TranslateError>;
}

/// Which system prompt to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Plain title with an optional status label prefix
    Title,
    /// HTML description fragment
    Description,
}

/// Translates titles and descriptions into Japanese.
pub struct Translator {
    backend: Arc<dyn ChatCompletion>,
    title_prompt: String,
    description_prompt: String,
}

impl Translator {
    /// Create a translator over the given chat backend.
    pub fn new(backend: Arc<dyn ChatCompletion>) -> Self {
        Self {
            backend,
            title_prompt: prompts::title_prompt(),
            description_prompt: prompts::description_prompt(),
        }
    }

    /// Translate `text` with the instruction for `kind`.
    ///
    /// Returns the placeholder text on failure instead of an error.
    pub async fn translate(&self, kind: TextKind, text: &str) -> Translation {
        let system = match kind {
            TextKind::Title => &self.title_prompt,
            TextKind::Description => &self.description_prompt,
        };

        match self.translate_with(system, text).await {
            Ok(translated) => {
                debug!(backend = self.backend.name(), ?kind, "Translated text");
                Translation::Translated(translated)
            }
            Err(e) => {
                warn!(backend = self.backend.name(), ?kind, error = %e, "Translation failed");
                Translation::Failed(error_placeholder(&e))
            }
        }
    }

    /// Translate `text` under an arbitrary system instruction.
    pub async fn translate_with(&self, system: &str, text: &str) -> Result<String, TranslateError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(text)];
        let reply = self.backend.complete(&messages).await?;
        Ok(reply.trim().to_string())
    }
}

/// Outcome of one translation, both variants carry displayable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Translated(String),
    Failed(String),
}

impl Translation {
    /// Whether the call failed and this is a placeholder.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Text to put in the digest.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Translated(text) | Self::Failed(text) => text,
        }
    }
}

/// Visible marker rendered in place of a failed translation.
#[must_use]
pub fn error_placeholder(error: &TranslateError) -> String {
    format!("(翻訳エラー: {error})")
}
