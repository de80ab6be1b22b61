//! Remote model gateway for Greencare.
//!
//! Screens and services only talk to the hosted model through the
//! [`ModelGateway`] trait. A gateway is built once at startup and handed to
//! whoever needs it, so tests can substitute a scripted double.
//!
//! # Architecture
//!
//! - `gemini` - Gemini REST backend with SSE streaming
//!
//! ```rust,no_run
//! use greencare::ai::{GeminiGateway, GenerateRequest, ModelGateway};
//! use greencare::config::GatewayConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let gateway = GeminiGateway::new(&GatewayConfig::from_env()?);
//! let text = gateway.generate(GenerateRequest::text("Hello!")).await?;
//! # Ok(())
//! # }
//! ```
mod gemini;

pub use gemini::{GeminiGateway, SseEvent, parse_gemini_sse_data};

use crate::types::ChatMessage;
use async_trait::async_trait;
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Gemini API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("prompt blocked: {0}")]
    Blocked(String),

    #[error("stream interrupted: {0}")]
    Stream(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

/// Binary payload sent inline with a prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One-shot generation request: a text prompt and an optional attachment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub attachment: Option<InlineAttachment>,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.attachment = Some(InlineAttachment {
            mime_type: mime_type.into(),
            data,
        });
        self
    }
}

/// Write side of a streamed exchange. Fragments are delivered to the
/// paired receiver in the order they were appended.
#[derive(Clone, Debug)]
pub struct StreamHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl StreamHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn append(&self, piece: &str) {
        if piece.is_empty() {
            return;
        }
        // Receiver gone means nobody is rendering this exchange any more.
        if self.tx.send(piece.to_string()).is_err() {
            tracing::debug!("stream receiver dropped, discarding fragment");
        }
    }
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Complete a single prompt and return the whole response text.
    async fn generate(&self, request: GenerateRequest) -> ChatResult<String>;

    /// Continue a conversation. `turns` is the full history, newest last;
    /// reply fragments are pushed into `handle` as they arrive. Returns once
    /// the stream has ended.
    async fn stream_chat(
        &self,
        system_instruction: &str,
        turns: &[ChatMessage],
        handle: StreamHandle,
    ) -> ChatResult<()>;
}
