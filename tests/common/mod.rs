//! Scripted stand-in for the Gemini gateway.

#![allow(dead_code)]

pub mod server;

use async_trait::async_trait;
use greencare::ai::{ChatError, ChatResult, GenerateRequest, ModelGateway, StreamHandle};
use greencare::types::ChatMessage;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct ScriptedGateway {
    reply: Option<String>,
    fragments: Vec<String>,
    stream_fails: bool,
    generate_calls: AtomicUsize,
    stream_calls: AtomicUsize,
    requests: Mutex<Vec<GenerateRequest>>,
    sent_turns: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGateway {
    /// Every call fails.
    pub fn failing() -> Self {
        Self {
            stream_fails: true,
            ..Self::default()
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn streaming(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|piece| piece.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Deliver `fragments`, then fail the stream.
    pub fn breaking_after(fragments: &[&str]) -> Self {
        Self {
            stream_fails: true,
            ..Self::streaming(fragments)
        }
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn sent_turns(&self) -> Vec<Vec<ChatMessage>> {
        self.sent_turns.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn generate(&self, request: GenerateRequest) -> ChatResult<String> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.reply.clone().ok_or(ChatError::EmptyResponse)
    }

    async fn stream_chat(
        &self,
        _system_instruction: &str,
        turns: &[ChatMessage],
        handle: StreamHandle,
    ) -> ChatResult<()> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.sent_turns.lock().unwrap().push(turns.to_vec());
        for piece in &self.fragments {
            handle.append(piece);
            tokio::task::yield_now().await;
        }
        if self.stream_fails {
            return Err(ChatError::Stream("connection reset".to_string()));
        }
        if self.fragments.is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(())
    }
}
