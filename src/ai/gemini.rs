use super::{ChatError, ChatResult, GenerateRequest, ModelGateway, StreamHandle};
use crate::config::GatewayConfig;
use crate::types::ChatMessage;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Use a preconfigured HTTP client (proxy settings, timeouts).
    pub fn with_client(config: &GatewayConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method)
    }
}

// ---------------
// Wire format
// ---------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(Blob),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }

    fn is_finished(&self) -> bool {
        self.candidates
            .first()
            .is_some_and(|candidate| candidate.finish_reason.is_some())
    }
}

fn one_shot_body(request: &GenerateRequest) -> GenerateContentRequest<'_> {
    let mut parts = Vec::with_capacity(2);
    if let Some(attachment) = &request.attachment {
        parts.push(Part::InlineData(Blob {
            mime_type: attachment.mime_type.clone(),
            data: BASE64.encode(&attachment.data),
        }));
    }
    parts.push(Part::Text(&request.prompt));

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user"),
            parts,
        }],
        system_instruction: None,
    }
}

fn chat_body<'a>(system_instruction: &'a str, turns: &'a [ChatMessage]) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: turns
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.as_str()),
                parts: vec![Part::Text(&turn.text)],
            })
            .collect(),
        system_instruction: Some(Content {
            role: None,
            parts: vec![Part::Text(system_instruction)],
        }),
    }
}

// -----------------
// SSE parsing (exported for tests)
// -----------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Next piece of reply text; `done` is set on the chunk carrying a
    /// finish reason.
    Fragment { text: String, done: bool },
    Blocked(String),
}

pub fn parse_gemini_sse_data(data: &str) -> Option<SseEvent> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<GenerateContentResponse>(trimmed).ok()?;
    if let Some(reason) = parsed.block_reason() {
        return Some(SseEvent::Blocked(reason.to_string()));
    }
    Some(SseEvent::Fragment {
        text: parsed.text(),
        done: parsed.is_finished(),
    })
}

/// Apply one completed SSE event. Returns `Ok(true)` once the model has
/// signalled the end of its reply.
fn dispatch_event(data: &str, handle: &StreamHandle, received: &mut bool) -> ChatResult<bool> {
    match parse_gemini_sse_data(data) {
        Some(SseEvent::Fragment { text, done }) => {
            if !text.is_empty() {
                *received = true;
                handle.append(&text);
            }
            Ok(done)
        }
        Some(SseEvent::Blocked(reason)) => Err(ChatError::Blocked(reason)),
        None => {
            tracing::warn!(data, "skipping unparseable stream event");
            Ok(false)
        }
    }
}

/// Splits a byte stream into lines. Bytes are held until a `\n` arrives, so
/// a multibyte character split across network chunks is decoded whole.
#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    fn next_line(&mut self) -> Option<ChatResult<String>> {
        let pos = self.pending.iter().position(|&byte| byte == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
        line.pop();
        Some(decode_line(line))
    }

    /// Whatever is left once the body has ended without a final newline.
    fn take_rest(&mut self) -> Option<ChatResult<String>> {
        if self.pending.is_empty() {
            return None;
        }
        Some(decode_line(std::mem::take(&mut self.pending)))
    }
}

fn decode_line(mut line: Vec<u8>) -> ChatResult<String> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line).map_err(|err| ChatError::Stream(format!("invalid UTF-8 in event stream: {err}")))
}

/// Collects `data:` lines into events and dispatches each one at the blank
/// line that ends it.
#[derive(Default)]
struct EventReader {
    data: Option<String>,
    received: bool,
}

impl EventReader {
    /// Returns `Ok(true)` once the model has finished its reply.
    fn feed_line(&mut self, line: &str, handle: &StreamHandle) -> ChatResult<bool> {
        if line.is_empty() {
            return self.flush(handle);
        }
        if let Some(rest) = line.strip_prefix("data:") {
            let value = rest.strip_prefix(' ').unwrap_or(rest);
            match &mut self.data {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            }
        }
        Ok(false)
    }

    fn flush(&mut self, handle: &StreamHandle) -> ChatResult<bool> {
        match self.data.take() {
            Some(data) => dispatch_event(&data, handle, &mut self.received),
            None => Ok(false),
        }
    }
}

/// Drive a streamed `streamGenerateContent` body into `handle`.
async fn read_event_stream<S, B, E>(body: S, handle: &StreamHandle) -> ChatResult<()>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut body = std::pin::pin!(body);
    let mut lines = LineBuffer::default();
    let mut events = EventReader::default();
    let mut finished = false;

    'read: while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|err| ChatError::Stream(err.to_string()))?;
        lines.push(chunk.as_ref());
        while let Some(line) = lines.next_line() {
            if events.feed_line(&line?, handle)? {
                finished = true;
                break 'read;
            }
        }
    }

    // Servers may close without a trailing newline or blank line.
    if !finished {
        if let Some(line) = lines.take_rest() {
            finished = events.feed_line(&line?, handle)?;
        }
        if !finished {
            events.flush(handle)?;
        }
    }

    if !events.received {
        return Err(ChatError::EmptyResponse);
    }
    Ok(())
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn generate(&self, request: GenerateRequest) -> ChatResult<String> {
        tracing::debug!(
            model = %self.model,
            with_attachment = request.attachment.is_some(),
            "sending generateContent request"
        );
        let response = self
            .client
            .post(self.endpoint("generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&one_shot_body(&request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Api { status, body });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        if let Some(reason) = parsed.block_reason() {
            return Err(ChatError::Blocked(reason.to_string()));
        }
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(text)
    }

    async fn stream_chat(
        &self,
        system_instruction: &str,
        turns: &[ChatMessage],
        handle: StreamHandle,
    ) -> ChatResult<()> {
        tracing::debug!(model = %self.model, turns = turns.len(), "opening chat stream");
        let response = self
            .client
            .post(self.endpoint("streamGenerateContent"))
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", &self.api_key)
            .header("accept", "text/event-stream")
            .json(&chat_body(system_instruction, turns))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api { status, body });
        }

        read_event_stream(response.bytes_stream(), &handle).await
    }
}
