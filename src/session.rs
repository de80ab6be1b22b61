//! Chat session state for the farming assistant.
//!
//! A [`ChatSession`] owns the displayed message list and the conversation
//! context sent to the model. Callers read snapshots through
//! [`ChatSession::messages`]; only the session mutates the list.
//!
//! The streamed exchange is a small state machine:
//!
//! ```text
//! Ready --begin_send--> Streaming --finish--> Ready
//!                           \-------fail----> Ready (+ fallback reply)
//! ```
//!
//! UI code that keeps the session behind a signal drives the steps itself
//! (`begin_send`, [`drive_exchange`], then `finish` or `fail`) so no borrow
//! is held across an await. Everything else can call [`ChatSession::send`].

use crate::ai::{ChatError, ChatResult, ModelGateway, StreamHandle};
use crate::prompts;
use crate::types::{ChatMessage, Role};
use std::sync::Arc;

pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Streaming,
}

/// Handle to the remote conversation: which gateway to talk to, the
/// persona, and the turns the model has actually seen.
struct ConversationContext {
    gateway: Arc<dyn ModelGateway>,
    system_instruction: String,
    turns: Vec<ChatMessage>,
}

pub struct ChatSession {
    context: ConversationContext,
    messages: Vec<ChatMessage>,
    state: SessionState,
    buffer: String,
    pending_user: Option<ChatMessage>,
    reply_started: bool,
}

impl ChatSession {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            context: ConversationContext {
                gateway,
                system_instruction: prompts::chat_system_instruction().to_string(),
                turns: Vec::new(),
            },
            messages: vec![ChatMessage::model(prompts::CHAT_GREETING)],
            state: SessionState::Ready,
            buffer: String::new(),
            pending_user: None,
            reply_started: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == SessionState::Streaming
    }

    pub fn gateway(&self) -> Arc<dyn ModelGateway> {
        Arc::clone(&self.context.gateway)
    }

    pub fn system_instruction(&self) -> &str {
        &self.context.system_instruction
    }

    /// Turns committed to the remote conversation so far.
    pub fn context_turns(&self) -> &[ChatMessage] {
        &self.context.turns
    }

    /// Start an exchange. Returns the turns to send, or `None` (with nothing
    /// changed) for blank input or while another exchange is in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<Vec<ChatMessage>> {
        if text.trim().is_empty() || self.is_streaming() {
            return None;
        }

        let user = ChatMessage::user(text);
        self.messages.push(user.clone());
        self.state = SessionState::Streaming;
        self.buffer.clear();
        self.reply_started = false;

        let mut turns = self.context.turns.clone();
        turns.push(user.clone());
        self.pending_user = Some(user);
        Some(turns)
    }

    /// Fold the next reply fragment into the last model message.
    pub fn apply_fragment(&mut self, fragment: &str) {
        if !self.is_streaming() {
            return;
        }
        self.buffer.push_str(fragment);
        if !self.reply_started {
            self.messages.push(ChatMessage::model(String::new()));
            self.reply_started = true;
        }
        if let Some(last) = self.messages.last_mut() {
            last.text.clone_from(&self.buffer);
        }
    }

    pub fn finish(&mut self) {
        if !self.is_streaming() {
            return;
        }
        if let Some(user) = self.pending_user.take()
            && !self.buffer.is_empty()
        {
            self.context.turns.push(user);
            self.context
                .turns
                .push(ChatMessage::model(std::mem::take(&mut self.buffer)));
        }
        self.end_exchange();
    }

    /// Partial reply text stays where it is; the fallback goes after it as a
    /// separate model message. The failed turn is not committed.
    pub fn fail(&mut self, error: &ChatError) {
        if !self.is_streaming() {
            return;
        }
        tracing::error!(%error, "chat exchange failed");
        self.messages.push(ChatMessage::model(FALLBACK_REPLY));
        self.pending_user = None;
        self.end_exchange();
    }

    fn end_exchange(&mut self) {
        self.state = SessionState::Ready;
        self.buffer.clear();
        self.reply_started = false;
    }

    /// Send `text` and wait for the whole reply.
    pub async fn send(&mut self, text: &str) {
        self.send_with(text, |_| {}).await;
    }

    /// Like [`send`](Self::send), calling `on_update` with the message list
    /// after every fragment.
    pub async fn send_with<F>(&mut self, text: &str, mut on_update: F)
    where
        F: FnMut(&[ChatMessage]),
    {
        let Some(turns) = self.begin_send(text) else {
            return;
        };
        let gateway = self.gateway();
        let system_instruction = self.context.system_instruction.clone();

        let result = drive_exchange(gateway.as_ref(), &system_instruction, &turns, |piece| {
            self.apply_fragment(piece);
            on_update(&self.messages);
        })
        .await;

        match result {
            Ok(()) => self.finish(),
            Err(err) => self.fail(&err),
        }
    }

    /// Start over with just the greeting. Ignored while a reply is
    /// streaming.
    pub fn reset(&mut self) {
        if self.is_streaming() {
            return;
        }
        *self = Self::new(self.gateway());
    }

    /// The model message currently being typed, if any.
    pub fn streaming_index(&self) -> Option<usize> {
        (self.is_streaming() && self.reply_started)
            .then(|| self.messages.len() - 1)
            .filter(|&idx| self.messages[idx].role == Role::Model)
    }
}

/// Run one streamed exchange on the current task, handing each fragment to
/// `apply` in delivery order. The gateway writes into a channel while this
/// task drains it, so `apply` never runs concurrently with itself.
pub async fn drive_exchange<F>(
    gateway: &dyn ModelGateway,
    system_instruction: &str,
    turns: &[ChatMessage],
    mut apply: F,
) -> ChatResult<()>
where
    F: FnMut(&str),
{
    let (handle, mut fragments) = StreamHandle::channel();
    let producer = gateway.stream_chat(system_instruction, turns, handle);
    let consumer = async {
        while let Some(piece) = fragments.recv().await {
            apply(&piece);
        }
    };
    let (result, ()) = futures::join!(producer, consumer);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::GenerateRequest;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl ModelGateway for Unreachable {
        async fn generate(&self, _request: GenerateRequest) -> ChatResult<String> {
            Err(ChatError::EmptyResponse)
        }

        async fn stream_chat(
            &self,
            _system_instruction: &str,
            _turns: &[ChatMessage],
            _handle: StreamHandle,
        ) -> ChatResult<()> {
            Err(ChatError::EmptyResponse)
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(Arc::new(Unreachable))
    }

    #[test]
    fn starts_ready_with_greeting_only() {
        let session = session();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Model);
        assert_eq!(session.messages()[0].text, prompts::CHAT_GREETING);
        assert!(session.context_turns().is_empty());
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = session();
        assert!(session.begin_send("").is_none());
        assert!(session.begin_send("  \n\t").is_none());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn greeting_is_not_sent_as_context() {
        let mut session = session();
        let turns = session.begin_send("Sannu").unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "Sannu");
    }

    #[test]
    fn second_send_while_streaming_changes_nothing() {
        let mut session = session();
        session.begin_send("first").unwrap();
        let before = session.messages().to_vec();

        assert!(session.begin_send("second").is_none());
        assert_eq!(session.messages(), before.as_slice());
        assert_eq!(session.state(), SessionState::Streaming);
    }

    #[test]
    fn fragments_grow_the_last_message_in_place() {
        let mut session = session();
        session.begin_send("hi").unwrap();
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.streaming_index(), None);

        session.apply_fragment("Hel");
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].text, "Hel");
        assert_eq!(session.streaming_index(), Some(2));

        session.apply_fragment("lo");
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].text, "Hello");

        session.finish();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.streaming_index(), None);
        assert_eq!(session.context_turns().len(), 2);
        assert_eq!(session.context_turns()[1].text, "Hello");
    }

    #[test]
    fn failure_keeps_partial_text_and_appends_fallback() {
        let mut session = session();
        session.begin_send("hi").unwrap();
        session.apply_fragment("Partial");
        session.fail(&ChatError::Stream("reset".to_string()));

        let messages = session.messages();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].text, "Partial");
        assert_eq!(messages[3].role, Role::Model);
        assert_eq!(messages[3].text, FALLBACK_REPLY);
        assert!(session.context_turns().is_empty());
    }

    #[test]
    fn fragments_outside_an_exchange_are_dropped() {
        let mut session = session();
        session.apply_fragment("stray");
        session.finish();
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn send_through_failing_gateway_lands_on_fallback() {
        let mut session = session();
        session.send("Ẹ kú àárọ̀").await;
        assert_eq!(session.state(), SessionState::Ready);
        let last = session.messages().last().unwrap();
        assert_eq!(last.role, Role::Model);
        assert_eq!(last.text, FALLBACK_REPLY);
    }

    #[test]
    fn reset_restores_greeting() {
        let mut session = session();
        session.begin_send("hi").unwrap();
        session.apply_fragment("x");
        session.finish();
        session.reset();
        assert_eq!(session.messages().len(), 1);
        assert!(session.context_turns().is_empty());
    }

    #[test]
    fn reset_waits_for_the_reply() {
        let mut session = session();
        session.begin_send("hi").unwrap();
        session.reset();
        assert_eq!(session.state(), SessionState::Streaming);
        assert_eq!(session.messages().len(), 2);
    }
}
