//! Streamed chat exchanges driven through a scripted gateway.

mod common;

use common::ScriptedGateway;
use greencare::ai::ModelGateway;
use greencare::prompts::CHAT_GREETING;
use greencare::session::{ChatSession, FALLBACK_REPLY, SessionState};
use greencare::types::Role;
use std::sync::Arc;

fn session_with(gateway: &Arc<ScriptedGateway>) -> ChatSession {
    let shared: Arc<dyn ModelGateway> = gateway.clone();
    ChatSession::new(shared)
}

#[tokio::test]
async fn fragments_are_observed_in_order() {
    let gateway = Arc::new(ScriptedGateway::streaming(&["Hel", "lo"]));
    let mut session = session_with(&gateway);

    let mut seen = Vec::new();
    session
        .send_with("Good morning", |messages| {
            let last = messages.last().unwrap();
            assert_eq!(last.role, Role::Model);
            seen.push(last.text.clone());
        })
        .await;

    assert_eq!(seen, vec!["Hel".to_string(), "Hello".to_string()]);
    assert_eq!(session.state(), SessionState::Ready);

    let texts: Vec<&str> = session.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec![CHAT_GREETING, "Good morning", "Hello"]);
    assert_eq!(gateway.stream_calls(), 1);
}

#[tokio::test]
async fn failure_returns_to_ready_with_fallback_last() {
    let gateway = Arc::new(ScriptedGateway::failing());
    let mut session = session_with(&gateway);

    session.send("Why are my cassava leaves yellow?").await;

    assert_eq!(session.state(), SessionState::Ready);
    let last = session.messages().last().unwrap();
    assert_eq!(last.role, Role::Model);
    assert_eq!(last.text, FALLBACK_REPLY);
    assert!(session.context_turns().is_empty());
}

#[tokio::test]
async fn partial_reply_survives_a_broken_stream() {
    let gateway = Arc::new(ScriptedGateway::breaking_after(&["Use neem ", "oil"]));
    let mut session = session_with(&gateway);

    session.send("Aphids on my beans").await;

    let texts: Vec<&str> = session.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![CHAT_GREETING, "Aphids on my beans", "Use neem oil", FALLBACK_REPLY]
    );
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn send_while_streaming_is_a_no_op() {
    let gateway = Arc::new(ScriptedGateway::streaming(&["ok"]));
    let mut session = session_with(&gateway);

    session.begin_send("first").unwrap();
    let before = session.messages().to_vec();

    session.send("second").await;

    assert_eq!(session.messages(), before.as_slice());
    assert_eq!(session.state(), SessionState::Streaming);
    assert_eq!(gateway.stream_calls(), 0);
}

#[tokio::test]
async fn blank_input_never_reaches_the_gateway() {
    let gateway = Arc::new(ScriptedGateway::streaming(&["ok"]));
    let mut session = session_with(&gateway);

    session.send("   ").await;

    assert_eq!(session.messages().len(), 1);
    assert_eq!(gateway.stream_calls(), 0);
}

#[tokio::test]
async fn later_turns_carry_the_conversation() {
    let gateway = Arc::new(ScriptedGateway::streaming(&["Plant in April."]));
    let mut session = session_with(&gateway);

    session.send("When do I plant maize?").await;
    session.send("And sorghum?").await;

    let sent = gateway.sent_turns();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].len(), 1);

    let second: Vec<(Role, &str)> = sent[1].iter().map(|m| (m.role, m.text.as_str())).collect();
    assert_eq!(
        second,
        vec![
            (Role::User, "When do I plant maize?"),
            (Role::Model, "Plant in April."),
            (Role::User, "And sorghum?"),
        ]
    );
}

#[tokio::test]
async fn failed_turns_are_not_resent() {
    let gateway = Arc::new(ScriptedGateway::failing());
    let mut session = session_with(&gateway);

    session.send("first try").await;
    session.send("second try").await;

    let sent = gateway.sent_turns();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].len(), 1);
    assert_eq!(sent[1][0].text, "second try");
}
