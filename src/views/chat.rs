use crate::ai::ModelGateway;
use crate::session::{ChatSession, drive_exchange};
use crate::types::{ChatMessage, Role, View};
use crate::views::shared::Spinner;
use dioxus::events::Key;
use dioxus::prelude::*;
use std::sync::Arc;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

#[component]
pub fn ChatView() -> Element {
    let gateway = use_context::<Arc<dyn ModelGateway>>();
    let mut session = use_signal(|| ChatSession::new(gateway));
    let mut input = use_signal(String::new);

    let mut send_message = {
        let mut session = session;
        let mut input_signal = input;
        move |text: String| {
            let Some(turns) = session.with_mut(|chat| chat.begin_send(&text)) else {
                return;
            };
            input_signal.set(String::new());
            let (gateway, system_instruction) = session.with(|chat| {
                (chat.gateway(), chat.system_instruction().to_string())
            });

            spawn(async move {
                let result = drive_exchange(gateway.as_ref(), &system_instruction, &turns, |piece| {
                    session.with_mut(|chat| chat.apply_fragment(piece));
                })
                .await;
                session.with_mut(|chat| match result {
                    Ok(()) => chat.finish(),
                    Err(err) => chat.fail(&err),
                });
            });
        }
    };

    let (streaming, cursor_at, messages) = session.with(|chat| {
        (chat.is_streaming(), chat.streaming_index(), chat.messages().to_vec())
    });

    rsx! {
        section { class: "card chat-card",
            div { class: "view-heading",
                h2 { class: "view-title", "{View::Chatbot.title()}" }
                p { class: "view-subtitle", "Your multilingual agricultural expert." }
                button {
                    class: "action-btn",
                    r#type: "button",
                    disabled: streaming,
                    onclick: move |_| session.with_mut(|chat| chat.reset()),
                    "New chat"
                }
            }
            div { id: "chat-list", class: "chat-list",
                for (i, msg) in messages.iter().enumerate() {
                    MessageRow {
                        key: "{i}",
                        message: msg.clone(),
                        typing: cursor_at == Some(i),
                    }
                }
                if streaming && cursor_at.is_none() {
                    div { class: "message-row model",
                        div { class: "bubble model typing",
                            span { class: "dot" }
                            span { class: "dot" }
                            span { class: "dot" }
                        }
                    }
                }
            }
            form { class: "composer",
                onsubmit: move |ev| ev.prevent_default(),
                input {
                    class: "text-input",
                    r#type: "text",
                    placeholder: "Type your question...",
                    value: "{input}",
                    disabled: streaming,
                    oninput: move |ev| input.set(ev.value()),
                    onkeydown: move |ev| {
                        if ev.key() == Key::Enter {
                            ev.prevent_default();
                            send_message(input());
                        }
                    },
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: streaming || input().trim().is_empty(),
                    onclick: move |_| send_message(input()),
                    if streaming {
                        Spinner {}
                    } else {
                        "Send"
                    }
                }
            }
        }
    }
}

#[component]
fn MessageRow(message: ChatMessage, typing: bool) -> Element {
    let class = role_class(message.role);
    let copy_payload = message.text.clone();
    let on_copy = move |_| {
        let raw = copy_payload.clone();
        spawn(async move {
            #[cfg(any(feature = "desktop", feature = "mobile"))]
            {
                match arboard::Clipboard::new() {
                    Ok(mut clipboard) => {
                        if let Err(err) = clipboard.set_text(raw) {
                            tracing::warn!(error = %err, "failed to copy reply");
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "clipboard unavailable"),
                }
            }
            #[cfg(not(any(feature = "desktop", feature = "mobile")))]
            let _ = raw;
        });
    };

    rsx! {
        div { class: "message-row {class}",
            div { class: "message-stack",
                div { class: "bubble {class}",
                    "{message.text}"
                    if typing {
                        span { class: "cursor" }
                    }
                }
                div { class: "message-meta {class}",
                    if let Some(ts) = format_message_timestamp(message.created_at) {
                        span { class: "message-timestamp", "{ts}" }
                    }
                    if message.role == Role::Model && !typing {
                        button { class: "action-btn", title: "Copy reply", onclick: on_copy, "Copy" }
                    }
                }
            }
        }
    }
}
