use crate::ai::ModelGateway;
use crate::services::{PlantAssistant, RequestSlot};
use crate::types::View;
use crate::views::shared::{BlockList, ErrorLine, PendingPanel, Spinner};
use dioxus::events::Key;
use dioxus::prelude::*;
use std::sync::Arc;

#[component]
pub fn ResourcesView() -> Element {
    let gateway = use_context::<Arc<dyn ModelGateway>>();
    let assistant = use_signal(|| PlantAssistant::new(gateway));
    let mut topic = use_signal(String::new);
    // Topic the current guide was generated for; the input may change since.
    let mut guide_topic = use_signal(String::new);
    let mut guide = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(RequestSlot::default);

    let mut generate = move || {
        if !loading.with_mut(|slot| slot.try_begin()) {
            return;
        }
        let assistant = assistant();
        let requested = topic();
        spawn(async move {
            error.set(None);
            guide.set(String::new());
            match assistant.generate_guide(&requested).await {
                Ok(text) => {
                    guide_topic.set(requested);
                    guide.set(text);
                }
                Err(err) => error.set(Some(err.to_string())),
            }
            loading.with_mut(|slot| slot.finish());
        });
    };

    rsx! {
        section { class: "card",
            div { class: "view-heading",
                h2 { class: "view-title", "{View::Resources.title()}" }
                p { class: "view-subtitle", "Get instant, AI-generated guides on any farming topic." }
            }
            div { class: "input-row",
                input {
                    class: "text-input",
                    r#type: "text",
                    placeholder: "e.g., 'How to make organic fertilizer'",
                    value: "{topic}",
                    oninput: move |ev| topic.set(ev.value()),
                    onkeydown: move |ev| {
                        if ev.key() == Key::Enter {
                            ev.prevent_default();
                            generate();
                        }
                    },
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: loading().is_busy() || topic().trim().is_empty(),
                    onclick: move |_| generate(),
                    if loading().is_busy() {
                        Spinner {}
                        " Generating..."
                    } else {
                        "Generate Guide"
                    }
                }
            }
            ErrorLine { message: error() }
            if loading().is_busy() || !guide().is_empty() {
                div { class: "result-section",
                    if loading().is_busy() {
                        h3 { class: "result-title", "Generating your guide..." }
                        PendingPanel { message: "Please wait while the AI prepares your guide..." }
                    } else {
                        h3 { class: "result-title", "Guide: {guide_topic}" }
                        div { class: "result-body",
                            BlockList { text: guide() }
                        }
                    }
                }
            }
        }
    }
}
