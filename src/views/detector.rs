use crate::ai::ModelGateway;
use crate::services::{ImageUpload, PlantAssistant, RequestSlot};
use crate::types::View;
use crate::views::shared::{BlockList, ErrorLine, PendingPanel, Spinner};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dioxus::prelude::*;
use std::sync::Arc;

fn preview_url(upload: &ImageUpload) -> String {
    format!("data:{};base64,{}", upload.mime_type, STANDARD.encode(&upload.bytes))
}

#[component]
pub fn DetectorView() -> Element {
    let gateway = use_context::<Arc<dyn ModelGateway>>();
    let assistant = use_hook(|| PlantAssistant::new(gateway));
    let mut upload = use_signal(|| Option::<ImageUpload>::None);
    let mut result = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(RequestSlot::default);

    let on_file = move |evt: FormEvent| async move {
        let Some(engine) = evt.files() else {
            return;
        };
        let Some(name) = engine.files().into_iter().next() else {
            return;
        };
        let Some(bytes) = engine.read_file(&name).await else {
            tracing::warn!(file = %name, "could not read selected file");
            error.set(Some("Could not read the selected file.".to_string()));
            return;
        };

        let picked = ImageUpload::from_named_bytes(name, bytes);
        match picked.check() {
            Ok(()) => {
                error.set(None);
                result.set(String::new());
                upload.set(Some(picked));
            }
            Err(err) => error.set(Some(err.to_string())),
        }
    };

    let on_analyze = move |_| {
        let assistant = assistant.clone();
        let claimed = loading.with_mut(|slot| slot.try_begin());
        async move {
            if !claimed {
                return;
            }
            error.set(None);
            result.set(String::new());
            let picked = upload();
            match assistant.analyze_plant(picked.as_ref()).await {
                Ok(text) => result.set(text),
                Err(err) => error.set(Some(err.to_string())),
            }
            loading.with_mut(|slot| slot.finish());
        }
    };

    let picked = upload();
    let label = match &picked {
        Some(image) => format!("Selected: {}", image.file_name()),
        None => "Choose an Image".to_string(),
    };

    rsx! {
        section { class: "card",
            div { class: "view-heading",
                h2 { class: "view-title", "{View::Detector.title()}" }
                p { class: "view-subtitle",
                    "Upload a photo of your plant to get an AI-powered diagnosis and treatment plan."
                }
            }
            div { class: "detector-grid",
                div { class: "preview-box",
                    if let Some(image) = &picked {
                        img { class: "preview-image", src: preview_url(image), alt: "Plant preview" }
                    } else {
                        p { class: "muted", "Image preview will appear here" }
                    }
                }
                div { class: "detector-controls",
                    label { class: "file-label", r#for: "file-upload", "{label}" }
                    input {
                        id: "file-upload",
                        class: "hidden",
                        r#type: "file",
                        accept: "image/*",
                        onchange: on_file,
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: loading().is_busy() || picked.is_none(),
                        onclick: on_analyze,
                        if loading().is_busy() {
                            Spinner {}
                            " Analyzing..."
                        } else {
                            "Analyze Plant"
                        }
                    }
                    ErrorLine { message: error() }
                }
            }
            if loading().is_busy() || !result().is_empty() {
                div { class: "result-section",
                    h3 { class: "result-title", "Analysis Result" }
                    if loading().is_busy() {
                        PendingPanel { message: "AI is analyzing your plant, please wait..." }
                    } else {
                        div { class: "result-body",
                            BlockList { text: result() }
                        }
                    }
                }
            }
        }
    }
}
