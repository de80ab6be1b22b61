use crate::render::{RenderedBlock, render_blocks};
use dioxus::prelude::*;

/// Model output laid out line by line: headings, bullets, paragraphs.
#[component]
pub fn BlockList(text: String) -> Element {
    let blocks = render_blocks(&text);
    rsx! {
        div { class: "rendered",
            {blocks.into_iter().enumerate().map(|(i, block)| match block {
                RenderedBlock::Heading2(line) => rsx! { h2 { key: "{i}", "{line}" } },
                RenderedBlock::Heading3(line) => rsx! { h3 { key: "{i}", "{line}" } },
                RenderedBlock::BulletItem(line) => rsx! { li { key: "{i}", "{line}" } },
                RenderedBlock::Paragraph(line) => rsx! { p { key: "{i}", "{line}" } },
            })}
        }
    }
}

#[component]
pub fn Spinner() -> Element {
    rsx! { span { class: "spinner", aria_hidden: "true" } }
}

/// Progress panel shown while a single-shot request is in flight.
#[component]
pub fn PendingPanel(message: String) -> Element {
    rsx! {
        div { class: "pending-panel",
            Spinner {}
            p { "{message}" }
        }
    }
}

#[component]
pub fn ErrorLine(message: Option<String>) -> Element {
    rsx! {
        if let Some(message) = message {
            p { class: "error-line", "{message}" }
        }
    }
}
