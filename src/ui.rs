use crate::types::View;
use crate::views::{ChatView, DetectorView, HomeView, ResourcesView};
use dioxus::prelude::*;

const GREENCARE_CSS: Asset = asset!("/assets/greencare.css");

/// Root component. Expects an `Arc<dyn ModelGateway>` in the launch context.
#[component]
pub fn App() -> Element {
    let current = use_signal(View::default);

    rsx! {
        document::Link { rel: "stylesheet", href: GREENCARE_CSS }
        AppHeader { current }
        main { class: "main",
            div { class: "container",
                ViewPanel { current }
            }
        }
        AppFooter {}
    }
}

#[component]
fn AppHeader(current: Signal<View>) -> Element {
    let mut current = current;
    rsx! {
        header { class: "header",
            div { class: "header-content",
                button {
                    class: "brand",
                    r#type: "button",
                    onclick: move |_| current.set(View::Home),
                    span { class: "brand-leaf", "🌿" }
                    span { class: "brand-name", "Greencare" }
                }
                nav { class: "tabs",
                    for view in View::FEATURES {
                        NavButton { current, view }
                    }
                }
            }
        }
    }
}

#[component]
fn NavButton(current: Signal<View>, view: View) -> Element {
    let mut current = current;
    let class = if current() == view { "tab active" } else { "tab" };
    rsx! {
        button {
            class: class,
            r#type: "button",
            onclick: move |_| current.set(view),
            "{view.nav_label()}"
        }
    }
}

/// Only the active screen is mounted; switching away drops its state.
#[component]
fn ViewPanel(current: Signal<View>) -> Element {
    match current() {
        View::Home => rsx! { HomeView { current } },
        View::Detector => rsx! { DetectorView {} },
        View::Chatbot => rsx! { ChatView {} },
        View::Resources => rsx! { ResourcesView {} },
    }
}

#[component]
fn AppFooter() -> Element {
    rsx! {
        footer { class: "footer",
            span { class: "brand-leaf", "🌿" }
            p { "Pest & Plant Pal © 2024" }
        }
    }
}
