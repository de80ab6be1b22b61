use crate::types::View;
use dioxus::prelude::*;

#[component]
pub fn HomeView(current: Signal<View>) -> Element {
    let home = View::Home;
    rsx! {
        section { class: "card hero",
            h2 { class: "view-title", "{home.title()}" }
            p { class: "view-subtitle", "{home.description()}" }
        }
        div { class: "feature-grid",
            for view in View::FEATURES {
                FeatureCard { current, view }
            }
        }
    }
}

#[component]
fn FeatureCard(current: Signal<View>, view: View) -> Element {
    let mut current = current;
    rsx! {
        div { class: "card feature-card",
            h3 { "{view.title()}" }
            p { "{view.description()}" }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| current.set(view),
                "{view.call_to_action()}"
            }
        }
    }
}
