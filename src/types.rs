use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Role name on the Gemini wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub created_at: Option<OffsetDateTime>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            created_at: Some(OffsetDateTime::now_utc()),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            created_at: Some(OffsetDateTime::now_utc()),
        }
    }
}

/// Screens the app can show. `Home` is the landing page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    Detector,
    Chatbot,
    Resources,
}

impl View {
    /// Feature screens reachable from the header navigation.
    pub const FEATURES: [View; 3] = [View::Detector, View::Chatbot, View::Resources];

    pub fn nav_label(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Detector => "Detector",
            View::Chatbot => "Chatbot",
            View::Resources => "Resources",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Welcome to Greencare",
            View::Detector => "Crop Disease & Pest Detector",
            View::Chatbot => "AI Farming Assistant",
            View::Resources => "Farming Resource Hub",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            View::Home => {
                "Your AI-powered partner for healthier crops and bountiful harvests. Get instant diagnostics, expert advice, and farming guides."
            }
            View::Detector => {
                "Snap a photo of your plant to instantly identify diseases or pests and get a detailed treatment plan."
            }
            View::Chatbot => {
                "Chat with our multilingual AI expert to get answers to all your farming questions, anytime."
            }
            View::Resources => {
                "Access a library of AI-generated, step-by-step guides on a wide range of agricultural topics."
            }
        }
    }

    /// Label of the home screen card that opens this view.
    pub fn call_to_action(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Detector => "Diagnose Plant",
            View::Chatbot => "Start Chatting",
            View::Resources => "Browse Guides",
        }
    }
}
