//! Greencare: Pest & Plant Pal.
//!
//! Plant photo diagnosis, a multilingual farming chatbot, and generated
//! farming guides, all backed by a hosted Gemini model. The UI modules are
//! only built when one of the dioxus platform features is enabled.

pub mod ai;
pub mod config;
pub mod prompts;
pub mod render;
pub mod services;
pub mod session;
pub mod types;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;

pub use ai::{ChatError, ChatResult, GeminiGateway, GenerateRequest, ModelGateway, StreamHandle};
pub use config::{ConfigError, GatewayConfig};
pub use render::{RenderedBlock, render_blocks};
pub use services::{ImageUpload, PlantAssistant, ValidationError};
pub use session::{ChatSession, SessionState};
pub use types::{ChatMessage, Role, View};
