use greencare::ai::{GeminiGateway, ModelGateway};
use greencare::config::{self, GatewayConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Bundled config for mobile builds (iOS/Android)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

#[cfg(not(target_arch = "wasm32"))]
fn load_dotenv() {
    // First try to load from .env file (desktop dev)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    // Fall back to bundled config (mobile builds)
    load_bundled_config();
}

#[cfg(target_arch = "wasm32")]
fn load_dotenv() {
    load_bundled_config();
}

fn load_bundled_config() {
    for (key, value) in config::parse_env_lines(BUNDLED_CONFIG) {
        // Only set if not already set (allow env override)
        if std::env::var(&key).is_err() {
            // SAFETY: We're setting env vars at startup before any threads are spawned
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("greencare=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let config = GatewayConfig::from_env()?;
    tracing::info!(model = %config.model, "starting Greencare");
    let gateway: Arc<dyn ModelGateway> = Arc::new(GeminiGateway::new(&config));

    dioxus::LaunchBuilder::new()
        .with_context(gateway)
        .launch(greencare::ui::App);
    Ok(())
}
