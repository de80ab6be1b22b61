//! Environment configuration for the Gemini gateway.

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Checked in order; the first non-empty value wins.
const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API_KEY environment variable is not set.")]
    MissingApiKey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|key| non_empty(*key))
            .ok_or(ConfigError::MissingApiKey)?;
        let model = non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url =
            non_empty("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key: api_key.trim().to_string(),
            model,
            base_url,
        })
    }
}

/// Parse `KEY=VALUE` lines from a bundled env file, skipping blanks and
/// `#` comments.
pub fn parse_env_lines(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
