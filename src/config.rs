//! Configuration for the vera host.
//!
//! Loaded from a TOML file with an `[llm]` section for the chat-completion
//! endpoint, a `[web_search]` section for the web-answering pipeline and a
//! top-level `system_prompt`. Every field has a default, so a missing or
//! partial file still yields a usable config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vera_web::PipelineConfig;

use crate::error::{Result, VeraError};

/// Persona prompt used when the config does not set one.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are Vera, a concise voice assistant. Answer in one or two short sentences.";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeraConfig {
    /// Persona prompt placed before the grounding rules of every web answer.
    pub system_prompt: String,
    /// Chat-completion endpoint.
    pub llm: LlmConfig,
    /// Web-answering pipeline settings.
    pub web_search: PipelineConfig,
}

impl Default for VeraConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            llm: LlmConfig::default(),
            web_search: PipelineConfig::default(),
        }
    }
}

/// OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the API server, without `/v1/...`.
    pub api_url: String,
    /// API key sent as a bearer token. Empty for local servers.
    pub api_key: String,
    /// Model name to request.
    pub api_model: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:11434".to_owned(),
            api_key: String::new(),
            api_model: "qwen3:4b".to_owned(),
            timeout_secs: 60,
        }
    }
}

impl VeraConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| VeraError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VeraError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/vera/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("vera")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = VeraConfig::default();
        assert!(config.web_search.validate().is_ok());
        assert!(!config.system_prompt.is_empty());
        assert!(config.llm.timeout_secs > 0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: VeraConfig = toml::from_str(
            r#"
            [web_search]
            max_sources = 5
            blocked_domains = ["spam.com"]

            [llm]
            api_model = "gpt-4o-mini"
            "#,
        )
        .unwrap();
        assert_eq!(config.web_search.max_sources, 5);
        assert_eq!(config.web_search.blocked_domains, vec!["spam.com"]);
        assert_eq!(config.web_search.cache_ttl_secs, 600);
        assert_eq!(config.llm.api_model, "gpt-4o-mini");
        assert_eq!(config.llm.api_url, LlmConfig::default().api_url);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = VeraConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(VeraError::Io(_))));
    }

    #[test]
    fn load_or_default_without_file() {
        let config = VeraConfig::load_or_default(Path::new("/nonexistent/vera.toml")).unwrap();
        assert_eq!(config, VeraConfig::default());
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = VeraConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("vera"));
    }

    #[test]
    fn config_serializes_to_toml() {
        let toml_str = toml::to_string_pretty(&VeraConfig::default()).unwrap();
        assert!(toml_str.contains("[llm]"));
        assert!(toml_str.contains("[web_search]"));
        assert!(toml_str.contains("total_context_limit"));
    }
}
