//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use surfer_ai::ProviderConfig;

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Search engine prefix; the encoded query is appended
pub const DEFAULT_SEARCH_ENGINE: &str = "https://www.bing.com/search?q=";

/// Configuration for surfer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API base URL (OpenAI-compatible)
    pub base_url: Option<String>,
    /// API key (alternative to SURFER_API_KEY)
    pub api_key: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Default mode: "tool" or "chat"
    pub mode: Option<String>,
    /// Search engine prefix used by the headless browser
    pub search_engine: Option<String>,
}

/// Values given on the command line; they win over everything else
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("surfer")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SURFER_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`; a missing or broken file yields the defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            api_key: None,
            model: Some(DEFAULT_MODEL.to_string()),
            mode: Some("tool".to_string()),
            search_engine: Some(DEFAULT_SEARCH_ENGINE.to_string()),
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    /// Resolve the provider settings.
    ///
    /// Precedence: command line, then this file, then `env`, then defaults.
    /// `env` is a lookup so tests can run without touching the process
    /// environment.
    pub fn provider_config(
        &self,
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> ProviderConfig {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let pick = |cli: &Option<String>, file: &Option<String>, var: &str| {
            non_blank(cli.clone())
                .or_else(|| non_blank(file.clone()))
                .or_else(|| non_blank(env(var)))
        };

        ProviderConfig::new(
            pick(&overrides.base_url, &self.base_url, "SURFER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            pick(&overrides.api_key, &self.api_key, "SURFER_API_KEY").unwrap_or_default(),
            pick(&overrides.model, &self.model, "SURFER_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        )
    }

    /// Search engine prefix, falling back to the default
    pub fn search_engine(&self) -> String {
        self.search_engine
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SEARCH_ENGINE.to_string())
    }
}

/// Look up a variable in the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# surfer configuration file
# Place at ~/.config/surfer/config.toml (Linux/Mac) or %APPDATA%\surfer\config.toml (Windows)
# or point SURFER_CONFIG_PATH at another file.

# OpenAI-compatible API base URL. MiniMax and DashScope URLs are normalized
# automatically.
base_url = "https://api.deepseek.com/v1"

# Model name sent with every request
model = "deepseek-chat"

# Default mode: "tool" drives the browser, "chat" streams plain answers
mode = "tool"

# Search engine prefix; the encoded query is appended
search_engine = "https://www.bing.com/search?q="

# API key (optional - SURFER_API_KEY works too)
# It's recommended to use the environment variable instead
# api_key = "sk-..."
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("surfer-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::default().provider_config(&Overrides::default(), |_| None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model_name, DEFAULT_MODEL);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_precedence_cli_file_env() {
        let file = Config {
            model: Some("file-model".into()),
            base_url: Some("https://file.example/v1".into()),
            ..Default::default()
        };
        let overrides = Overrides {
            model: Some("cli-model".into()),
            ..Default::default()
        };
        let env = env_with(&[
            ("SURFER_MODEL", "env-model"),
            ("SURFER_BASE_URL", "https://env.example/v1"),
            ("SURFER_API_KEY", "env-key"),
        ]);

        let config = file.provider_config(&overrides, env);
        assert_eq!(config.model_name, "cli-model");
        assert_eq!(config.base_url, "https://file.example/v1");
        assert_eq!(config.api_key, "env-key");
    }

    #[test]
    fn test_blank_values_fall_through() {
        let file = Config {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        let config = file.provider_config(&Overrides::default(), |_| None);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("roundtrip.toml");
        let config = Config {
            base_url: Some("https://dashscope.aliyuncs.com".into()),
            model: Some("qwen-plus".into()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_broken_file_yields_defaults() {
        let path = temp_path("broken.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "model = [unterminated").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.model.as_deref(), Some(DEFAULT_MODEL));
        assert_eq!(config.search_engine(), DEFAULT_SEARCH_ENGINE);
    }
}
