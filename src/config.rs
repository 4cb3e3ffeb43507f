//! Process configuration loaded from environment variables.
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `COMPASS_CATALOG` — YAML catalog path (default: builtin catalog)
//! - `LLM_API_KEY` — bearer token for the generation backend
//! - `LLM_BASE_URL` — OpenAI-compatible API root (default: `https://api.openai.com/v1`)
//! - `LLM_MODEL` — model name (default: `gpt-4o-mini`)
//! - `LLM_TIMEOUT_SECS` — per-request timeout (default: 30)
//! - `COMPASS_SESSION_IDLE_SECS` — idle time before a session expires (default: 1800)
//! - `COMPASS_SWEEP_SECS` — how often idle sessions are swept (default: 60)

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;
pub const DEFAULT_SWEEP_SECS: u64 = 60;

/// Settings for the HTTP text-generation backend.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("LlmConfig")
            .field("api_key", &api_key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: lookup("LLM_API_KEY").unwrap_or_default(),
            base_url: lookup("LLM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: lookup("LLM_MODEL").unwrap_or(defaults.model),
            timeout: lookup("LLM_TIMEOUT_SECS")
                .and_then(|secs| secs.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Catalog file to load instead of the builtin one.
    pub catalog_path: Option<PathBuf>,
    /// Sessions untouched for this long are closed and dropped.
    pub session_idle: Duration,
    pub sweep_interval: Duration,
    pub llm: LlmConfig,
}

impl Config {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: u64| {
            let secs = match lookup(key) {
                Some(raw) => raw.parse::<u64>().ok().filter(|s| *s > 0).unwrap_or_else(|| {
                    log::warn!("Ignoring invalid {} '{}', using {}", key, raw, default);
                    default
                }),
                None => default,
            };
            Duration::from_secs(secs)
        };
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };
        Self {
            port,
            catalog_path: lookup("COMPASS_CATALOG")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            session_idle: secs("COMPASS_SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS),
            sweep_interval: secs("COMPASS_SWEEP_SECS", DEFAULT_SWEEP_SECS),
            llm: LlmConfig::from_lookup(&lookup),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8080);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.llm.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.timeout, Duration::from_secs(30));
        assert!(config.llm.api_key.is_empty());
        assert_eq!(config.session_idle, Duration::from_secs(1800));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9090"),
            ("COMPASS_CATALOG", "/etc/compass/catalog.yaml"),
            ("LLM_API_KEY", "sk-test"),
            ("LLM_BASE_URL", "http://localhost:11434/v1/"),
            ("LLM_MODEL", "llama3"),
            ("LLM_TIMEOUT_SECS", "5"),
            ("COMPASS_SESSION_IDLE_SECS", "600"),
            ("COMPASS_SWEEP_SECS", "10"),
        ]));
        assert_eq!(config.session_idle, Duration::from_secs(600));
        assert_eq!(config.sweep_interval, Duration::from_secs(10));
        assert_eq!(config.port, 9090);
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/compass/catalog.yaml"))
        );
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "http"),
            ("LLM_TIMEOUT_SECS", "soon"),
            ("COMPASS_SESSION_IDLE_SECS", "0"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(
            config.session_idle,
            Duration::from_secs(DEFAULT_SESSION_IDLE_SECS)
        );
        assert_eq!(config.llm.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::from_lookup(lookup(&[("LLM_API_KEY", "sk-live-secret")]));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-live-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains(DEFAULT_MODEL));

        let unset = format!("{:?}", LlmConfig::default());
        assert!(unset.contains("<unset>"));
    }
}
