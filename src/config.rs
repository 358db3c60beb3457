//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::path::PathBuf;

/// Default CA bundle used to build the completion client's trust store
pub const DEFAULT_CA_BUNDLE: &str = "/etc/ssl/certs/ca-certificates.crt";

/// Origins allowed by CORS unless `CORS_ORIGINS` overrides them
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:8000"];

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Document store configuration
    pub database: DatabaseConfig,
    /// Completion service configuration
    pub completion: CompletionConfig,
    /// Requests per minute per client. Exposed for the HTTP layer, not enforced.
    pub rate_limit_per_minute: u32,
    /// Browser origins allowed to call the API
    pub cors_origins: Vec<String>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Document store configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL (e.g. `sqlite://./data`); the database file lives under it
    pub url: String,
    /// Default database name
    pub name: String,
}

/// Completion service configuration
#[derive(Clone)]
pub struct CompletionConfig {
    /// API credential; validated when the adapter is constructed
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// PEM bundle of trusted roots; `None` uses the client's built-in roots
    pub ca_bundle: Option<PathBuf>,
    /// Client-level HTTP timeout (in seconds)
    pub timeout_secs: u64,
    /// Capacity of the completion worker pool
    pub worker_threads: usize,
}

// Manual impl keeps the credential out of logs.
impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("ca_bundle", &self.ca_bundle)
            .field("timeout_secs", &self.timeout_secs)
            .field("worker_threads", &self.worker_threads)
            .finish()
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            ca_bundle: Some(PathBuf::from(DEFAULT_CA_BUNDLE)),
            timeout_secs: 30,
            worker_threads: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let defaults = CompletionConfig::default();
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./data".to_string()),
                name: env::var("DATABASE_NAME").unwrap_or_else(|_| "smartchat".to_string()),
            },
            completion: CompletionConfig {
                api_key: env::var("OPENAI_API_KEY").ok(),
                base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
                model: env::var("OPENAI_MODEL").unwrap_or(defaults.model),
                temperature: env::var("OPENAI_TEMPERATURE")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(defaults.temperature),
                ca_bundle: Some(
                    env::var("REQUESTS_CA_BUNDLE")
                        .map(PathBuf::from)
                        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CA_BUNDLE)),
                ),
                timeout_secs: env::var("OPENAI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(defaults.timeout_secs),
                worker_threads: env::var("AI_WORKER_THREADS")
                    .ok()
                    .and_then(|n| n.parse().ok())
                    .filter(|n: &usize| *n > 0)
                    .unwrap_or(defaults.worker_threads),
            },
            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or(100),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_else(|_| default_cors_origins()),
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "HOST",
        "DATABASE_URL",
        "DATABASE_NAME",
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "OPENAI_MODEL",
        "OPENAI_TIMEOUT_SECS",
        "OPENAI_TEMPERATURE",
        "REQUESTS_CA_BUNDLE",
        "AI_WORKER_THREADS",
        "RATE_LIMIT_PER_MINUTE",
        "CORS_ORIGINS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.server_addr(), "0.0.0.0:8000");
        assert_eq!(config.database.url, "sqlite://./data");
        assert_eq!(config.database.name, "smartchat");
        assert!(config.completion.api_key.is_none());
        assert_eq!(config.completion.model, "gpt-3.5-turbo");
        assert_eq!(config.completion.temperature, 0.7);
        assert_eq!(
            config.completion.ca_bundle,
            Some(PathBuf::from(DEFAULT_CA_BUNDLE))
        );
        assert_eq!(config.completion.worker_threads, 10);
        assert_eq!(config.rate_limit_per_minute, 100);
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:5173", "http://localhost:8000"]
        );
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        env::set_var("PORT", "9001");
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("OPENAI_TEMPERATURE", "0.2");
        env::set_var("REQUESTS_CA_BUNDLE", "/tmp/bundle.pem");
        env::set_var("AI_WORKER_THREADS", "0");
        env::set_var("CORS_ORIGINS", "https://app.example.com, ,https://admin.example.com");

        let config = Config::from_env();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.completion.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.completion.temperature, 0.2);
        assert_eq!(
            config.completion.ca_bundle,
            Some(PathBuf::from("/tmp/bundle.pem"))
        );
        // Zero workers would deadlock the pool; fall back to the default
        assert_eq!(config.completion.worker_threads, 10);
        assert_eq!(
            config.cors_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );

        clear_env();
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = CompletionConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
