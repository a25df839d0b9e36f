use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PlanoError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    /// Chat that receives operational reports (keep-alive summaries/alerts).
    #[serde(default)]
    pub ops_chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
}

fn default_llm_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default)]
    pub api_key: String,
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_dimensions() -> usize {
    768
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default)]
    pub turso_url: String,
    #[serde(default)]
    pub turso_token: String,
}

fn default_db_path() -> String {
    "plano.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            turso_url: String::new(),
            turso_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Base URL of the vector-search service (no trailing slash).
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    #[serde(default = "default_match_count")]
    pub match_count: usize,
}

fn default_match_threshold() -> f64 {
    0.3
}

fn default_match_count() -> usize {
    2
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            match_threshold: default_match_threshold(),
            match_count: default_match_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// UTC offset in hours for schedule evaluation (e.g. 7 for UTC+7).
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32,
    /// Days between keep-alive probes.
    #[serde(default = "default_keepalive_days")]
    pub keepalive_days: i64,
}

fn default_timezone_offset() -> i32 {
    7
}

fn default_keepalive_days() -> i64 {
    5
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone_offset: default_timezone_offset(),
            keepalive_days: default_keepalive_days(),
        }
    }
}

impl Config {
    /// Load config: defaults → plano.toml → env vars (env wins).
    ///
    /// Missing secrets are not rejected here; a collaborator call made
    /// without its credential fails at call time instead.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| PlanoError::Config(format!("failed to read config: {e}")))?;
            toml::from_str(&content)
                .map_err(|e| PlanoError::Config(format!("failed to parse config: {e}")))?
        } else {
            Self::default()
        };

        // Override with env vars
        if let Ok(v) = std::env::var("PLANO_TELEGRAM_TOKEN") {
            config.telegram.token = v;
        }
        if let Ok(v) = std::env::var("PLANO_OPS_CHAT_ID") {
            config.telegram.ops_chat_id = v;
        }
        if let Ok(v) = std::env::var("PLANO_GEMINI_API_KEY") {
            config.llm.api_key = v;
        }
        if let Ok(v) = std::env::var("PLANO_EMBEDDING_API_KEY") {
            config.embedding.api_key = v;
        }
        if let Ok(v) = std::env::var("PLANO_TURSO_URL") {
            config.database.turso_url = v;
        }
        if let Ok(v) = std::env::var("PLANO_TURSO_TOKEN") {
            config.database.turso_token = v;
        }
        if let Ok(v) = std::env::var("PLANO_VECTOR_URL") {
            config.retrieval.url = v;
        }
        if let Ok(v) = std::env::var("PLANO_VECTOR_KEY") {
            config.retrieval.api_key = v;
        }

        // Fallback: embeddings use the LLM API key if not separately configured
        if config.embedding.api_key.is_empty() {
            config.embedding.api_key = config.llm.api_key.clone();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream_constants() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gemini-2.0-flash-exp");
        assert_eq!(config.embedding.model, "text-embedding-004");
        assert_eq!(config.retrieval.match_threshold, 0.3);
        assert_eq!(config.retrieval.match_count, 2);
        assert_eq!(config.schedule.timezone_offset, 7);
        assert_eq!(config.schedule.keepalive_days, 5);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [telegram]
            token = "abc"

            [retrieval]
            url = "https://vectors.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.telegram.token, "abc");
        assert_eq!(config.retrieval.url, "https://vectors.example.com");
        assert_eq!(config.retrieval.match_count, 2);
        assert_eq!(config.schedule.timezone_offset, 7);
    }
}
