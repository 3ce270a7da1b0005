use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub neo4j: Neo4jConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub run: RunConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            neo4j: Neo4jConfig::from_env(),
            llm: LlmConfig::from_env(),
            embedding: EmbeddingConfig::from_env(),
            run: RunConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:    host={}, port={}", self.server.host, self.server.port);
        tracing::info!("  neo4j:     uri={}, db={}", self.neo4j.uri, self.neo4j.database);
        tracing::info!("  llm:       model={}, configured={}", self.llm.chat_model, self.llm.is_configured());
        tracing::info!("  embedding: model={}, dims={}", self.embedding.model, self.embedding.dimensions);
        tracing::info!("  run:       batch_size={}, fetch_limit={}", self.run.batch_size, self.run.fetch_limit);
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 3002),
        }
    }
}

// ── Neo4j ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
}

impl Neo4jConfig {
    fn from_env() -> Self {
        Self {
            uri: env_or("NEO4J_URI", "http://localhost:7474"),
            user: env_or("NEO4J_USER", "neo4j"),
            password: env_opt("NEO4J_PASSWORD"),
            database: env_or("NEO4J_DATABASE", "neo4j"),
        }
    }
}

// ── LLM (chat summarization) ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env() -> Self {
        Self {
            api_key: env_opt("OPENAI_API_KEY"),
            base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com"),
            chat_model: env_or("CHAT_MODEL", "gpt-4o-mini"),
            temperature: env_f32("CHAT_TEMPERATURE", 0.0),
            max_tokens: env_u32("CHAT_MAX_TOKENS", 1024),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimensions: usize,
}

impl EmbeddingConfig {
    fn from_env() -> Self {
        Self {
            model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
            dimensions: env_usize("EMBEDDING_DIMENSIONS", 1536),
        }
    }
}

// ── Run parameters ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Enrichment results committed to the graph per write transaction.
    pub batch_size: usize,
    /// Upper bound on records pulled per job invocation.
    pub fetch_limit: usize,
}

impl RunConfig {
    fn from_env() -> Self {
        Self {
            batch_size: env_usize("BATCH_SIZE", 100),
            fetch_limit: env_usize("FETCH_LIMIT", 2000),
        }
    }
}
