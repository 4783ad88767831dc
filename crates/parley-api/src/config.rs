use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, File};
use config::builder::DefaultState;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub public: PublicConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub embed: EmbedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub openai_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Mongodb,
            database: "parley".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    /// Completion budget sent with every chat request
    pub max_tokens: u32,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            base_url: parley_llm::openai::OPENAI_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Origin that generated scripts call back to
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublicConfig {
    pub production: bool,
    pub production_base_url: String,
    pub development_base_url: String,
}

impl Default for PublicConfig {
    fn default() -> Self {
        Self {
            production: false,
            production_base_url: "https://chat.example.com".to_string(),
            development_base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl PublicConfig {
    pub fn base_url(&self) -> &str {
        if self.production {
            &self.production_base_url
        } else {
            &self.development_base_url
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub default_per_hour: u32,
    pub default_per_day: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_per_hour: parley_types::defaults::MAX_REQUESTS_PER_HOUR,
            default_per_day: parley_types::defaults::MAX_REQUESTS_PER_DAY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// 0 disables the resolver cache
    pub cache_ttl_secs: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self { cache_ttl_secs: 300 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Environment variables layered over the TOML files
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("SERVER_REQUEST_TIMEOUT_SECS", "server.request_timeout_secs"),
    ("STORE_BACKEND", "store.backend"),
    ("STORE_DATABASE", "store.database"),
    ("LLM_MODEL", "llm.model"),
    ("LLM_TEMPERATURE", "llm.temperature"),
    ("LLM_MAX_TOKENS", "llm.max_tokens"),
    ("LLM_BASE_URL", "llm.base_url"),
    ("LLM_TIMEOUT_SECS", "llm.timeout_secs"),
    ("PUBLIC_PRODUCTION", "public.production"),
    ("PUBLIC_PRODUCTION_BASE_URL", "public.production_base_url"),
    ("PUBLIC_DEVELOPMENT_BASE_URL", "public.development_base_url"),
    ("RATE_LIMIT_DEFAULT_PER_HOUR", "rate_limit.default_per_hour"),
    ("RATE_LIMIT_DEFAULT_PER_DAY", "rate_limit.default_per_day"),
    ("EMBED_CACHE_TTL_SECS", "embed.cache_ttl_secs"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, STORE_, LLM_, PUBLIC_, RATE_LIMIT_, EMBED_, LOG_)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));
        let builder = apply_env_overrides(builder, |name| std::env::var(name).ok())?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets from ENV (not in TOML)
        if cfg.store.backend == StoreBackend::Mongodb {
            cfg.mongodb_uri = std::env::var("MONGODB_URI").map_err(|_| {
                ConfigError::Message(
                    "MONGODB_URI environment variable is required when store.backend = \"mongodb\""
                        .to_string(),
                )
            })?;
        }
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string())
        })?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.embed.cache_ttl_secs)
    }
}

fn apply_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in ENV_OVERRIDES {
        builder = builder.set_override_option(*key, lookup(var))?;
    }
    Ok(builder)
}
