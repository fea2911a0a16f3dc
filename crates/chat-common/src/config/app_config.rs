//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub typing: TypingConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub webhook: WebhookConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// In-process store; state is lost on restart
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Required for the Postgres backend
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations from this directory at startup
    pub migrations_dir: Option<String>,
}

/// Identity token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    #[serde(default = "default_token_expiry")]
    pub token_expiry: i64,
}

/// Typing indicator configuration
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TypingConfig {
    /// How long an indicator stays up after the last keystroke
    #[serde(default = "default_typing_window_ms")]
    pub window_ms: i64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            window_ms: default_typing_window_ms(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Identity-provider user sync webhook
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebhookConfig {
    /// Shared secret expected in `x-webhook-secret`; the webhook is disabled when unset
    pub secret: Option<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "dm-chat".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_typing_window_ms() -> i64 {
    5000
}

fn default_requests_per_second() -> u32 {
    20
}

fn default_burst() -> u32 {
    100
}

/// Read and parse an optional variable; a present but unparsable value is an error
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(s) if s.eq_ignore_ascii_case("memory") => StorageBackend::Memory,
            Ok(s) if s.eq_ignore_ascii_case("postgres") => StorageBackend::Postgres,
            Ok(s) => return Err(ConfigError::InvalidValue("STORAGE_BACKEND", s)),
            Err(_) => StorageBackend::default(),
        };

        let url = env::var("DATABASE_URL").ok();
        if backend == StorageBackend::Postgres && url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL"));
        }

        let window_ms = parse_var("TYPING_WINDOW_MS")?.unwrap_or_else(default_typing_window_ms);
        if window_ms <= 0 {
            return Err(ConfigError::InvalidValue(
                "TYPING_WINDOW_MS",
                window_ms.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("API_PORT")?.ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            database: DatabaseConfig {
                backend,
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
                migrations_dir: env::var("DATABASE_MIGRATIONS_DIR").ok(),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?,
                issuer: env::var("JWT_ISSUER").ok(),
                token_expiry: parse_var("JWT_TOKEN_EXPIRY")?.unwrap_or_else(default_token_expiry),
            },
            typing: TypingConfig { window_ms },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_var("RATE_LIMIT_REQUESTS_PER_SECOND")?
                    .unwrap_or_else(default_requests_per_second),
                burst: parse_var("RATE_LIMIT_BURST")?.unwrap_or_else(default_burst),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
            webhook: WebhookConfig {
                secret: env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()),
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_var("WORKER_ID")?.unwrap_or(0),
            },
        })
    }

    /// Configuration for tests and local runs: in-memory storage, no env lookups
    #[must_use]
    pub fn for_memory(jwt_secret: &str, typing_window_ms: i64) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Development,
            },
            api: ServerConfig {
                host: default_host(),
                port: 0,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: None,
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                migrations_dir: None,
            },
            jwt: JwtConfig {
                secret: jwt_secret.to_string(),
                issuer: None,
                token_expiry: default_token_expiry(),
            },
            typing: TypingConfig {
                window_ms: typing_window_ms,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: default_requests_per_second(),
                burst: default_burst(),
            },
            cors: CorsConfig {
                allowed_origins: Vec::new(),
            },
            webhook: WebhookConfig::default(),
            snowflake: SnowflakeConfig { worker_id: 0 },
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
