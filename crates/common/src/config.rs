//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session and account configuration.
    pub auth: AuthConfig,
    /// Shared secret for the externally triggered sweeper endpoints.
    pub cron: CronConfig,
    /// Web Push configuration. Notification dispatch is skipped when absent.
    #[serde(default)]
    pub push: Option<PushConfig>,
    /// In-process scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Session and account configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens.
    pub session_secret: String,
    /// Session token lifetime in days.
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    /// Lifetime of an email verification token in hours.
    #[serde(default = "default_verification_ttl_hours")]
    pub verification_ttl_hours: i64,
    /// Read the live `suspended` flag instead of trusting the session snapshot.
    #[serde(default)]
    pub live_suspension_check: bool,
    /// How long a live suspension lookup is cached, in seconds.
    #[serde(default = "default_suspension_cache_ttl_secs")]
    pub suspension_cache_ttl_secs: u64,
}

/// Cron endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CronConfig {
    /// Bearer token the caller must present.
    pub secret: String,
}

/// Web Push (VAPID) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Public key (base64 URL-safe encoded).
    pub vapid_public_key: String,
    /// Private key (base64 URL-safe encoded).
    pub vapid_private_key: String,
    /// Subject, typically a `mailto:` URL.
    pub subject: String,
}

/// In-process scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// Whether the in-process scheduler runs at all.
    #[serde(default)]
    pub enabled: bool,
    /// Interval between cleanup sweeps, in seconds.
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    /// Interval between notification sweeps, in seconds.
    #[serde(default = "default_notification_interval_secs")]
    pub notification_interval_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            cleanup_interval_secs: default_cleanup_interval_secs(),
            notification_interval_secs: default_notification_interval_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_session_ttl_days() -> i64 {
    30
}

const fn default_verification_ttl_hours() -> i64 {
    24
}

const fn default_suspension_cache_ttl_secs() -> u64 {
    60
}

const fn default_cleanup_interval_secs() -> u64 {
    3600
}

const fn default_notification_interval_secs() -> u64 {
    86400
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `FINBOARD_ENV`)
    /// 4. Environment variables with `FINBOARD__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("FINBOARD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FINBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>()?.validate()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FINBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>()?.validate()
    }

    /// Reject settings that deserialize but cannot be used safely.
    pub fn validate(self) -> Result<Self, config::ConfigError> {
        if self.auth.session_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.session_secret must not be empty".to_string(),
            ));
        }
        if self.cron.secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "cron.secret must not be empty".to_string(),
            ));
        }
        Ok(self)
    }
}
