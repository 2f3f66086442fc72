use anyhow::Result;
use push::server::PushConfig;
use serde::{Deserialize, Serialize};

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub clients: ClientsConfig,
    pub notifier: NotifierConfig,
    pub push: PushConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT as u16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
}

/// Token secrets and lifetimes. All durations are in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Signs email verification and password reset tokens.
    pub email_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub verify_ttl_secs: i64,
    pub reset_ttl_secs: i64,
    pub mfa_code_ttl_secs: i64,
    /// Wrong guesses a login code survives before it is discarded.
    pub mfa_max_attempts: u32,
    pub cookie_secure: bool,
    /// Shared secret expected from the OAuth callback layer. Federated login is
    /// disabled when unset.
    pub federation_secret: Option<String>,
    pub purge_interval_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: defaults::DEV_ACCESS_SECRET.to_string(),
            refresh_secret: defaults::DEV_REFRESH_SECRET.to_string(),
            email_secret: defaults::DEV_EMAIL_SECRET.to_string(),
            access_ttl_secs: defaults::DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: defaults::DEFAULT_REFRESH_TTL_SECS,
            verify_ttl_secs: defaults::DEFAULT_VERIFY_TTL_SECS,
            reset_ttl_secs: defaults::DEFAULT_RESET_TTL_SECS,
            mfa_code_ttl_secs: defaults::DEFAULT_MFA_CODE_TTL_SECS,
            mfa_max_attempts: defaults::DEFAULT_MFA_MAX_ATTEMPTS,
            cookie_secure: defaults::DEFAULT_COOKIE_SECURE,
            federation_secret: None,
            purge_interval_secs: defaults::DEFAULT_PURGE_INTERVAL_SECS,
        }
    }
}

impl AuthConfig {
    pub fn uses_dev_secrets(&self) -> bool {
        self.access_secret == defaults::DEV_ACCESS_SECRET
            || self.refresh_secret == defaults::DEV_REFRESH_SECRET
            || self.email_secret == defaults::DEV_EMAIL_SECRET
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientsConfig {
    /// Base URL used for verification and reset links.
    pub client_a_url: String,
    pub client_b_url: String,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            client_a_url: defaults::DEFAULT_CLIENT_A_URL.to_string(),
            client_b_url: defaults::DEFAULT_CLIENT_B_URL.to_string(),
        }
    }
}

impl ClientsConfig {
    pub fn origins(&self) -> [&str; 2] {
        [
            self.client_a_url.trim_end_matches('/'),
            self.client_b_url.trim_end_matches('/'),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifierConfig {
    /// Relay endpoint that performs the actual email delivery. Messages are
    /// only logged when unset.
    pub webhook_url: Option<String>,
    pub workers: usize,
    pub queue_size: usize,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            workers: defaults::DEFAULT_NOTIFIER_WORKERS,
            queue_size: defaults::DEFAULT_NOTIFIER_QUEUE_SIZE,
            max_attempts: defaults::DEFAULT_NOTIFIER_MAX_ATTEMPTS,
            retry_backoff_ms: defaults::DEFAULT_NOTIFIER_RETRY_BACKOFF_MS,
        }
    }
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS as u32
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE as u32
}
